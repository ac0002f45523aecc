//! Program Loader
//!
//! Turns a job description into processes resident in main memory.
//!
//! # Stages
//!
//! - [`job`]: parse the text job format into a [`Job`]
//! - [`image`]: lay each [`ProcessDescriptor`](crate::process::ProcessDescriptor)
//!   into its own region and return the handles to schedule
//!
//! Placement is all or nothing: capacity and layout are checked before any
//! word is written.

pub mod image;
pub mod job;

pub use image::{place, reserved_words};
pub use job::{parse_job, Job};
