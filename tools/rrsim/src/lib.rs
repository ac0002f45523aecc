//! rrsim command-line driver.
//!
//! Parses job files, layers configuration, runs the kernel simulator and
//! renders its trace and report.

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod output;
pub mod run;
