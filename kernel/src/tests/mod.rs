//! Kernel Unit Tests Module
//!
//! Whole-run scenarios across the loader, executor and scheduler.

mod memory_tests;
