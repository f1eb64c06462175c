//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, package cache, and external
//! processes.

pub mod cache;
pub mod dirs;
pub mod filesystem;
pub mod process;
