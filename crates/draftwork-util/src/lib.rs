//! Shared utilities for draftwork.

pub mod id;
pub mod log;

pub use id::{new_id, IdPrefix};
pub use log::{init_logging, LogConfig, LogLevel};
