//! # General Backend Utils
//!
//! Small helpers shared by `general-backend` consumers. Diagnostics go
//! through the package logger, see `general_backend_logging::get_logger`.

pub mod str_utils;

pub use str_utils::{extract_realization, extract_realization_number};
