//! Utilities module.
//!
//! # Examples
//!
//! ```rust
//! use general_backend::utils::extract_realization_number;
//!
//! assert_eq!(extract_realization_number("r3i1p1f1"), Some(3));
//! ```

pub use general_backend_utils::*;
