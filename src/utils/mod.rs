//! Utility modules
//!
//! This module contains common utilities used throughout the application,
//! including error handling, logging setup, validation and helper functions.

pub mod errors;
pub mod helpers;
pub mod logging;
pub mod validation;

pub use errors::{PollError, Result};
pub use validation::FieldErrors;
