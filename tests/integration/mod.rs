//! Integration tests module
//!
//! This module contains the HTTP integration tests for PollBooth,
//! organized by functionality and test scenarios.

pub mod scenarios;
