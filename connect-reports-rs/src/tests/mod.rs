//! Unit tests for the report tools
//!
//! This module contains tests that drive the gateway and both pipelines
//! against mock servers and mock collaborators.

pub mod diagnostics_mock_tests;
