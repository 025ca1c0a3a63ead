//! Integration tests against a wiremock backend

pub mod session_test;
