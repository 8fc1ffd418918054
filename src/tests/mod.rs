//! End-to-end tests of the solving pipeline.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]

mod property_tests;
mod solve_flow_tests;
