//! Unit tests for the interchange format.
//!
//! These tests verify parsing, field mapping, strict/lenient handling of
//! unknown shapes and round-trip conversions.

mod interchange_tests;
mod roundtrip_tests;
