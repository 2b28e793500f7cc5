//! Integration test crate for WasteWatch.
//!
//! This crate has no library code. It only contains tests that drive the
//! report lifecycle across the types, db and reports crates.
//!
//! ```sh
//! cargo test -p wastewatch-integration-tests
//! ```
