//! # epilog Testkit
//!
//! Test utilities for the epilog diary store.
//!
//! This crate provides:
//! - Store and engine fixtures
//! - Diary scenario builders (entry chains, markers, corrections)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use epilog_testkit::prelude::*;
//!
//! #[test]
//! fn records_a_nosebleed() {
//!     let diary = Diary::in_memory();
//!     let id = diary.record_open(day(0), hm(10, 0));
//!     // ... assertions against diary.projection()
//! }
//! ```

pub mod fixtures;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
}

pub use fixtures::*;
