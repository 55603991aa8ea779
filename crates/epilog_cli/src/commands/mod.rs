//! CLI command implementations.

pub mod days;
pub mod dump_log;
pub mod inspect;
pub mod verify;
