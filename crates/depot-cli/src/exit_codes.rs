//! Exit codes for the `depot` binary.
//! Denials are non-fatal; only setup faults fail the run unless `--strict` is set.

pub const SUCCESS: i32 = 0;
pub const REJECTIONS: i32 = 1; // --strict and at least one submission denied or failed
pub const SETUP_FAULT: i32 = 2; // Staging unreadable, index malformed or unwritable
pub const REPORT_FAILED: i32 = 3; // Index written, but --report could not be written
