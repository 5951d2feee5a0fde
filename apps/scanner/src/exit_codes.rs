//! Exit codes following sysexits.h conventions.

/// Successful execution, including a scan the user cancelled.
pub const SUCCESS: i32 = 0;

/// Invalid arguments, rejected input, disabled mode, bad configuration.
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Backend or camera unavailable, or the backend refused the scan.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const UNAVAILABLE: i32 = 69;

/// Internal software error.
/// Maps to EX_SOFTWARE from sysexits.h.
pub const INTERNAL_ERROR: i32 = 70;
