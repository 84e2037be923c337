//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - network failure, broken package, unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - an entry list has invalid entries or is malformed
pub const VALIDATION_ERROR: i32 = 2;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
