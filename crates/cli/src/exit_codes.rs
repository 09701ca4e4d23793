//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 2    | CLI usage error (bad args, bad flag values)          |
//! | 3    | Invalid config (TOML syntax, failed validation)      |
//! | 4    | Runtime error (unreadable file, CSV, missing column) |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, out-of-range flag values.
pub const EXIT_USAGE: u8 = 2;

/// Config could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Runtime failure: I/O, malformed CSV, data contract violations.
pub const EXIT_RUNTIME: u8 = 4;
