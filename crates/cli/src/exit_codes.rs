//! CLI Exit Code Registry
//!
//! Single source of truth for the exit codes scripts rely on.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success (skipped items and guesses are not failures)      |
//! | 2    | Usage error (bad arguments, unparseable slot value)       |
//! | 3    | Invalid config or slot taxonomy                           |
//! | 4    | Runtime error (snapshot unreadable, artifact write failed)|
//! | 5    | One or more items or recipes failed to apply              |

/// Success - the batch ran; skips and guesses are reported, not fatal.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments.
pub const EXIT_USAGE: u8 = 2;

/// Config file or slot taxonomy failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// I/O or snapshot failure outside the batch itself.
pub const EXIT_RUNTIME: u8 = 4;

/// The batch finished but at least one record write failed.
pub const EXIT_APPLY_FAILED: u8 = 5;
