//! Error types for touch-relay.
//!
//! Nothing in the core is fatal. Console errors are reported back to the
//! operator and the command is dropped; storage validity errors are only
//! logged because an invalid record simply means "use the fallback identity".

use thiserror::Error;

/// A dotted-quad address failed to parse.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AddressFormatError {
    /// The address did not contain exactly three `.` separators.
    #[error("expected 3 '.' separators, found {found}")]
    SeparatorCount {
        /// Number of separators actually present.
        found: usize,
    },

    /// One of the four fields is empty, non-numeric, or above 255.
    #[error("octet {index} is not a number in 0-255")]
    InvalidOctet {
        /// Zero-based position of the bad field.
        index: usize,
    },
}

/// A console line could not be executed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// The line is not a known command.
    #[error("invalid command")]
    InvalidCommand,

    /// A known command with the wrong number of arguments.
    #[error("format error")]
    Malformed,

    /// One of the addresses is not a valid dotted-quad.
    #[error("format error: {0}")]
    Address(#[from] AddressFormatError),

    /// SSID or password does not fit the config field.
    #[error("format error: field too long")]
    FieldTooLong,

    /// SSID or password contains a NUL byte.
    #[error("format error: NUL byte in ssid or password")]
    InvalidCharacter,

    /// The input line overflowed the console line buffer.
    #[error("format error: line too long")]
    LineTooLong,

    /// The config was valid but could not be stored.
    #[error("save failed: {0}")]
    Storage(#[from] StorageError),
}

/// Persisting a config record failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The encoded record does not fit the reserved region.
    #[error("record needs {needed} bytes, region holds {capacity}")]
    OutOfSpace {
        /// Encoded record size in bytes.
        needed: usize,
        /// Size of the reserved region in bytes.
        capacity: usize,
    },

    /// SSID or password contains the record's `0x00` field terminator.
    #[error("ssid or password contains a NUL byte")]
    EmbeddedNul,

    /// The underlying storage reported a read, write, or commit failure.
    #[error("storage backend failure")]
    Backend,
}

/// A stored record could not be decoded.
///
/// [`ConfigStore::load`](crate::storage::ConfigStore::load) maps every variant
/// to "no record".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Marker bytes do not match (erased or foreign data).
    #[error("validity marker mismatch")]
    InvalidMarker,

    /// A string field runs off the end of the region.
    #[error("string field has no terminator")]
    MissingTerminator,

    /// A string field is not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A string field is longer than the config type can hold.
    #[error("string field too long")]
    FieldTooLong,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn console_error_messages() {
        assert_eq!(ConsoleError::InvalidCommand.to_string(), "invalid command");
        assert_eq!(ConsoleError::Malformed.to_string(), "format error");
        assert_eq!(
            ConsoleError::from(AddressFormatError::SeparatorCount { found: 2 }).to_string(),
            "format error: expected 3 '.' separators, found 2"
        );
    }

    #[test]
    fn storage_error_converts_into_console_error() {
        let err: ConsoleError = StorageError::OutOfSpace {
            needed: 70,
            capacity: 64,
        }
        .into();
        assert_eq!(err.to_string(), "save failed: record needs 70 bytes, region holds 64");
    }
}
