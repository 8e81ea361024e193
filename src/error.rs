//! Error types for QR code generation

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, QrError>;

/// Errors that can occur while encoding text into a QR code.
///
/// Ways to handle a capacity error:
///
/// - Decrease the error correction level if it was greater than `QrCodeEcc::Low`.
/// - Increase the maximum version if it was less than `Version::MAX`.
/// - Pass the text as several strings so that digit or upper-case runs get a denser mode.
/// - Change the text to be shorter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    /// No segment mode accepts every character of the text
    #[error("text contains characters that no segment mode can encode: {text:?}")]
    Encoding { text: String },

    /// The segments do not fit in any allowed version
    #[error("data does not fit in any version from {min_version} to {max_version}")]
    Capacity { min_version: u8, max_version: u8 },

    /// The version search range is empty
    #[error("minimum version {min_version} is greater than maximum version {max_version}")]
    InvalidVersionRange { min_version: u8, max_version: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = QrError::Capacity {
            min_version: 1,
            max_version: 40,
        };
        assert_eq!(err.to_string(), "data does not fit in any version from 1 to 40");

        let err = QrError::Encoding {
            text: "\u{263a}".to_string(),
        };
        assert!(err.to_string().starts_with("text contains characters"));
    }
}
