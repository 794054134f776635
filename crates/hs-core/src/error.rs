//! Error types for hicspec

use thiserror::Error;

/// hicspec error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error (detector and mass-table configs)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Fatal configuration problem, raised before any event is processed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A table row could not be decoded into its declared schema.
    #[error("Field read error (row {row}, field '{field}'): {reason}")]
    FieldRead {
        /// Row index within the table (or chain).
        row: usize,
        /// Offending field name.
        field: String,
        /// Decoder message.
        reason: String,
    },

    /// Particle cannot be constructed (e.g. A == 0, unknown mass).
    #[error("Invalid particle: {0}")]
    InvalidParticle(String),

    /// Histogram accumulation or post-processing failure.
    #[error("Histogram error: {0}")]
    Histogram(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_read_message_names_row_and_field() {
        let err = Error::FieldRead { row: 7, field: "px".into(), reason: "length 2 != multi 3".into() };
        let msg = err.to_string();
        assert!(msg.contains("row 7"));
        assert!(msg.contains("'px'"));
    }
}
