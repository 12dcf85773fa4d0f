use thiserror::Error;

/// Errors surfaced by the codec.
///
/// All of these indicate malformed or incomplete caller input. Nothing in
/// this crate performs I/O, so nothing here is transient or retryable.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("unsupported message version: {0}")]
    UnsupportedVersion(u8),

    #[error("declared signature count {declared} does not match required signatures {required}")]
    SignatureCountMismatch { declared: usize, required: usize },

    #[error("transaction has {filled} of {required} required signatures")]
    IncompleteSignatures { filled: usize, required: usize },

    #[error("no valid program derived address found for the given seeds")]
    NoValidAddressFound,

    #[error("transaction has no fee payer")]
    FeePayerMissing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_decode() {
        let err = SolError::Decode("buffer too short".into());
        assert_eq!(err.to_string(), "decode error: buffer too short");
    }

    #[test]
    fn display_unsupported_version() {
        let err = SolError::UnsupportedVersion(3);
        assert_eq!(err.to_string(), "unsupported message version: 3");
    }

    #[test]
    fn display_signature_count_mismatch() {
        let err = SolError::SignatureCountMismatch {
            declared: 2,
            required: 1,
        };
        assert!(err.to_string().contains("2"));
        assert!(err.to_string().contains("1"));
    }

    #[test]
    fn display_incomplete_signatures() {
        let err = SolError::IncompleteSignatures {
            filled: 1,
            required: 2,
        };
        assert_eq!(
            err.to_string(),
            "transaction has 1 of 2 required signatures"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(SolError::FeePayerMissing);
        assert!(err.to_string().contains("fee payer"));
    }
}
