//! Error taxonomy and exit-code mapping for the CLI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid base64 input")]
    InvalidBase64,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("maximum supported prefix length is 64 bits (~10 base64 characters)")]
    PrefixTooLong,

    #[error("zero element encountered in batched inversion")]
    ZeroInBatch,

    #[error("offset does not match private key")]
    OffsetMismatch,

    #[error("interrupted")]
    Interrupted,

    #[error("failed to read private key from stdin: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Maps an error to the process exit code it should produce.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidBase64 | Error::PrefixTooLong => 2,
            Error::Interrupted => 3,
            Error::InvalidPublicKey
            | Error::ZeroInBatch
            | Error::OffsetMismatch
            | Error::Io(_) => 1,
        }
    }
}
