//! Core algorithms behind the `curve25519-vanity` search tool: field
//! arithmetic over GF(2^255-19), the Edwards and Montgomery curve forms,
//! batched point addition, the search driver, and private-key
//! reconstruction.

pub mod batch;
pub mod codec;
pub mod edwards;
pub mod error;
pub mod field;
pub mod montgomery;
pub mod offsets;
pub mod reconstruct;
pub mod search;

pub use error::Error;
