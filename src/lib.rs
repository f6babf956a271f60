#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod files;
pub mod key;
pub mod scan;
pub mod verify;

use std::path::PathBuf;

pub use files::{check, load_key_file, read_file};
pub use key::{load_public_key, PublicKey};
pub use scan::{scan, Failure, Match, ScanFilter, ScanReport};
pub use verify::verify;

use thiserror::Error;

/// Reasons why a signature could not be checked.
///
/// None of these is a verdict on the signature: a signature that was checked
/// and did not match is [`Outcome::Invalid`], not an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("key is not a DER encoded SubjectPublicKeyInfo")]
    MalformedEncoding,
    #[error("key algorithm {0} is not RSA")]
    UnsupportedAlgorithm(String),
    #[error("malformed signature: {0}")]
    MalformedSignature(&'static str),
    #[error("RSA modulus of {bytes} bytes is too small for a SHA-1 PKCS #1 signature")]
    ModulusTooSmall { bytes: usize },
    #[error("openssl error")]
    OpenSsl(#[from] openssl::error::ErrorStack),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Verdict of a signature check over well formed inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The signature was made over the message by the key's holder.
    Valid,
    /// The signature does not match the message under the key.
    Invalid,
}

impl Outcome {
    pub fn is_valid(self) -> bool {
        self == Outcome::Valid
    }
}
