//! Loading of keys, signatures and documents from the file system.

use std::path::Path;

use log::debug;

use crate::{load_public_key, verify, Error, Outcome, PublicKey, Result};

/// Reads the whole file into memory.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Loads a DER encoded RSA public key from a file.
pub fn load_key_file(path: impl AsRef<Path>) -> Result<PublicKey> {
    load_public_key(&read_file(path)?)
}

/// Checks if the document in `doc_path` was signed by the key in `key_path`,
/// resulting in the signature stored in `sig_path`.
pub fn check(
    key_path: impl AsRef<Path>,
    sig_path: impl AsRef<Path>,
    doc_path: impl AsRef<Path>,
) -> Result<Outcome> {
    let key = load_key_file(key_path)?;
    let signature = read_file(sig_path)?;
    let document = read_file(doc_path)?;

    verify(&key, &signature, &document)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn test_data() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
    }

    #[test]
    fn test_check() {
        let dir = test_data();
        let sig = dir.join("signature.dat");

        let outcome = check(
            dir.join("keys/bob.der"),
            &sig,
            dir.join("docs/invoice.pdf"),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Valid);

        let outcome = check(
            dir.join("keys/bob.der"),
            &sig,
            dir.join("docs/contract.pdf"),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Invalid);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = test_data();
        let missing = dir.join("keys/nobody.der");

        let err = check(&missing, dir.join("signature.dat"), dir.join("docs/invoice.pdf"))
            .err()
            .unwrap();
        match err {
            Error::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            check(
                dir.join("keys/bob.der"),
                dir.join("nothing.dat"),
                dir.join("docs/invoice.pdf")
            ),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_non_rsa_key_file_is_not_a_failed_check() {
        let dir = test_data();
        assert!(matches!(
            check(
                dir.join("keys/ec.der"),
                dir.join("signature.dat"),
                dir.join("docs/invoice.pdf")
            ),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            load_key_file(dir.join("keys/README.txt")),
            Err(Error::MalformedEncoding)
        ));
    }

    #[test]
    fn test_empty_signature_file() {
        let scratch = tempfile::tempdir().unwrap();
        let empty = scratch.path().join("empty.dat");
        std::fs::write(&empty, b"").unwrap();

        let dir = test_data();
        assert!(matches!(
            check(dir.join("keys/bob.der"), &empty, dir.join("docs/invoice.pdf")),
            Err(Error::MalformedSignature(_))
        ));
    }
}
