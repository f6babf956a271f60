//! RSASSA-PKCS1-v1_5 signature verification over SHA-1 digests.
//!
//! The signature is opened with the public exponent and compared, as a whole,
//! against the encoding the signer must have produced. No parsing of the
//! recovered block takes place, so there is no padding parser to fool.

use std::cmp::Ordering;

use openssl::bn::{BigNum, BigNumContext};
use openssl::memcmp;
use openssl::sha::sha1;

use crate::{Error, Outcome, PublicKey, Result};

/// DER encoding of a SHA-1 `DigestInfo` up to, but not including, the digest
/// octets.
pub const SHA1_DIGEST_INFO_PREFIX: [u8; 15] = [
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04, 0x14,
];

const SHA1_LEN: usize = 20;

/// At least 8 bytes of 0xFF padding, plus 0x00 0x01 and the 0x00 delimiter.
const MIN_PADDING_LEN: usize = 11;

/// Smallest modulus, in bytes, able to carry a SHA-1 signature.
pub const MIN_MODULUS_LEN: usize = MIN_PADDING_LEN + SHA1_DIGEST_INFO_PREFIX.len() + SHA1_LEN;

/// Checks if `signature` is an RSA signature of the SHA-1 digest of `message`
/// under `key`, with PKCS #1 v1.5 padding.
///
/// Returns [`Outcome::Invalid`] only when the inputs are well formed and the
/// signature simply does not match. Inputs that can not be checked at all are
/// errors:
/// - [`Error::ModulusTooSmall`] if the key can not hold a SHA-1 signature;
/// - [`Error::MalformedSignature`] if the signature is empty, does not have
///   the length of the modulus, or its value is not below the modulus.
pub fn verify(key: &PublicKey, signature: &[u8], message: &[u8]) -> Result<Outcome> {
    let k = key.size();
    let expected = encode_sha1_digest_info(&sha1(message), k)?;

    if signature.is_empty() {
        return Err(Error::MalformedSignature("signature is empty"));
    }
    if signature.len() != k {
        return Err(Error::MalformedSignature(
            "signature length differs from the modulus length",
        ));
    }

    let s = BigNum::from_slice(signature)?;
    if s.ucmp(key.modulus()) != Ordering::Less {
        return Err(Error::MalformedSignature(
            "signature value is not smaller than the modulus",
        ));
    }

    let mut ctx = BigNumContext::new()?;
    let mut m = BigNum::new()?;
    m.mod_exp(&s, key.exponent(), key.modulus(), &mut ctx)?;
    let recovered = m.to_vec_padded(k as i32)?;

    if memcmp::eq(&recovered, &expected) {
        Ok(Outcome::Valid)
    } else {
        Ok(Outcome::Invalid)
    }
}

/// Builds the EMSA-PKCS1-v1_5 encoding of a SHA-1 digest for a modulus of
/// `k` bytes:
///
/// ```text
/// 0x00 0x01 0xFF .. 0xFF 0x00 DigestInfo(SHA-1) digest
/// ```
pub fn encode_sha1_digest_info(digest: &[u8; SHA1_LEN], k: usize) -> Result<Vec<u8>> {
    if k < MIN_MODULUS_LEN {
        return Err(Error::ModulusTooSmall { bytes: k });
    }
    let fill = k - 3 - SHA1_DIGEST_INFO_PREFIX.len() - SHA1_LEN;

    let mut encoded = Vec::with_capacity(k);
    encoded.extend_from_slice(&[0x00, 0x01]);
    encoded.resize(2 + fill, 0xff);
    encoded.push(0x00);
    encoded.extend_from_slice(&SHA1_DIGEST_INFO_PREFIX);
    encoded.extend_from_slice(digest);
    debug_assert_eq!(encoded.len(), k);

    Ok(encoded)
}
