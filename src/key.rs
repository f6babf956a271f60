//! Decoding of X.509 SubjectPublicKeyInfo encoded RSA public keys.

use der::asn1::ObjectIdentifier;
use der::Decode;
use openssl::bn::{BigNum, BigNumRef};
use openssl::nid::Nid;
use openssl::pkey::{Id, PKey};
use spki::SubjectPublicKeyInfoRef;

use crate::{Error, Result};

/// rsaEncryption, from PKCS #1.
const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// An RSA public key, reduced to the two numbers needed to verify signatures.
#[derive(Debug)]
pub struct PublicKey {
    modulus: BigNum,
    exponent: BigNum,
}

impl PublicKey {
    /// Builds a key from its modulus `n` and public exponent `e`.
    ///
    /// Both numbers must be positive, and the modulus odd, otherwise the
    /// components can not come from an RSA key.
    pub fn from_components(modulus: BigNum, exponent: BigNum) -> Result<Self> {
        if modulus.is_negative()
            || exponent.is_negative()
            || modulus.num_bits() == 0
            || exponent.num_bits() == 0
            || !modulus.is_bit_set(0)
        {
            return Err(Error::MalformedEncoding);
        }
        Ok(Self { modulus, exponent })
    }

    pub fn modulus(&self) -> &BigNumRef {
        &self.modulus
    }

    pub fn exponent(&self) -> &BigNumRef {
        &self.exponent
    }

    /// Length of the modulus in bytes, which is also the length of every
    /// signature made with this key.
    pub fn size(&self) -> usize {
        self.modulus.num_bytes() as usize
    }

    pub fn bits(&self) -> u32 {
        self.modulus.num_bits() as u32
    }
}

/// Decodes a DER encoded SubjectPublicKeyInfo holding an RSA public key.
///
/// The input must be exactly one DER structure: trailing bytes, BER
/// encodings and anything that is not a SubjectPublicKeyInfo are
/// [`Error::MalformedEncoding`]. Keys of any other algorithm, including ones
/// OpenSSL does not know about, are [`Error::UnsupportedAlgorithm`].
pub fn load_public_key(der: &[u8]) -> Result<PublicKey> {
    if der.is_empty() {
        return Err(Error::MalformedEncoding);
    }
    let pkey = PKey::public_key_from_der(der).map_err(|_| undecodable_key_error(der))?;

    // OpenSSL stops reading at the end of the first structure, and accepts
    // some non canonical encodings. The canonical encoding of what was
    // decoded must be the whole input.
    if pkey.public_key_to_der()? != der {
        return Err(Error::MalformedEncoding);
    }

    if pkey.id() != Id::RSA {
        return Err(Error::UnsupportedAlgorithm(algorithm_name(pkey.id())));
    }

    let rsa = pkey.rsa()?;
    PublicKey::from_components(rsa.n().to_owned()?, rsa.e().to_owned()?)
}

/// Tells apart a key OpenSSL could not decode because of its algorithm from
/// one that is not a SubjectPublicKeyInfo at all.
fn undecodable_key_error(der: &[u8]) -> Error {
    match SubjectPublicKeyInfoRef::from_der(der) {
        Ok(info) if info.algorithm.oid != RSA_ENCRYPTION => {
            Error::UnsupportedAlgorithm(info.algorithm.oid.to_string())
        }
        _ => Error::MalformedEncoding,
    }
}

/// OpenSSL short name of the key algorithm, e.g. `id-ecPublicKey`.
fn algorithm_name(id: Id) -> String {
    match Nid::from_raw(id.as_raw()).short_name() {
        Ok(name) => name.to_string(),
        Err(_) => format!("NID {}", id.as_raw()),
    }
}
