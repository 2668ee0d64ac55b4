//! Signing keys, verification keys, and their raw wire encoding.

use core::fmt;

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding as _, Signer as _, Verifier as _};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::Error;

const ED25519_KEY_TAG: u8 = 0;
const RSA_KEY_TAG: u8 = 1;

/// A private signing key.
#[derive(Clone)]
pub enum Keypair {
    /// Ed25519 keypair.
    Ed25519(SigningKey),
    /// RSA keypair, signing with PKCS#1 v1.5 over SHA-256.
    Rsa(RsaPrivateKey),
}

impl Keypair {
    /// Generate a random Ed25519 keypair.
    #[must_use]
    pub fn random() -> Self {
        Self::Ed25519(SigningKey::generate(&mut OsRng))
    }

    /// Construct an Ed25519 [`Keypair`] from a 32-byte secret.
    #[must_use]
    pub fn from_secret(secret: &[u8; 32]) -> Self {
        Self::Ed25519(SigningKey::from_bytes(secret))
    }

    /// Generate a random RSA keypair of the given modulus size.
    pub fn random_rsa(bits: usize) -> Result<Self, rsa::Error> {
        Ok(Self::Rsa(RsaPrivateKey::new(&mut OsRng, bits)?))
    }

    /// Return the [`PublicKey`] associated with this [`Keypair`].
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            Self::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
        }
    }

    /// Sign a message, returning the raw signature bytes.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.sign(message).to_bytes().to_vec(),
            Self::Rsa(key) => rsa::pkcs1v15::SigningKey::<Sha256>::new(key.clone())
                .sign(message)
                .to_vec(),
        }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keypair").field(&self.public_key()).finish()
    }
}

/// A public verification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// Ed25519 verification key.
    Ed25519(VerifyingKey),
    /// RSA verification key.
    Rsa(RsaPublicKey),
}

impl PublicKey {
    /// Verify `signature` over `message` with this key.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
                .map(|sig| key.verify(message, &sig).is_ok())
                .unwrap_or(false),
            Self::Rsa(key) => rsa::pkcs1v15::Signature::try_from(signature)
                .map(|sig| {
                    rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key.clone())
                        .verify(message, &sig)
                        .is_ok()
                })
                .unwrap_or(false),
        }
    }

    /// Encode this key to its raw form: an algorithm tag byte followed by
    /// the key material (raw 32 bytes for Ed25519, PKCS#1 DER for RSA).
    ///
    /// This is the form embedded in records and hashed into identifiers.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => {
                let mut out = Vec::with_capacity(1 + 32);
                out.push(ED25519_KEY_TAG);
                out.extend_from_slice(key.as_bytes());
                out
            }
            Self::Rsa(key) => {
                let der = key.to_pkcs1_der().expect("PublicKey::to_bytes");
                let mut out = Vec::with_capacity(1 + der.as_bytes().len());
                out.push(RSA_KEY_TAG);
                out.extend_from_slice(der.as_bytes());
                out
            }
        }
    }

    /// Decode a key from its raw form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.split_first() {
            Some((&ED25519_KEY_TAG, rest)) => {
                let raw: &[u8; 32] = rest.try_into().map_err(|_| Error::MalformedRecord)?;
                VerifyingKey::from_bytes(raw)
                    .map(Self::Ed25519)
                    .map_err(|_| Error::MalformedRecord)
            }
            Some((&RSA_KEY_TAG, rest)) => RsaPublicKey::from_pkcs1_der(rest)
                .map(Self::Rsa)
                .map_err(|_| Error::MalformedRecord),
            _ => Err(Error::MalformedRecord),
        }
    }
}
