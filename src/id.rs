//! Stable identifiers derived from public keys.
//!
//! An identifier is the lookup key a record is published under. It is
//! self-describing: small keys are embedded directly so any reader can
//! recover them from the identifier alone, larger keys are replaced by
//! their BLAKE3 digest and must travel embedded in the record or be
//! resolved through a keystore.

use core::fmt;
use core::str::FromStr;

use crate::crypto::PublicKey;
use crate::error::Error;

/// Maximum length of a raw-encoded public key that is embedded directly in
/// its identifier. Ed25519 keys always fit; RSA keys never do.
pub const MAX_INLINE_KEY_LEN: usize = 42;

const INLINE_TAG: u8 = 0;
const HASHED_TAG: u8 = 1;

/// A stable identifier for a record, derived from the producer's public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RecordId(Repr);

#[derive(Clone, PartialEq, Eq, Hash)]
enum Repr {
    /// The raw-encoded public key itself.
    Inline(Vec<u8>),
    /// BLAKE3 digest of the raw-encoded public key.
    Hashed([u8; 32]),
}

impl RecordId {
    /// Derive the identifier for a public key.
    ///
    /// Deterministic: the same key always derives the same identifier.
    #[must_use]
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let encoded = public_key.to_bytes();
        if encoded.len() <= MAX_INLINE_KEY_LEN {
            Self(Repr::Inline(encoded))
        } else {
            Self(Repr::Hashed(*blake3::hash(&encoded).as_bytes()))
        }
    }

    /// Recover the public key from this identifier, when it embeds one.
    ///
    /// Returns `None` for hashed identifiers; those need the key embedded in
    /// the record or resolved through a keystore.
    #[must_use]
    pub fn public_key(&self) -> Option<PublicKey> {
        match &self.0 {
            Repr::Inline(encoded) => PublicKey::from_bytes(encoded).ok(),
            Repr::Hashed(_) => None,
        }
    }

    /// Canonical binary form: a scheme tag byte followed by the payload.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.0 {
            Repr::Inline(encoded) => {
                let mut out = Vec::with_capacity(1 + encoded.len());
                out.push(INLINE_TAG);
                out.extend_from_slice(encoded);
                out
            }
            Repr::Hashed(digest) => {
                let mut out = Vec::with_capacity(1 + digest.len());
                out.push(HASHED_TAG);
                out.extend_from_slice(digest);
                out
            }
        }
    }

    /// Parse an identifier from its canonical binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.split_first() {
            Some((&INLINE_TAG, rest)) => {
                if rest.len() > MAX_INLINE_KEY_LEN {
                    return Err(Error::KeyFormat);
                }
                PublicKey::from_bytes(rest).map_err(|_| Error::KeyFormat)?;
                Ok(Self(Repr::Inline(rest.to_vec())))
            }
            Some((&HASHED_TAG, rest)) => {
                let digest: [u8; 32] = rest.try_into().map_err(|_| Error::KeyFormat)?;
                Ok(Self(Repr::Hashed(digest)))
            }
            _ => Err(Error::KeyFormat),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = base32::encode(base32::Alphabet::Crockford, &self.to_bytes());
        f.write_str(&encoded.to_lowercase())
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordId").field(&self.to_string()).finish()
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = base32::decode(base32::Alphabet::Crockford, &s.to_ascii_uppercase())
            .ok_or(Error::KeyFormat)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn ed25519_ids_recover_their_key() {
        let keypair = Keypair::random();
        let public_key = keypair.public_key();

        let id = RecordId::from_public_key(&public_key);

        assert_eq!(id.public_key(), Some(public_key));
    }

    #[test]
    fn rsa_ids_are_hashed() {
        let keypair = Keypair::random_rsa(1024).unwrap();

        let id = RecordId::from_public_key(&keypair.public_key());

        assert_eq!(id.public_key(), None);
    }

    #[test]
    fn derivation_is_deterministic() {
        let public_key = Keypair::from_secret(&[3; 32]).public_key();

        assert_eq!(
            RecordId::from_public_key(&public_key),
            RecordId::from_public_key(&public_key)
        );
    }

    #[test]
    fn text_round_trip() {
        let inline = RecordId::from_public_key(&Keypair::random().public_key());
        let hashed = RecordId::from_public_key(&Keypair::random_rsa(1024).unwrap().public_key());

        for id in [inline, hashed] {
            assert_eq!(id.to_string().parse::<RecordId>(), Ok(id));
        }
    }

    #[test]
    fn parsing_rejects_garbage() {
        assert_eq!("".parse::<RecordId>(), Err(Error::KeyFormat));
        assert_eq!("not an identifier!".parse::<RecordId>(), Err(Error::KeyFormat));

        // Valid base32 that does not hold a tagged identifier payload.
        let text = base32::encode(base32::Alphabet::Crockford, &[9, 9, 9]).to_lowercase();
        assert_eq!(text.parse::<RecordId>(), Err(Error::KeyFormat));

        // Inline tag without a decodable public key behind it.
        let text =
            base32::encode(base32::Alphabet::Crockford, &[INLINE_TAG, 1, 2, 3]).to_lowercase();
        assert_eq!(text.parse::<RecordId>(), Err(Error::KeyFormat));

        // Hashed tag with a short digest.
        let text =
            base32::encode(base32::Alphabet::Crockford, &[HASHED_TAG, 1, 2, 3]).to_lowercase();
        assert_eq!(text.parse::<RecordId>(), Err(Error::KeyFormat));
    }
}
