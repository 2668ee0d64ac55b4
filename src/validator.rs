//! The validator adapter exposed to the key/value storage layer.
//!
//! Records live under namespace-qualified keys of the form
//! `/signpost/<identifier>`. [`Validator`] maps such a key back to its
//! identifier, resolves the producer's public key (embedded in the record,
//! recovered from the identifier, or looked up in an injected [`Keystore`]),
//! and then validates or selects records through the crate's core.

use crate::crypto::PublicKey;
use crate::error::Error;
use crate::id::RecordId;
use crate::ordering;
use crate::record::Record;

/// The namespace component of record keys.
pub const NAMESPACE: &str = "signpost";

/// Returns the storage key for a given record identifier.
#[must_use]
pub fn record_key(id: &RecordId) -> String {
    format!("/{NAMESPACE}/{id}")
}

/// Read-only lookup of public keys by identifier, supplied by surrounding
/// infrastructure (e.g. a peer store).
///
/// Implementations must be safe for concurrent reads; this crate never
/// writes through this interface.
pub trait Keystore {
    /// The public key for `id`, or `None` when it is unknown.
    fn public_key(&self, id: &RecordId) -> Option<PublicKey>;
}

/// The record-validator contract expected by the key/value storage layer.
pub trait RecordValidator {
    /// Validate a serialized record stored under `key`.
    fn validate(&self, key: &str, value: &[u8]) -> Result<(), Error>;

    /// Pick the authoritative candidate for `key`, returning its index.
    fn select(&self, key: &str, values: &[Vec<u8>]) -> Result<usize, Error>;
}

/// Validates and selects name records for the `/signpost/` namespace.
#[derive(Default)]
pub struct Validator {
    /// Used to look up keys that are neither embedded in the record nor
    /// recoverable from the identifier.
    keystore: Option<Box<dyn Keystore + Send + Sync>>,
}

impl Validator {
    /// A validator without a keystore: only embedded or
    /// identifier-recoverable keys can validate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator that falls back to `keystore` lookups.
    #[must_use]
    pub fn with_keystore(keystore: impl Keystore + Send + Sync + 'static) -> Self {
        Self {
            keystore: Some(Box::new(keystore)),
        }
    }

    fn resolve_public_key(&self, id: &RecordId, record: &Record) -> Result<PublicKey, Error> {
        if let Some(public_key) = record.extract_public_key(id)? {
            return Ok(public_key);
        }

        match &self.keystore {
            Some(keystore) => {
                if let Some(public_key) = keystore.public_key(id) {
                    return Ok(public_key);
                }
                tracing::debug!(%id, "public key not embedded in record and not found in keystore");
            }
            None => {
                tracing::debug!(%id, "public key not embedded in record and no keystore provided");
            }
        }

        Err(Error::PublicKeyNotFound)
    }
}

impl RecordValidator for Validator {
    fn validate(&self, key: &str, value: &[u8]) -> Result<(), Error> {
        let id_text = split_key(key)?;
        let Ok(id) = id_text.parse::<RecordId>() else {
            tracing::debug!(key, "record key does not hold a valid identifier");
            return Err(Error::KeyFormat);
        };

        let record = Record::deserialize(value)?;
        let public_key = self.resolve_public_key(&id, &record)?;

        record.validate(&public_key)
    }

    fn select(&self, _key: &str, values: &[Vec<u8>]) -> Result<usize, Error> {
        ordering::select(values)
    }
}

/// Split `/<namespace>/<identifier>` and return the identifier segment.
fn split_key(key: &str) -> Result<&str, Error> {
    let (namespace, id) = key
        .strip_prefix('/')
        .and_then(|rest| rest.split_once('/'))
        .ok_or(Error::InvalidPath)?;

    if namespace != NAMESPACE || id.is_empty() || id.contains('/') {
        return Err(Error::InvalidPath);
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashMap;

    struct MapKeystore(HashMap<RecordId, PublicKey>);

    impl MapKeystore {
        fn of(keypairs: &[&Keypair]) -> Self {
            Self(
                keypairs
                    .iter()
                    .map(|keypair| {
                        let public_key = keypair.public_key();
                        (RecordId::from_public_key(&public_key), public_key)
                    })
                    .collect(),
            )
        }
    }

    impl Keystore for MapKeystore {
        fn public_key(&self, id: &RecordId) -> Option<PublicKey> {
            self.0.get(id).cloned()
        }
    }

    fn check(
        validator: &Validator,
        keypair: &Keypair,
        key: &str,
        value: Option<Vec<u8>>,
        eol: DateTime<Utc>,
        expected: Result<(), Error>,
    ) {
        let value = value.unwrap_or_else(|| {
            Record::create(keypair, b"/fs/abc".to_vec(), 1, eol).serialize()
        });

        assert_eq!(validator.validate(key, &value), expected, "key: {key}");
    }

    #[test]
    fn validate_cases() {
        let hour = Duration::hours(1);
        let now = Utc::now();

        let keypair = Keypair::random_rsa(1024).unwrap();
        let other = Keypair::random_rsa(1024).unwrap();
        let id = RecordId::from_public_key(&keypair.public_key());
        let other_id = RecordId::from_public_key(&other.public_key());

        let known = Validator::with_keystore(MapKeystore::of(&[&keypair]));
        let empty = Validator::with_keystore(MapKeystore(HashMap::new()));

        let good_key = record_key(&id);

        check(&known, &keypair, &good_key, None, now + hour, Ok(()));
        check(
            &known,
            &keypair,
            &good_key,
            None,
            now - hour,
            Err(Error::ExpiredRecord),
        );
        check(
            &known,
            &keypair,
            &good_key,
            Some(b"bad data".to_vec()),
            now + hour,
            Err(Error::MalformedRecord),
        );
        check(
            &known,
            &keypair,
            "/signpost/not-an-identifier",
            None,
            now + hour,
            Err(Error::KeyFormat),
        );
        check(
            &empty,
            &keypair,
            &good_key,
            None,
            now + hour,
            Err(Error::PublicKeyNotFound),
        );
        check(
            &known,
            &other,
            &record_key(&other_id),
            None,
            now + hour,
            Err(Error::PublicKeyNotFound),
        );
        check(
            &known,
            &other,
            &good_key,
            None,
            now + hour,
            Err(Error::SignatureInvalid),
        );
        check(
            &known,
            &keypair,
            &format!("//{id}"),
            None,
            now + hour,
            Err(Error::InvalidPath),
        );
        check(
            &known,
            &keypair,
            &format!("/badns/{id}"),
            None,
            now + hour,
            Err(Error::InvalidPath),
        );
        check(
            &known,
            &keypair,
            &format!("signpost/{id}"),
            None,
            now + hour,
            Err(Error::InvalidPath),
        );
        check(
            &known,
            &keypair,
            &format!("/signpost/{id}/extra"),
            None,
            now + hour,
            Err(Error::InvalidPath),
        );
        check(
            &known,
            &keypair,
            "/signpost/",
            None,
            now + hour,
            Err(Error::InvalidPath),
        );
    }

    #[test]
    fn embedded_keys_validate_without_a_keystore() {
        let keypair = Keypair::random_rsa(1024).unwrap();
        let public_key = keypair.public_key();
        let key = record_key(&RecordId::from_public_key(&public_key));
        let validator = Validator::new();

        let mut record =
            Record::create(&keypair, b"/x/y".to_vec(), 1, Utc::now() + Duration::hours(1));

        assert_eq!(
            validator.validate(&key, &record.serialize()),
            Err(Error::PublicKeyNotFound)
        );

        record.embed_public_key(&public_key);
        assert_eq!(validator.validate(&key, &record.serialize()), Ok(()));

        // An unrelated key's encoding embedded in the record.
        record.public_key = Some(Keypair::random_rsa(1024).unwrap().public_key().to_bytes());
        assert_eq!(
            validator.validate(&key, &record.serialize()),
            Err(Error::PublicKeyMismatch)
        );

        record.public_key = Some(b"probably not a public key".to_vec());
        assert_eq!(
            validator.validate(&key, &record.serialize()),
            Err(Error::MalformedRecord)
        );
    }

    #[test]
    fn recoverable_identifiers_validate_without_a_keystore() {
        let keypair = Keypair::random();
        let key = record_key(&RecordId::from_public_key(&keypair.public_key()));
        let record = Record::create(&keypair, b"/x/y".to_vec(), 1, Utc::now() + Duration::hours(1));

        assert_eq!(
            Validator::new().validate(&key, &record.serialize()),
            Ok(())
        );
    }

    #[test]
    fn select_picks_the_newest_candidate() {
        let keypair = Keypair::random();
        let key = record_key(&RecordId::from_public_key(&keypair.public_key()));
        let now = Utc::now();
        let validator = Validator::new();

        let values = vec![
            Record::create(&keypair, b"/x/y".to_vec(), 1, now + Duration::hours(1)).serialize(),
            Record::create(&keypair, b"/x/y".to_vec(), 2, now + Duration::hours(1)).serialize(),
        ];

        assert_eq!(validator.select(&key, &values), Ok(1));
        assert_eq!(
            validator.select(&key, &[]),
            Err(Error::NoUsableRecords)
        );
    }
}
