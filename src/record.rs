//! Creation, canonical encoding, and validation of signed name records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{Keypair, PublicKey};
use crate::error::Error;
use crate::id::RecordId;
use crate::validity::{self, ValidityType};

/// A signed, versioned pointer from a public-key identifier to an opaque
/// value, with an expiry.
///
/// A record is constructed once by [`Record::create`] and is immutable in
/// spirit thereafter: any change to its signed fields invalidates the
/// signature. "Updating" a name means publishing a new record with a higher
/// sequence number and/or a later expiry under the same identifier.
///
/// Field order is the wire order; the canonical binary form is the postcard
/// encoding of this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub(crate) value: Vec<u8>,
    pub(crate) validity_type: ValidityType,
    pub(crate) validity: Vec<u8>,
    pub(crate) sequence: u64,
    pub(crate) signature: Vec<u8>,
    pub(crate) public_key: Option<Vec<u8>>,
}

impl Record {
    /// Create a new record pointing at `value`, expiring at `eol`, and sign
    /// it with `keypair`.
    ///
    /// This does not embed the public key; use [`Record::embed_public_key`]
    /// when the identifier alone cannot recover it.
    pub fn create(
        keypair: &Keypair,
        value: impl Into<Vec<u8>>,
        sequence: u64,
        eol: DateTime<Utc>,
    ) -> Self {
        let value = value.into();
        let validity = validity::format_timestamp(eol).into_bytes();
        let signature = keypair.sign(&signable_bytes(&value, &validity, ValidityType::Eol));

        Self {
            value,
            validity_type: ValidityType::Eol,
            validity,
            sequence,
            signature,
            public_key: None,
        }
    }

    // === Getters ===

    /// The opaque value this record points at.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The record's validity scheme.
    #[must_use]
    pub fn validity_type(&self) -> ValidityType {
        self.validity_type
    }

    /// The raw validity field (canonical timestamp text for EOL records).
    #[must_use]
    pub fn validity(&self) -> &[u8] {
        &self.validity
    }

    /// The producer-assigned sequence number.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The signature over the record's signable form.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The raw-encoded public key embedded in this record, if any.
    #[must_use]
    pub fn public_key(&self) -> Option<&[u8]> {
        self.public_key.as_deref()
    }

    /// The expiry of this record.
    ///
    /// Fails with [`Error::UnrecognizedValidityType`] when the validity
    /// scheme is not EOL, and [`Error::MalformedRecord`] when the timestamp
    /// text cannot be parsed.
    pub fn eol(&self) -> Result<DateTime<Utc>, Error> {
        if self.validity_type != ValidityType::Eol {
            return Err(Error::UnrecognizedValidityType);
        }
        validity::parse_timestamp(&self.validity)
    }

    // === Public Methods ===

    /// Validate this record against the producer's public key.
    ///
    /// Verifies the signature over the signable form recomputed from the
    /// record's current field values, then checks that the record has not
    /// expired. Performs no mutation and has no side effects.
    pub fn validate(&self, public_key: &PublicKey) -> Result<(), Error> {
        let signable = signable_bytes(&self.value, &self.validity, self.validity_type);
        if !public_key.verify(&signable, &self.signature) {
            return Err(Error::SignatureInvalid);
        }

        if self.eol()? <= Utc::now() {
            return Err(Error::ExpiredRecord);
        }
        Ok(())
    }

    /// Embed `public_key` in this record so validators can resolve it
    /// without a keystore.
    ///
    /// When the key's derived identifier already recovers the key, nothing
    /// is embedded, keeping the record small. Idempotent.
    pub fn embed_public_key(&mut self, public_key: &PublicKey) {
        if RecordId::from_public_key(public_key).public_key().is_some() {
            return;
        }
        self.public_key = Some(public_key.to_bytes());
    }

    /// Extract a public key matching `id` from this record, if possible.
    ///
    /// An embedded key is decoded and checked against `id`; failing that
    /// check is [`Error::PublicKeyMismatch`]. Without an embedded key the
    /// identifier itself is consulted. `Ok(None)` means no key could be
    /// determined and nothing is malformed.
    pub fn extract_public_key(&self, id: &RecordId) -> Result<Option<PublicKey>, Error> {
        if let Some(encoded) = &self.public_key {
            let public_key = PublicKey::from_bytes(encoded)?;
            if RecordId::from_public_key(&public_key) != *id {
                return Err(Error::PublicKeyMismatch);
            }
            return Ok(Some(public_key));
        }

        Ok(id.public_key())
    }

    /// Serialize this record to its canonical binary representation.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        postcard::to_allocvec(self).expect("Record::serialize")
    }

    /// Deserialize a record from its canonical binary representation.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        postcard::from_bytes(bytes).map_err(|_| Error::MalformedRecord)
    }
}

/// The signable form: strict concatenation of the value, the validity
/// field, and the textual name of the validity type. No length prefixes, no
/// separators; changing this framing breaks all existing signatures.
fn signable_bytes(value: &[u8], validity: &[u8], validity_type: ValidityType) -> Vec<u8> {
    let type_name = validity_type.to_string();

    let mut signable = Vec::with_capacity(value.len() + validity.len() + type_name.len());
    signable.extend_from_slice(value);
    signable.extend_from_slice(validity);
    signable.extend_from_slice(type_name.as_bytes());
    signable
}
