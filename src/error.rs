//! Error taxonomy shared across the crate.

/// Error validating, decoding, comparing, or selecting records.
///
/// Every failure path maps to exactly one variant so callers can branch on
/// cause (e.g. distinguish "republish needed" from "corrupt peer data").
/// No variant is retried internally; retry and backoff policy belongs to the
/// surrounding infrastructure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Record bytes could not be deserialized, or a validity timestamp
    /// could not be parsed.
    #[error("record could not be deserialized")]
    MalformedRecord,

    /// The record uses a validity scheme this version does not understand.
    #[error("unrecognized validity type")]
    UnrecognizedValidityType,

    /// Cryptographic signature verification failed.
    #[error("record signature verification failed")]
    SignatureInvalid,

    /// The record's expiry is at or before the current time.
    #[error("expired record")]
    ExpiredRecord,

    /// The record key is not of the form `/<namespace>/<identifier>`.
    #[error("record key path is invalid")]
    InvalidPath,

    /// The record key's identifier segment could not be parsed.
    #[error("record key could not be parsed into an identifier")]
    KeyFormat,

    /// No public key was found embedded in the record, recoverable from the
    /// identifier, or present in the keystore.
    #[error("public key not found for record identifier")]
    PublicKeyNotFound,

    /// The public key embedded in the record does not correspond to the
    /// identifier the record was stored under.
    #[error("public key in record did not match record identifier")]
    PublicKeyMismatch,

    /// Selection was called with an empty candidate set.
    #[error("no usable records in given set")]
    NoUsableRecords,
}
