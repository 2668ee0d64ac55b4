//! Validity schemes and the expiry timestamp profile.

use core::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Wire code of the [`ValidityType::Eol`] scheme.
const EOL_CODE: u64 = 0;

/// The exact textual profile of expiry timestamps: RFC3339, UTC only,
/// nanosecond precision. Anything else is rejected on decode.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

/// The validity scheme of a record.
///
/// Unknown codes survive the codec unchanged so newer records can flow
/// through older nodes, but they fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityType {
    /// "End of life": the record expires at an absolute timestamp held in
    /// the record's validity field.
    Eol,
    /// A scheme this version does not understand.
    Unknown(u64),
}

impl ValidityType {
    /// The scheme's wire code.
    #[must_use]
    pub fn code(&self) -> u64 {
        match self {
            Self::Eol => EOL_CODE,
            Self::Unknown(code) => *code,
        }
    }
}

impl From<u64> for ValidityType {
    fn from(code: u64) -> Self {
        match code {
            EOL_CODE => Self::Eol,
            code => Self::Unknown(code),
        }
    }
}

/// The textual name signed into the record's signable form.
impl fmt::Display for ValidityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eol => f.write_str("EOL"),
            Self::Unknown(code) => write!(f, "{code}"),
        }
    }
}

impl Serialize for ValidityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.code())
    }
}

impl<'de> Deserialize<'de> for ValidityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(u64::deserialize(deserializer)?.into())
    }
}

/// Render an expiry to the canonical timestamp text stored in a record's
/// validity field.
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a validity field back into an expiry.
///
/// Rejects anything that is not exactly the canonical profile, offsets and
/// shortened fractions included.
pub fn parse_timestamp(bytes: &[u8]) -> Result<DateTime<Utc>, Error> {
    let text = core::str::from_utf8(bytes).map_err(|_| Error::MalformedRecord)?;
    let instant = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::MalformedRecord)?;

    // Only the canonical rendering is valid; re-formatting must reproduce
    // the input exactly.
    if format_timestamp(instant) != text {
        return Err(Error::MalformedRecord);
    }

    Ok(instant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_round_trip() {
        for code in [0, 1, 7, u64::MAX] {
            assert_eq!(ValidityType::from(code).code(), code);
        }
        assert_eq!(ValidityType::from(0), ValidityType::Eol);
        assert_eq!(ValidityType::from(3), ValidityType::Unknown(3));
    }

    #[test]
    fn signable_names() {
        assert_eq!(ValidityType::Eol.to_string(), "EOL");
        assert_eq!(ValidityType::Unknown(7).to_string(), "7");
    }

    #[test]
    fn timestamp_round_trip() {
        let now = Utc::now();
        let text = format_timestamp(now);

        assert_eq!(parse_timestamp(text.as_bytes()), Ok(now));
    }

    #[test]
    fn timestamp_profile_is_strict() {
        // Exactly the profile.
        assert!(parse_timestamp(b"2026-08-07T10:20:30.000000001Z").is_ok());

        for bad in [
            &b""[..],
            b"not a timestamp",
            // No fractional seconds.
            b"2026-08-07T10:20:30Z",
            // Too few fractional digits.
            b"2026-08-07T10:20:30.123456Z",
            // Offset instead of the literal Z.
            b"2026-08-07T10:20:30.000000001+00:00",
            // Trailing garbage.
            b"2026-08-07T10:20:30.000000001Z ",
            // Not UTF-8.
            &[0xff, 0xfe, 0xfd][..],
        ] {
            assert_eq!(parse_timestamp(bad), Err(Error::MalformedRecord));
        }
    }
}
