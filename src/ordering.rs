//! Deterministic ordering of conflicting records and winner selection.
//!
//! Independent producers can race on the same identifier, so every node
//! must pick the same winner from the same candidate set without
//! coordination. [`compare`] orders two records by sequence number and
//! expiry; [`select`] extends that partial order with a raw-byte tie-break,
//! making it total and the winner independent of candidate order.

use core::cmp::Ordering;

use crate::error::Error;
use crate::record::Record;
use crate::validity;

/// Outcome of comparing record `a` against record `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrdering {
    /// `a` is superseded by `b`.
    Older,
    /// `a` supersedes `b`.
    Newer,
    /// Neither record supersedes the other. This does not mean they are
    /// equal; break the tie by comparing serialized byte forms.
    Unordered,
}

/// Compare two records by sequence number, then by expiry.
///
/// Fails with [`Error::MalformedRecord`] when a validity field does not
/// parse; validate records before comparing them. Signatures are not
/// checked here.
pub fn compare(a: &Record, b: &Record) -> Result<RecordOrdering, Error> {
    match a.sequence().cmp(&b.sequence()) {
        Ordering::Greater => return Ok(RecordOrdering::Newer),
        Ordering::Less => return Ok(RecordOrdering::Older),
        Ordering::Equal => {}
    }

    let a_eol = validity::parse_timestamp(a.validity())?;
    let b_eol = validity::parse_timestamp(b.validity())?;

    Ok(match a_eol.cmp(&b_eol) {
        Ordering::Greater => RecordOrdering::Newer,
        Ordering::Less => RecordOrdering::Older,
        Ordering::Equal => RecordOrdering::Unordered,
    })
}

/// Pick the authoritative record among serialized candidates, returning its
/// index.
///
/// Fails with [`Error::NoUsableRecords`] on an empty set and with a decode
/// error when any candidate is malformed. Candidates are expected to carry
/// already-validated signatures; none are re-verified here. The winner is
/// the same whatever order the candidates arrive in.
pub fn select(values: &[Vec<u8>]) -> Result<usize, Error> {
    if values.is_empty() {
        return Err(Error::NoUsableRecords);
    }

    let records = values
        .iter()
        .map(|bytes| Record::deserialize(bytes))
        .collect::<Result<Vec<_>, _>>()?;

    let mut best = 0;
    for challenger in 1..records.len() {
        if total_compare(
            &records[best],
            &values[best],
            &records[challenger],
            &values[challenger],
        )? == Ordering::Less
        {
            best = challenger;
        }
    }

    Ok(best)
}

/// [`compare`] extended into a total order by breaking unordered pairs with
/// their raw serialized bytes.
fn total_compare(a: &Record, a_bytes: &[u8], b: &Record, b_bytes: &[u8]) -> Result<Ordering, Error> {
    Ok(match compare(a, b)? {
        RecordOrdering::Newer => Ordering::Greater,
        RecordOrdering::Older => Ordering::Less,
        RecordOrdering::Unordered => a_bytes.cmp(b_bytes),
    })
}
