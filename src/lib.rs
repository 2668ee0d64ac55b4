#![doc = include_str!("../README.md")]
//!

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod crypto;
pub mod error;
pub mod id;
pub mod ordering;
pub mod record;
pub mod validator;
pub mod validity;

pub use crate::crypto::{Keypair, PublicKey};
pub use crate::error::Error;
pub use crate::id::RecordId;
pub use crate::ordering::RecordOrdering;
pub use crate::record::Record;
pub use crate::validator::{record_key, Keystore, RecordValidator, Validator, NAMESPACE};
pub use crate::validity::ValidityType;
