//! The `Record` trait implemented by every type stored through the client.

use serde::{de::DeserializeOwned, Serialize};

/// A value that can be stored in a collection under a caller-chosen id.
///
/// The id returned by [`Record::record_id`] is used as the storage key. Writing
/// a record whose id already exists replaces the stored version.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// The stable identifier used as the storage key.
    fn record_id(&self) -> &str;
}
