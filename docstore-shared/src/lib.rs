//! # Document Store Shared
//!
//! Record types shared between the document store client and the programs
//! that use it.

pub mod changes;
pub mod person;
pub mod record;

pub use changes::FieldChanges;
pub use person::Person;
pub use record::Record;
