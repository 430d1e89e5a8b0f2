//! Craftledger Data -- the flat line-based record formats.
//!
//! Everything here converts between text records and `craftledger-core`
//! types: recipe records, merged-list records, inventory records, raw list
//! files, and recipe extraction from annotated merged lines. Parsing is
//! per-record; one malformed line never poisons its neighbors.

pub mod extract;
pub mod record;

pub use extract::extract_recipe;
pub use record::{ListRecord, RecordError};
