//! Typed values and record marshaling for the Quick Base API.
//!
//! Field values arrive from two places: strings typed on the command line or
//! read from CSV, and untyped JSON fragments in API responses. Both are turned
//! into [`Value`]s using the field's declared [`FieldType`], which is looked
//! up in a [`SchemaCache`] or taken from the `fields` array of a response.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

pub mod codec;
mod error;
pub mod field_type;
pub mod record;
pub mod schema;
pub mod value;

pub use codec::{Metadata, QueryResult, build_record, decode_query_result, encode_for_insert};
pub use error::{BoxError, Error, Result};
pub use field_type::{FieldType, Storage};
pub use record::{FieldId, RECORD_ID_FIELD, Record};
pub use schema::{FieldDescriptor, SchemaCache, SchemaSource, TableSchema};
pub use value::{File, FileVersion, User, Value};
