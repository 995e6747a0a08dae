//! Normalization: schema mapping, merge/repair, and final validation.

mod merger;
mod schema;
mod validator;

pub use merger::Normalizer;
pub use schema::{coerce_numeric, CanonicalField, FieldMap};
pub use validator::SchemaValidator;
