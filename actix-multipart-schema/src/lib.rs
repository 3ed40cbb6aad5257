mod bridge;
mod coerce;
mod config;
mod error;
mod extractor;
mod field;
mod file;
mod path;
mod pipeline;
mod schema;
mod validate;

/// Don't use this module directly, use [`actix_multipart_schema_derive::MultipartForm`].
pub mod form;

pub use bridge::*;
pub use coerce::*;
pub use config::*;
pub use error::*;
pub use extractor::*;
pub use field::*;
pub use file::*;
pub use path::*;
pub use pipeline::*;
pub use schema::*;
pub use validate::*;

pub use actix_multipart_schema_derive::MultipartForm;

/// Required for proc-macro usage at runtime.
pub use serde_aux::serde_introspection::serde_introspect;
