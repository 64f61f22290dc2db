//! Metadata extraction
//!
//! Turns a callable's [`FunctionSignature`] into the [`Schema`](crate::types::Schema)
//! handed to the model: types go through the type mapper, descriptions come
//! from the doc comment, and defaults decide which parameters are required.

pub mod docstring;
pub mod extractor;
pub mod json_schema;
pub mod signature;
pub mod type_mapper;

pub use docstring::{parse_doc, ParsedDoc};
pub use extractor::{construct_name, extract_metadata, DocstringExtractor, MetadataExtractor};
pub use json_schema::signature_from_args;
pub use signature::{FunctionSignature, ParamDefault, ParamSignature};
pub use type_mapper::{map_type, map_type_of};
