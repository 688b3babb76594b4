//! Resume and job-description ingestion.

pub mod loader;
#[cfg(feature = "office-documents")]
pub mod office;
pub mod parser;
pub mod routes;
pub mod schema;

pub use loader::{DocumentFormat, PlainTextExtractor, TextExtractor, decode_text, load_document};
#[cfg(feature = "office-documents")]
pub use office::OfficeTextExtractor;
pub use parser::{DocumentParser, FileUpload, ParserConfig};
pub use routes::{DocumentRouteState, document_routes};
pub use schema::{ParsedJobDescription, ParsedResume};
