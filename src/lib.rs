pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod report;

pub use analysis::Analysis;
pub use catalog::{Catalog, CatalogEntry};
pub use config::{Config, OutputFormat};
pub use error::ReportError;
pub use report::{extract, extract_with, ErrorTable, ErrorType, ExtractOptions, Metadata, Report};
