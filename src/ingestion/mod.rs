//! Ingestion: fetch CSV exports (file or HTTP) and decode them into typed
//! records the pipeline can filter and aggregate.

pub mod connector;
pub mod csv_loader;

pub use connector::{source_for, CsvSource, FileSource, HttpSource, InlineSource};
pub use csv_loader::{load, load_social, load_state, parse_records, Dataset, LoadState};
