//! CSV Loader - turns fetched CSV text into typed, normalized records

use crate::error::{Result, RollupError};
use crate::ingestion::connector::CsvSource;
use crate::records::{Normalize, Platform, SocialPost};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Rows loaded from one source. `id` is unique per load within the process
/// and is what memoized rollups key on.
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub id: u64,
    pub source: String,
    pub records: Vec<T>,
    /// Rows skipped while decoding, one message per row.
    pub warnings: Vec<String>,
}

impl<T> Dataset<T> {
    pub fn new(source: impl Into<String>, records: Vec<T>, warnings: Vec<String>) -> Self {
        Self {
            id: NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed),
            source: source.into(),
            records,
            warnings,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What a view sees of a dataset while it is being fetched.
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    Loading,
    Ready(Dataset<T>),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn from_result(result: Result<Dataset<T>>) -> Self {
        match result {
            Ok(dataset) => LoadState::Ready(dataset),
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn dataset(&self) -> Option<&Dataset<T>> {
        match self {
            LoadState::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Loaded records; empty while loading or after a failure.
    pub fn records(&self) -> &[T] {
        self.dataset().map(|d| d.records.as_slice()).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Parse CSV text with a header row into `T`s.
///
/// Cells and headers are trimmed, blank lines skipped, ragged rows allowed.
/// Columns `T` does not know are ignored and columns it expects but the file
/// lacks take their defaults. A row that still fails to decode is skipped and
/// reported in the returned warnings.
pub fn parse_records<T>(text: &str, source: &str) -> Result<(Vec<T>, Vec<String>)>
where
    T: DeserializeOwned + Normalize,
{
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| RollupError::Parse(format!("Failed to read CSV headers from {}: {}", source, e)))?
        .clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(RollupError::Parse(format!("{} has no header row", source)));
    }
    debug!("{}: {} columns", source, headers.len());

    let width = headers.len();
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for result in rdr.records() {
        let mut row = match result {
            Ok(row) => row,
            Err(e) => {
                skip(&mut warnings, source, e.position().map(|p| p.line()), &e);
                continue;
            }
        };
        // Short rows are padded so every header column has a cell.
        while row.len() < width {
            row.push_field("");
        }
        row.truncate(width);

        match row.deserialize::<T>(Some(&headers)) {
            Ok(mut record) => {
                record.normalize();
                records.push(record);
            }
            Err(e) => skip(&mut warnings, source, row.position().map(|p| p.line()), &e),
        }
    }

    Ok((records, warnings))
}

fn skip(warnings: &mut Vec<String>, source: &str, line: Option<u64>, e: &csv::Error) {
    let line = line.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
    let message = format!("{}: skipped line {}: {}", source, line, e);
    warn!("{}", message);
    warnings.push(message);
}

/// Fetch and parse one source.
pub async fn load<T>(source: &dyn CsvSource) -> Result<Dataset<T>>
where
    T: DeserializeOwned + Normalize,
{
    let text = source.fetch_text().await?;
    let (records, warnings) = parse_records::<T>(&text, source.source_id())?;
    info!(
        "Loaded {} rows from {} ({}), {} skipped",
        records.len(),
        source.source_id(),
        source.source_type(),
        warnings.len()
    );
    Ok(Dataset::new(source.source_id(), records, warnings))
}

/// `load`, with failures folded into `LoadState::Failed`.
pub async fn load_state<T>(source: &dyn CsvSource) -> LoadState<T>
where
    T: DeserializeOwned + Normalize,
{
    let result = load(source).await;
    if let Err(e) = &result {
        warn!("Error loading {}: {}", source.source_id(), e);
    }
    LoadState::from_result(result)
}

/// Social exports do not carry their platform; it is stamped on here.
pub async fn load_social(source: &dyn CsvSource, platform: Platform) -> Result<Dataset<SocialPost>> {
    let mut dataset = load::<SocialPost>(source).await?;
    dataset.records = dataset
        .records
        .into_iter()
        .map(|post| post.with_platform(platform))
        .collect();
    Ok(dataset)
}
