//! Data sources for the feeder.
//!
//! A source yields records in sequential chunks. An empty chunk means the
//! source is exhausted.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use catalog_search_shared::Indexable;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use crate::errors::FeedError;

/// Trait for reading records to feed, one chunk at a time.
///
/// This trait allows the feeder to be tested with in-memory records and run
/// in production against a file export.
#[async_trait]
pub trait DataSource: Send {
    type Record: Indexable + Send;

    /// Read up to `chunk_size` records. Returns an empty vector once exhausted.
    async fn next_chunk(&mut self, chunk_size: usize) -> Result<Vec<Self::Record>, FeedError>;
}

/// In-memory source over a vector of records.
pub struct VecSource<T> {
    records: std::vec::IntoIter<T>,
}

impl<T> VecSource<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }

    /// Records not yet handed out.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl<T: Indexable + Send> DataSource for VecSource<T> {
    type Record = T;

    async fn next_chunk(&mut self, chunk_size: usize) -> Result<Vec<T>, FeedError> {
        Ok(self.records.by_ref().take(chunk_size).collect())
    }
}

/// Newline-delimited JSON file, one record per line. Blank lines are skipped.
pub struct JsonLinesSource<T> {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonLinesSource<T> {
    /// Open the file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .await
            .map_err(|e| FeedError::parse(format!("Cannot open {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Opened JSON lines source");

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<T> DataSource for JsonLinesSource<T>
where
    T: Indexable + DeserializeOwned + Send,
{
    type Record = T;

    async fn next_chunk(&mut self, chunk_size: usize) -> Result<Vec<T>, FeedError> {
        let mut chunk = Vec::with_capacity(chunk_size);
        while chunk.len() < chunk_size {
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| {
                FeedError::parse(format!(
                    "{}:{}: {}",
                    self.path.display(),
                    self.line_number,
                    e
                ))
            })?;
            chunk.push(record);
        }
        Ok(chunk)
    }
}
