//! Verse dataset loading.
//!
//! Reads the shloka CSV (header row, one verse per line) into a [`Dataset`].
//! Failures are returned as [`DatasetError`] so callers can log the cause and
//! degrade: the indexer reports a failed outcome, the random-shloka path
//! answers with an apology.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::VerseRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {} contains no verses", path.display())]
    Empty { path: PathBuf },
}

/// The full verse corpus, in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<VerseRecord>,
}

impl Dataset {
    pub fn new(records: Vec<VerseRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[VerseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pick one verse uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&VerseRecord> {
        self.records.choose(rng)
    }

    /// IDs that appear more than once, in order of first repeat.
    ///
    /// Upserting such rows makes the later row silently replace the earlier.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut dups = Vec::new();
        for record in &self.records {
            let count = seen.entry(record.id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                dups.push(record.id.as_str());
            }
        }
        dups
    }
}

/// Load the verse CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DatasetError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let records = reader
        .deserialize::<VerseRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    if records.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
        });
    }

    let dataset = Dataset::new(records);
    let dups = dataset.duplicate_ids();
    if !dups.is_empty() {
        warn!(
            path = %path.display(),
            duplicates = ?dups,
            "dataset has duplicate verse IDs; later rows will overwrite earlier ones"
        );
    }
    debug!(path = %path.display(), rows = dataset.len(), "loaded dataset");

    Ok(dataset)
}
