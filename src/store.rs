use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

static ASSETS: Dir = include_dir!("assets");

const HEADER: [&str; 3] = ["word", "best_response", "shown"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("word table not found at {0}")]
    Missing(PathBuf),
    #[error("position {position} out of range for table of {len} records")]
    InvalidPosition { position: usize, len: usize },
    #[error("word table unreadable: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One row of the word table. `position` is the record's stable ordinal
/// index in the store and is what `mark_shown` addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub response: String,
    pub shown: bool,
    pub position: usize,
}

#[derive(Debug, Deserialize)]
struct SeedWord {
    word: String,
    response: String,
}

/// Durable word → response → shown mapping backed by a flat CSV file.
///
/// Every mutation rewrites the whole table (tens to low hundreds of rows,
/// mutated at most once per word transition) through a sibling temp file and
/// a rename, so the table on disk never holds a partial row.
#[derive(Debug)]
pub struct WordStore {
    path: PathBuf,
    records: Vec<WordRecord>,
    skipped_rows: usize,
}

impl WordStore {
    /// Reads all rows in file order. Rows with fewer than three fields or a
    /// blank word are skipped and counted, not fatal. Words are uppercased
    /// once here; the shown flag matches "true" case-insensitively.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(StoreError::Missing(path));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;

        let mut records = Vec::new();
        let mut skipped_rows = 0;
        for row in reader.records() {
            let row = row?;
            if row.len() < 3 {
                skipped_rows += 1;
                continue;
            }
            let word = row[0].trim().to_uppercase();
            if word.is_empty() {
                skipped_rows += 1;
                continue;
            }
            records.push(WordRecord {
                word,
                response: row[1].trim().to_string(),
                shown: row[2].trim().eq_ignore_ascii_case("true"),
                position: records.len(),
            });
        }

        Ok(Self {
            path,
            records,
            skipped_rows,
        })
    }

    /// Populates the table with the built-in default set, all unshown,
    /// overwriting anything already at `path`.
    pub fn initialize_default<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let records = default_words()
            .into_iter()
            .enumerate()
            .map(|(position, seed)| WordRecord {
                word: seed.word.trim().to_uppercase(),
                response: seed.response,
                shown: false,
                position,
            })
            .collect();

        let store = Self {
            path: path.as_ref().to_path_buf(),
            records,
            skipped_rows: 0,
        };
        store.persist()?;
        Ok(store)
    }

    /// Loads the table, seeding the default set first if it does not exist.
    pub fn open_or_seed<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        match Self::load(path.as_ref()) {
            Err(StoreError::Missing(_)) => Self::initialize_default(path),
            other => other,
        }
    }

    /// Marks the record at `position` shown and persists synchronously.
    /// An out-of-range position is a contract violation under the
    /// single-writer model and is surfaced, not swallowed.
    pub fn mark_shown(&mut self, position: usize) -> Result<(), StoreError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(position)
            .ok_or(StoreError::InvalidPosition { position, len })?;
        record.shown = true;
        self.persist()
    }

    /// Clears every shown flag and persists synchronously.
    pub fn reset_all(&mut self) -> Result<(), StoreError> {
        for record in &mut self.records {
            record.shown = false;
        }
        self.persist()
    }

    pub fn count_shown(&self) -> usize {
        self.records.iter().filter(|r| r.shown).count()
    }

    pub fn count_total(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&WordRecord> {
        self.records.get(position)
    }

    /// Rows dropped by tolerant parsing during the last load.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        // No quoting: the on-disk format is plain comma-delimited text. A
        // comma inside a response is a documented limitation of the format.
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for record in &self.records {
            writer.write_record([
                record.word.as_str(),
                record.response.as_str(),
                if record.shown { "true" } else { "false" },
            ])?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn default_words() -> Vec<SeedWord> {
    let file = ASSETS
        .get_file("default_words.json")
        .expect("default word set missing from binary");
    let raw = file
        .contents_utf8()
        .expect("default word set is not valid utf-8");
    serde_json::from_str(raw).expect("unable to deserialize default word set")
}
