use crate::error::{RegistryError, Result};
use crate::records::RegistryRecords;
use std::fs;
use std::path::{Path, PathBuf};

/// Registry records loaded from one file or a directory of record files
#[derive(Debug, Clone, Default)]
pub struct RecordCorpus {
    records: RegistryRecords,
    /// Files read, in load order
    files: Vec<PathBuf>,
}

impl RecordCorpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a JSON file, or from every `*.json` file under a directory
    ///
    /// Directory contents are merged in lexical path order so that runs over
    /// the same snapshot always ingest records in the same sequence.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RegistryError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let mut corpus = Self::new();
        if path.is_dir() {
            for file in find_record_files(path)? {
                corpus.load_file(&file)?;
            }
        } else {
            corpus.load_file(path)?;
        }
        tracing::debug!(
            path = %path.display(),
            files = corpus.files.len(),
            records = corpus.records.len(),
            "loaded registry records"
        );
        Ok(corpus)
    }

    /// Parse one record file and merge it into the corpus
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let records: RegistryRecords = match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => return Err(RegistryError::parse_error_with_source(e, path, content)),
        };
        self.records.merge(records);
        self.files.push(path.to_path_buf());
        Ok(())
    }

    pub fn records(&self) -> &RegistryRecords {
        &self.records
    }

    pub fn into_records(self) -> RegistryRecords {
        self.records
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of records across all files
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All `*.json` files under `dir`, sorted by path
fn find_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
