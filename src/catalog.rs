// src/catalog.rs

use glob::{glob_with, MatchOptions};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

use crate::error::{ReportError, Result};
use crate::report::{self, ExtractOptions, Metadata, Report};

/// One report file found in the data directory.
#[derive(Debug)]
pub struct CatalogEntry {
    pub file_name: String,
    pub path: PathBuf,
    /// Listing metadata; a broken header stays attached to its file instead
    /// of failing the whole scan.
    pub metadata: Result<Metadata>,
}

impl CatalogEntry {
    pub fn is_usable(&self) -> bool {
        self.metadata.is_ok()
    }

    /// Re-read the file for the detail view.
    pub fn load(&self, opts: &ExtractOptions) -> Result<Report> {
        report::extract_with(&self.path, opts)
    }
}

/// Listing of the report files in one directory.
#[derive(Debug)]
pub struct Catalog {
    dir: PathBuf,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Find every `*.csv` directly under `dir` and read its metadata.
    #[instrument(level = "info", skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        // glob swallows a failing read_dir as an entry error, so check it here
        if let Err(source) = fs::read_dir(&dir) {
            return Err(ReportError::FileAccess { path: dir, source });
        }

        let pattern = format!("{}/*.csv", glob::Pattern::escape(&dir.to_string_lossy()));
        let opts = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        let mut paths: Vec<PathBuf> = glob_with(&pattern, opts)
            .map_err(|e| ReportError::FileAccess {
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
                path: dir.clone(),
            })?
            .filter_map(|entry| match entry {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("cannot read glob entry: {}", e);
                    None
                }
            })
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let entries: Vec<CatalogEntry> = paths
            .into_par_iter()
            .map(|path| {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let metadata = report::extract_metadata_from(&path);
                if let Err(e) = &metadata {
                    warn!(file = %file_name, "unusable report: {}", e);
                }
                CatalogEntry {
                    file_name,
                    path,
                    metadata,
                }
            })
            .collect();

        info!(
            files = entries.len(),
            usable = entries.iter().filter(|e| e.is_usable()).count(),
            "scanned report directory"
        );
        Ok(Self { dir, entries })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.file_name.as_str()).collect()
    }

    pub fn get(&self, file_name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    /// Resolve a selected name: a catalog entry first, then a file under the
    /// data directory, then `name` taken as a path. Returns the display name
    /// and the path to extract.
    pub fn resolve(&self, name: &str) -> (String, PathBuf) {
        if let Some(entry) = self.get(name) {
            return (entry.file_name.clone(), entry.path.clone());
        }
        let in_dir = self.dir.join(name);
        let path = if in_dir.is_file() {
            in_dir
        } else {
            PathBuf::from(name)
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        (file_name, path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
