//! Finds which of a set of candidate keys signed which of a set of documents.
//!
//! A single signature file is tried against every document in a directory,
//! under every key in another directory. Pairs that could not be checked are
//! reported apart from the pairs that simply did not match.

use std::fmt;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, info, log, warn, Level};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use regex::Regex;

use crate::{load_key_file, read_file, verify, Error, PublicKey, Result};

/// File names of DER encoded keys.
pub const DEFAULT_KEY_PATTERN: &str = r"\.der$";
/// File names of PDF documents.
pub const DEFAULT_DOC_PATTERN: &str = r"\.pdf$";

lazy_static! {
    static ref DEFAULT_FILTER: ScanFilter =
        ScanFilter::new(DEFAULT_KEY_PATTERN, DEFAULT_DOC_PATTERN).unwrap();
}

/// Selects the files taking part in a scan by their file names.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    pub key_pattern: Regex,
    pub doc_pattern: Regex,
}

impl ScanFilter {
    pub fn new(key_pattern: &str, doc_pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            key_pattern: Regex::new(key_pattern)?,
            doc_pattern: Regex::new(doc_pattern)?,
        })
    }
}

impl Default for ScanFilter {
    /// DER keys and PDF documents.
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}

/// A document whose signature was made by the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub key: PathBuf,
    pub document: PathBuf,
}

/// Something that prevented a key, a document, or the pair of both, from
/// being checked.
///
/// A signature made by one key is usually a number below the modulus of any
/// other key of the same size, and checks as simply not matching. When it is
/// not, the pair is reported here with [`Error::MalformedSignature`], even if
/// the signature is fine under its own key.
#[derive(Debug)]
pub struct Failure {
    pub key: Option<PathBuf>,
    pub document: Option<PathBuf>,
    pub error: Error,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.key, &self.document) {
            (Some(key), Some(doc)) => {
                write!(f, "{} against {}: {}", key.display(), doc.display(), self.error)
            }
            (Some(path), None) | (None, Some(path)) => {
                write!(f, "{}: {}", path.display(), self.error)
            }
            (None, None) => write!(f, "{}", self.error),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Matches, grouped by document, in path order.
    pub matches: Vec<Match>,
    pub failures: Vec<Failure>,
    /// Number of (key, document) pairs that got a definitive verdict.
    pub checked: usize,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.matches.extend(other.matches);
        self.failures.extend(other.failures);
        self.checked += other.checked;
    }
}

/// Tries the signature in `sig_path` against every document in `docs_dir`,
/// under every key in `keys_dir`.
///
/// Only the files directly inside the directories whose names match the
/// filter are considered. Failing to list a directory or to read the
/// signature aborts the scan; any other failure is recorded in the report.
pub fn scan(
    keys_dir: impl AsRef<Path>,
    docs_dir: impl AsRef<Path>,
    sig_path: impl AsRef<Path>,
    filter: &ScanFilter,
) -> Result<ScanReport> {
    let signature = read_file(sig_path)?;
    let key_paths = list_files(keys_dir.as_ref(), &filter.key_pattern)?;
    let doc_paths = list_files(docs_dir.as_ref(), &filter.doc_pattern)?;

    let mut report = ScanReport::default();

    let mut keys = Vec::with_capacity(key_paths.len());
    for path in key_paths {
        match load_key_file(&path) {
            Ok(key) => keys.push((path, key)),
            Err(error) => {
                warn!("skipping key {}: {}", path.display(), error);
                report.failures.push(Failure {
                    key: Some(path),
                    document: None,
                    error,
                });
            }
        }
    }

    #[cfg(feature = "rayon")]
    let per_document: Vec<ScanReport> = doc_paths
        .par_iter()
        .map(|doc| scan_document(doc, &keys, &signature))
        .collect();
    #[cfg(not(feature = "rayon"))]
    let per_document: Vec<ScanReport> = doc_paths
        .iter()
        .map(|doc| scan_document(doc, &keys, &signature))
        .collect();

    for partial in per_document {
        report.merge(partial);
    }

    Ok(report)
}

fn scan_document(doc: &Path, keys: &[(PathBuf, PublicKey)], signature: &[u8]) -> ScanReport {
    let mut report = ScanReport::default();

    let document = match read_file(doc) {
        Ok(document) => document,
        Err(error) => {
            warn!("skipping document {}: {}", doc.display(), error);
            report.failures.push(Failure {
                key: None,
                document: Some(doc.to_path_buf()),
                error,
            });
            return report;
        }
    };

    for (key_path, key) in keys {
        debug!("trying {} on {}", key_path.display(), doc.display());
        match verify(key, signature, &document) {
            Ok(outcome) => {
                report.checked += 1;
                if outcome.is_valid() {
                    info!("{} signed {}", key_path.display(), doc.display());
                    report.matches.push(Match {
                        key: key_path.clone(),
                        document: doc.to_path_buf(),
                    });
                }
            }
            Err(error) => {
                // A signature that does not fit one key is expected while
                // searching for the key that made it.
                let level = match error {
                    Error::MalformedSignature(_) => Level::Debug,
                    _ => Level::Warn,
                };
                log!(
                    level,
                    "could not check {} on {}: {}",
                    key_path.display(),
                    doc.display(),
                    error
                );
                report.failures.push(Failure {
                    key: Some(key_path.clone()),
                    document: Some(doc.to_path_buf()),
                    error,
                });
            }
        }
    }

    report
}

/// Lists the non-directory entries of `dir` whose file names match `pattern`,
/// sorted by path.
fn list_files(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let io_error = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            continue;
        }
        let matches = path
            .file_name()
            .is_some_and(|name| pattern.is_match(&name.to_string_lossy()));
        if matches {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}
