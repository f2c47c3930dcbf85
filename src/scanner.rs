use crate::error::{Error, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Directories never descended into
pub const DEFAULT_SKIP_DIRS: &[&str] = &["target"];

/// Source scanner for locating the Rust files of a service project.
///
/// Walks the project directory recursively and collects `.rs` files in a
/// stable, sorted order so reflected operations keep the same order between
/// runs. Hidden directories and the directories in the skip list are ignored.
///
/// # Example
///
/// ```no_run
/// use wsdl_from_source::scanner::SourceScanner;
/// use std::path::PathBuf;
///
/// let scanner = SourceScanner::new(PathBuf::from("./my-service"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct SourceScanner {
    root_path: PathBuf,
    skip_dirs: Vec<String>,
}

/// Result of a directory scan
pub struct ScanResult {
    /// Paths of all discovered `.rs` files, sorted
    pub rust_files: Vec<PathBuf>,
    /// Entries that could not be read
    pub warnings: Vec<String>,
}

impl SourceScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Also skip directories with the given name
    pub fn skip_dir(mut self, name: &str) -> Self {
        self.skip_dirs.push(name.to_string());
        self
    }

    /// Scan the directory tree and collect all `.rs` files.
    ///
    /// Unreadable entries are logged and reported as warnings; only a missing
    /// root directory is an error.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory not found: {}", self.root_path.display()),
            )));
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path || !e.file_type().is_dir() {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && !self.skip_dirs.iter().any(|d| *d == file_name)
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("rs")
                    {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} Rust files",
            self.root_path.display(),
            rust_files.len()
        );
        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}
