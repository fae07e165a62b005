//! Directory-to-database load pipeline.
//!
//! Files are processed one at a time: read, flatten, name, load. The first
//! error stops the run; tables committed before it stay in the database.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::{LoadConfig, SourceConfig};
use crate::error::Error;
use crate::ruleset::RuleSet;
use crate::store::Database;
use crate::table::table_name;
use crate::Result;

/// Outcome of loading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub file: PathBuf,
    pub table: String,
    pub rows: usize,
}

/// Outcome of loading one source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub tables: Vec<TableReport>,
}

impl SourceReport {
    /// Rows inserted across all tables of this source.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of files loaded.
    pub fn file_count(&self) -> usize {
        self.sources.iter().map(|s| s.tables.len()).sum()
    }

    /// Rows inserted across the whole run.
    pub fn total_rows(&self) -> usize {
        self.sources.iter().map(SourceReport::total_rows).sum()
    }
}

/// List every regular file below `dir`, recursively.
///
/// Entries of each directory are visited in lexical order and a
/// subdirectory's files are listed where the subdirectory sorts.
pub fn list_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir.as_ref(), &mut files)?;
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir, e))?;
    entries.sort();

    for path in entries {
        let meta = fs::metadata(&path).map_err(|e| Error::io(&path, e))?;
        if meta.is_dir() {
            walk(&path, files)?;
        } else if meta.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// Drives rule files from source directories into a [`Database`].
pub struct Pipeline<'a> {
    db: &'a mut Database,
    on_file: Option<Box<dyn FnMut(&Path) + 'a>>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline writing into `db`.
    pub fn new(db: &'a mut Database) -> Self {
        Self { db, on_file: None }
    }

    /// Call `f` with each file path before it is loaded.
    pub fn on_file(mut self, f: impl FnMut(&Path) + 'a) -> Self {
        self.on_file = Some(Box::new(f));
        self
    }

    /// Load one file into the table named after it.
    pub fn load_file(&mut self, path: &Path, source: &SourceConfig) -> Result<TableReport> {
        let table = table_name(&source.table_prefix, path);
        self.load_file_as(path, source, &table)
    }

    /// Load one file into an explicitly named table.
    pub fn load_file_as(
        &mut self,
        path: &Path,
        source: &SourceConfig,
        table: &str,
    ) -> Result<TableReport> {
        let rule_set = RuleSet::from_file(path, source.kind)?;
        for warning in rule_set.lint() {
            log::warn!("{:?}: {}", path, warning);
        }

        if let Some(f) = self.on_file.as_mut() {
            f(path);
        }
        log::debug!("{:?} -> {} (version {})", path, table, rule_set.version());

        let records = rule_set.into_records();
        let rows = self.db.load_records(table, &records)?;
        Ok(TableReport {
            file: path.to_path_buf(),
            table: table.to_string(),
            rows,
        })
    }

    /// Load every file of one source directory.
    pub fn run_source(&mut self, source: &SourceConfig) -> Result<SourceReport> {
        log::info!("Loading source {}", source);
        let mut tables = Vec::new();
        for file in list_files(&source.dir)? {
            tables.push(self.load_file(&file, source)?);
        }
        Ok(SourceReport {
            name: source.name.clone(),
            tables,
        })
    }

    /// Load every configured source, in order.
    pub fn run(&mut self, config: &LoadConfig) -> Result<RunReport> {
        let start = Instant::now();
        let mut sources = Vec::with_capacity(config.sources.len());
        for source in &config.sources {
            sources.push(self.run_source(source)?);
        }
        let report = RunReport {
            sources,
            elapsed: start.elapsed(),
        };
        log::info!(
            "Loaded {} rows from {} files in {:?}",
            report.total_rows(),
            report.file_count(),
            report.elapsed
        );
        Ok(report)
    }
}
