use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use walkdir::WalkDir;
use wordex_core::persist::{load_index, save_meta, save_snapshot, IndexPaths, MetaFile};
use wordex_core::{BatchFile, FsSource, InvertedIndex, MatchMode, SearchConfig};

const NOT_INDEXED: &str = "A file has not been indexed.\nIndex a file by running `wordex index <file>`";

#[derive(Parser, Debug)]
#[command(name = "wordex")]
#[command(about = "Index text files and search them for a word", long_about = None)]
pub struct Cli {
    /// Directory holding the persisted index
    #[arg(long, global = true, default_value = "./index")]
    pub index_dir: PathBuf,
    /// Search configuration JSON, e.g. {"OutputColor": "Cyan"}
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// When to color matched words
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => std::io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a document, or every file under a directory
    Index {
        path: PathBuf,
    },
    /// Search the indexed documents for a word
    Search {
        word: String,
        /// Treat the word as a regex when highlighting
        #[arg(long, default_value_t = false)]
        pattern: bool,
    },
    /// Index every document listed in a JSON batch file ({"Index_Files": [...]})
    File {
        batch: PathBuf,
    },
    /// Show the documents recorded for a word, or overall index statistics
    Inspect {
        word: Option<String>,
    },
}

pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let paths = IndexPaths::new(&cli.index_dir);
    match cli.command {
        Commands::Index { path } => index_command(&paths, &path, out),
        Commands::File { batch } => file_command(&paths, &batch, out),
        Commands::Search { word, pattern } => {
            let mut config = match &cli.config {
                Some(p) => SearchConfig::load(p)?,
                None => SearchConfig::default(),
            };
            config.color = cli.color.enabled();
            search_command(&paths, &word, pattern, &config, out)
        }
        Commands::Inspect { word } => inspect_command(&paths, word.as_deref(), out),
    }
}

fn open_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    if !paths.snapshot_exists() {
        return Ok(InvertedIndex::new());
    }
    let snapshot = load_index(paths).with_context(|| format!("failed to load index from {}", paths.root.display()))?;
    Ok(InvertedIndex::from_snapshot(snapshot, FsSource))
}

fn persist(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    save_snapshot(paths, &index.snapshot()).with_context(|| format!("failed to write index to {}", paths.root.display()))?;
    let created_at = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    save_meta(paths, &MetaFile::new(index.stats(), created_at))?;
    Ok(())
}

/// Index `documents` in parallel against the shared index. Unreadable
/// documents are skipped and returned.
fn index_all(index: &InvertedIndex, documents: &[String]) -> Vec<wordex_core::Error> {
    documents
        .par_iter()
        .filter_map(|doc| match index.index_document(doc) {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(document = %doc, error = %e, "skipping document");
                Some(e)
            }
        })
        .collect()
}

fn index_batch<W: Write>(paths: &IndexPaths, documents: Vec<String>, out: &mut W) -> Result<()> {
    let index = open_index(paths)?;
    let total = documents.len();

    // A document already in the saved index keeps its records; listing it
    // again does not add a second copy.
    let mut seen = HashSet::new();
    let mut fresh = Vec::with_capacity(total);
    for doc in documents {
        if index.has_document(&doc) || !seen.insert(doc.clone()) {
            tracing::info!(document = %doc, "already indexed, skipping");
        } else {
            fresh.push(doc);
        }
    }
    let skipped = total - fresh.len();

    let failures = index_all(&index, &fresh);
    persist(paths, &index)?;

    let indexed = fresh.len() - failures.len();
    let stats = index.stats();
    tracing::info!(indexed, skipped, failed = failures.len(), keys = stats.keys, entries = stats.entry_count, "index updated");
    writeln!(
        out,
        "indexed {} of {} documents ({} already indexed, {} words, {} entries)",
        indexed, total, skipped, stats.keys, stats.entry_count
    )?;

    if !failures.is_empty() {
        let detail: Vec<String> = failures.iter().map(|e| e.to_string()).collect();
        bail!("{} of {} documents could not be indexed:\n  {}", failures.len(), total, detail.join("\n  "));
    }
    Ok(())
}

/// True when `path` lies inside `root` (both compared canonicalized).
fn is_within(path: &Path, root: Option<&Path>) -> bool {
    match root {
        Some(root) => path.canonicalize().map(|p| p.starts_with(root)).unwrap_or(false),
        None => false,
    }
}

fn index_command<W: Write>(paths: &IndexPaths, path: &Path, out: &mut W) -> Result<()> {
    let documents: Vec<String> = if path.is_dir() {
        let index_root = paths.root.canonicalize().ok();
        WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_within(e.path(), index_root.as_deref()))
            .filter_map(|e| match e {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!(path = ?err.path(), error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_string_lossy().into_owned())
            .collect()
    } else {
        vec![path.to_string_lossy().into_owned()]
    };
    index_batch(paths, documents, out)
}

fn file_command<W: Write>(paths: &IndexPaths, batch: &Path, out: &mut W) -> Result<()> {
    let batch = BatchFile::load(batch)?;
    index_batch(paths, batch.index_files, out)
}

fn search_command<W: Write>(paths: &IndexPaths, word: &str, pattern: bool, config: &SearchConfig, out: &mut W) -> Result<()> {
    if !paths.snapshot_exists() {
        writeln!(out, "{NOT_INDEXED}")?;
        return Ok(());
    }
    let index = open_index(paths)?;
    let mode = if pattern { MatchMode::pattern(word).map_err(wordex_core::Error::from)? } else { MatchMode::Exact };
    let outcome = index.search(word, &mode, config, out)?;
    out.flush()?;

    if let Some(report) = outcome.report() {
        tracing::info!(word, documents = report.documents, hits = report.hits.len(), "search complete");
        if !report.is_complete() {
            let detail: Vec<String> = report.failures.iter().map(|e| e.to_string()).collect();
            bail!("{} of {} indexed documents could not be read:\n  {}", report.failures.len(), report.documents, detail.join("\n  "));
        }
    }
    Ok(())
}

fn inspect_command<W: Write>(paths: &IndexPaths, word: Option<&str>, out: &mut W) -> Result<()> {
    if !paths.snapshot_exists() {
        writeln!(out, "{NOT_INDEXED}")?;
        return Ok(());
    }
    let index = open_index(paths)?;
    match word {
        Some(word) => match index.chain(word) {
            Some(chain) => {
                writeln!(out, "{word}:")?;
                for occ in chain {
                    writeln!(out, "  {} (position {}, count {})", occ.document, occ.first_position, occ.count)?;
                }
            }
            None => writeln!(out, "This key has no entries in the index.")?,
        },
        None => {
            let stats = index.stats();
            writeln!(out, "documents: {}\nkeys: {}\nentries: {}", stats.documents, stats.keys, stats.entry_count)?;
            for doc in index.documents() {
                writeln!(out, "  {doc}")?;
            }
        }
    }
    Ok(())
}
