//! In-memory inverted index over text documents with highlighted word search.

pub mod config;
pub mod error;
pub mod highlight;
pub mod index;
pub mod persist;
pub mod source;
pub mod tokenizer;

pub use config::{BatchFile, HighlightStyle, SearchConfig};
pub use error::{Error, Result};
pub use highlight::{MatchMode, Span};
pub use index::{Hit, IndexSnapshot, IndexStats, InvertedIndex, Occurrence, SearchOutcome, SearchReport};
pub use source::{DocumentSource, FsSource, MemorySource};
