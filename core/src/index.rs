use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::highlight::{render, write_spans, MatchMode, Span};
use crate::source::{DocumentSource, FsSource};
use crate::tokenizer::tokenize_bytes;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use tracing::{debug, warn};

/// One indexing pass found a word in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub document: String,
    /// Ordinal of the word's first occurrence in the document's sorted token sequence.
    pub first_position: usize,
    /// Times the word appeared in the document during that pass.
    pub count: usize,
}

/// The index table: word -> occurrences in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub chains: HashMap<String, Vec<Occurrence>>,
    /// Distinct indexed documents, first-indexed first.
    pub documents: Vec<String>,
    /// Total occurrence records ever created.
    pub entry_count: u64,
    /// Membership set for `documents`; rebuilt on restore.
    #[serde(skip)]
    document_set: HashSet<String>,
}

impl PartialEq for IndexSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.chains == other.chains && self.documents == other.documents && self.entry_count == other.entry_count
    }
}

impl Eq for IndexSnapshot {}

impl IndexSnapshot {
    fn rebuild_document_set(&mut self) {
        self.document_set = self.documents.iter().cloned().collect();
    }

    fn has_document(&self, document: &str) -> bool {
        self.document_set.contains(document)
    }

    /// Merge one document's sorted tokens. Returns the number of records created.
    fn insert_document(&mut self, document: &str, tokens: &[String]) -> usize {
        let mut created = 0;
        let mut i = 0;
        while i < tokens.len() {
            let word = &tokens[i];
            // tokens are sorted, so repeats of a word are adjacent
            let run = tokens[i..].iter().take_while(|t| *t == word).count();
            self.chains.entry(word.clone()).or_default().push(Occurrence {
                document: document.to_string(),
                first_position: i,
                count: run,
            });
            self.entry_count += 1;
            created += 1;
            i += run;
        }
        if self.document_set.insert(document.to_string()) {
            self.documents.push(document.to_string());
        }
        created
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub keys: usize,
    pub documents: usize,
    pub entry_count: u64,
}

/// A document in which the searched word was found, split into spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub document: String,
    pub spans: Vec<Span>,
}

impl Hit {
    pub fn matches(&self) -> usize {
        self.spans.iter().filter(|s| s.matched).count()
    }
}

#[derive(Debug)]
pub struct SearchReport {
    pub word: String,
    /// Length of the word's chain when the query ran.
    pub documents: usize,
    pub hits: Vec<Hit>,
    /// Chain entries whose document could not be re-read.
    pub failures: Vec<Error>,
}

impl SearchReport {
    pub fn is_complete(&self) -> bool { self.failures.is_empty() }
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// The word is not a key in the index.
    NoEntries,
    Found(SearchReport),
}

impl SearchOutcome {
    pub fn report(&self) -> Option<&SearchReport> {
        match self {
            SearchOutcome::Found(r) => Some(r),
            SearchOutcome::NoEntries => None,
        }
    }
}

/// Append-only inverted index over documents read through `S`.
///
/// Mutation takes the write lock once per document; queries take the read
/// lock only long enough to copy a chain, so document I/O never happens while
/// the table is locked.
pub struct InvertedIndex<S = FsSource> {
    table: RwLock<IndexSnapshot>,
    source: S,
}

impl InvertedIndex<FsSource> {
    pub fn new() -> Self { Self::with_source(FsSource) }
}

impl Default for InvertedIndex<FsSource> {
    fn default() -> Self { Self::new() }
}

impl<S: DocumentSource> InvertedIndex<S> {
    pub fn with_source(source: S) -> Self {
        Self::from_snapshot(IndexSnapshot::default(), source)
    }

    pub fn from_snapshot(mut snapshot: IndexSnapshot, source: S) -> Self {
        snapshot.rebuild_document_set();
        Self { table: RwLock::new(snapshot), source }
    }

    /// Read, tokenize and merge `document` into the index.
    ///
    /// A read failure leaves the index untouched. Returns the number of
    /// occurrence records created.
    pub fn index_document(&self, document: &str) -> Result<usize> {
        let bytes = self.source.read(document).map_err(|e| Error::read(document, e))?;
        let tokens = tokenize_bytes(&bytes);
        let created = self.table.write().insert_document(document, &tokens);
        debug!(document, tokens = tokens.len(), created, "indexed document");
        Ok(created)
    }

    pub fn entry_count(&self) -> u64 { self.table.read().entry_count }

    /// Number of distinct words.
    pub fn len(&self) -> usize { self.table.read().chains.len() }

    pub fn is_empty(&self) -> bool { self.table.read().chains.is_empty() }

    pub fn contains(&self, word: &str) -> bool { self.table.read().chains.contains_key(word) }

    pub fn chain(&self, word: &str) -> Option<Vec<Occurrence>> {
        self.table.read().chains.get(word).cloned()
    }

    /// All words, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.table.read().chains.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn documents(&self) -> Vec<String> { self.table.read().documents.clone() }

    /// True once `document` has been indexed at least once.
    pub fn has_document(&self, document: &str) -> bool { self.table.read().has_document(document) }

    pub fn stats(&self) -> IndexStats {
        let t = self.table.read();
        IndexStats { keys: t.chains.len(), documents: t.documents.len(), entry_count: t.entry_count }
    }

    pub fn snapshot(&self) -> IndexSnapshot { self.table.read().clone() }

    /// Look up `word` and re-read every document on its chain.
    ///
    /// Unreadable documents are collected in the report's `failures`; the
    /// rest of the chain is still processed.
    pub fn query(&self, word: &str, mode: &MatchMode) -> SearchOutcome {
        let chain = match self.chain(word) {
            Some(c) => c,
            None => return SearchOutcome::NoEntries,
        };
        let mut report = SearchReport { word: word.to_string(), documents: chain.len(), hits: Vec::new(), failures: Vec::new() };
        for occ in chain {
            match self.source.read(&occ.document) {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    let body = text.trim_end_matches(&['\n', '\r'][..]);
                    let spans = render(body, |t| mode.is_match(word, t));
                    report.hits.push(Hit { document: occ.document, spans });
                }
                Err(e) => {
                    warn!(document = %occ.document, error = %e, "indexed document is no longer readable");
                    report.failures.push(Error::read(&occ.document, e));
                }
            }
        }
        SearchOutcome::Found(report)
    }

    /// Run [`query`](Self::query) and write the highlighted rendering to `out`.
    pub fn search<W: Write + ?Sized>(&self, word: &str, mode: &MatchMode, config: &SearchConfig, out: &mut W) -> Result<SearchOutcome> {
        let outcome = self.query(word, mode);
        match &outcome {
            SearchOutcome::NoEntries => writeln!(out, "This key has no entries in the index.")?,
            SearchOutcome::Found(report) => {
                let separator: &[u8] = if report.documents > 1 { b"\n\n" } else { b"\n" };
                for hit in &report.hits {
                    writeln!(out, "\"{}\" found in {}.", word, hit.document)?;
                    write_spans(out, &hit.spans, config.output_color, config.color)?;
                    out.write_all(separator)?;
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn index_with(docs: &[(&str, &str)]) -> InvertedIndex<MemorySource> {
        let src = MemorySource::new();
        for (name, body) in docs {
            src.insert(*name, *body);
        }
        let index = InvertedIndex::with_source(src);
        for (name, _) in docs {
            index.index_document(name).unwrap();
        }
        index
    }

    #[test]
    fn repeated_word_yields_one_record_per_pass() {
        let index = index_with(&[("a", "cat dog cat cat")]);
        let chain = index.chain("cat").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].count, 3);
        // sorted: cat cat cat dog
        assert_eq!(chain[0].first_position, 0);
        assert_eq!(index.chain("dog").unwrap()[0].first_position, 3);
        assert_eq!(index.entry_count(), 2);
    }

    #[test]
    fn reindexing_appends_new_records() {
        let index = index_with(&[("a", "cat")]);
        index.index_document("a").unwrap();
        assert_eq!(index.chain("cat").unwrap().len(), 2);
        assert_eq!(index.documents(), vec!["a"]);
    }

    #[test]
    fn restored_snapshot_remembers_documents() {
        let index = index_with(&[("a", "cat"), ("b", "dog")]);
        let src = MemorySource::new();
        src.insert("a", "cat");
        let restored = InvertedIndex::from_snapshot(index.snapshot(), src);
        assert!(restored.has_document("a"));
        assert!(restored.has_document("b"));
        assert!(!restored.has_document("c"));
        restored.index_document("a").unwrap();
        assert_eq!(restored.documents(), vec!["a", "b"]);
    }

    #[test]
    fn failed_read_leaves_index_untouched() {
        let index = index_with(&[("a", "cat")]);
        let before = index.snapshot();
        let err = index.index_document("missing").unwrap_err();
        assert!(err.is_document_error());
        assert_eq!(index.snapshot(), before);
    }

    #[test]
    fn single_document_ends_with_one_newline() {
        let index = index_with(&[("a", "The cat sat\n")]);
        let mut out = Vec::new();
        index.search("cat", &MatchMode::Exact, &SearchConfig::plain(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"cat\" found in a.\nThe cat sat\n");
    }

    #[test]
    fn multiple_documents_are_separated_by_a_blank_line() {
        let index = index_with(&[("a", "cat"), ("b", "a cat")]);
        let mut out = Vec::new();
        index.search("cat", &MatchMode::Exact, &SearchConfig::plain(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"cat\" found in a.\ncat\n\n\"cat\" found in b.\na cat\n\n");
    }

    #[test]
    fn missing_word_reports_no_entries() {
        let index = index_with(&[("a", "cat")]);
        let mut out = Vec::new();
        let outcome = index.search("zzz", &MatchMode::Exact, &SearchConfig::plain(), &mut out).unwrap();
        assert!(matches!(outcome, SearchOutcome::NoEntries));
        assert_eq!(out, b"This key has no entries in the index.\n");
    }
}
