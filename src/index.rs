//! The merged, in-memory entry table built from every usable docset.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    docset::Docset,
    dsidx::{self, IndexRow},
    error::{Error, Result},
};

/// Position of an entry in the merged table.
pub type RowId = usize;

/// One documentation item, tagged with the docset it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub docset: String,
    pub path: String,
    pub anchor: Option<String>,
    #[serde(skip)]
    source: usize,
}

impl fmt::Display for Entry {
    /// Single-line rendering handed to the finder: `name (type, docset)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            one_line(&self.name),
            one_line(&self.kind),
            one_line(&self.docset)
        )
    }
}

fn one_line(s: &str) -> String {
    s.replace(['\n', '\r', '\t'], " ")
}

/// Entry-index health of a single docset, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct DocsetStatus {
    pub name: String,
    pub root: String,
    pub entries: Option<usize>,
    pub error: Option<String>,
}

/// Union of all docsets' entries for a single run.
///
/// Rows keep the order the docsets were given in, then each docset's own
/// index order. Entries with the same name in different docsets are all
/// kept.
#[derive(Debug, Clone, Default)]
pub struct MergedIndex {
    docsets: Vec<Docset>,
    entries: Vec<Entry>,
}

impl MergedIndex {
    /// Load every docset and concatenate their rows.
    ///
    /// Docsets whose index is missing or unreadable are logged and skipped.
    /// Fails with [`Error::NoDocsetsAvailable`] when none could be loaded.
    pub fn build(docsets: &[Docset]) -> Result<Self> {
        // Indexed parallel collect keeps input order.
        let loaded: Vec<(&Docset, Result<Vec<IndexRow>>)> = docsets
            .par_iter()
            .map(|docset| (docset, dsidx::read_rows(docset)))
            .collect();

        let mut index = Self::default();
        for (docset, result) in loaded {
            match result {
                Ok(rows) => {
                    debug!(docset = docset.name(), rows = rows.len(), "loaded");
                    index.push_docset(docset.clone(), rows);
                }
                Err(e) => warn!("{e}; skipping"),
            }
        }

        if index.docsets.is_empty() {
            return Err(Error::NoDocsetsAvailable);
        }

        info!(
            docsets = index.docsets.len(),
            entries = index.entries.len(),
            "merged docset indexes"
        );
        Ok(index)
    }

    fn push_docset(&mut self, docset: Docset, rows: Vec<IndexRow>) {
        let source = self.docsets.len();
        let name = docset.name().to_string();
        self.entries.extend(rows.into_iter().map(|row| Entry {
            name: row.name,
            kind: row.kind,
            docset: name.clone(),
            path: row.path,
            anchor: row.anchor,
            source,
        }));
        self.docsets.push(docset);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, row: RowId) -> Option<&Entry> {
        self.entries.get(row)
    }

    /// Docsets that contributed to the index, in merge order.
    pub fn docsets(&self) -> &[Docset] {
        &self.docsets
    }

    /// The docset an entry was read from.
    pub fn docset_of(&self, entry: &Entry) -> &Docset {
        &self.docsets[entry.source]
    }

    /// Rows whose rendered line contains `query`, ignoring case.
    ///
    /// An empty query matches every row.
    pub fn filter(&self, query: &str) -> Vec<RowId> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                needle.is_empty()
                    || entry.to_string().to_lowercase().contains(&needle)
            })
            .map(|(row, _)| row)
            .collect()
    }
}

/// Probe each docset's entry index without merging.
pub fn survey(docsets: &[Docset]) -> Vec<DocsetStatus> {
    docsets
        .par_iter()
        .map(|docset| {
            let (entries, error) = match dsidx::read_rows(docset) {
                Ok(rows) => (Some(rows.len()), None),
                Err(e) => (None, Some(e.to_string())),
            };
            DocsetStatus {
                name: docset.name().to_string(),
                root: docset.root().display().to_string(),
                entries,
                error,
            }
        })
        .collect()
}
