//! Reader for a docset's `docSet.dsidx` entry index.
//!
//! Two layouts exist in the wild: the Dash `searchIndex(name, type, path)`
//! table, and the Core Data tables (`ztoken`, `ztokentype`, ...) found in
//! docsets generated by Apple tooling. The Dash table is tried first.

use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

use crate::{
    docset::Docset,
    error::{Error, Result},
};

const DASH_QUERY: &str =
    "SELECT name, type, path, NULL FROM searchIndex ORDER BY rowid";

const CORE_DATA_QUERY: &str = r#"
    SELECT ztoken.ztokenname, ztokentype.ztypename, zfilepath.zpath,
           ztokenmetainformation.zanchor
    FROM ztoken
    JOIN ztokenmetainformation
        ON ztokenmetainformation.z_pk = ztoken.zmetainformation
    JOIN zfilepath
        ON zfilepath.z_pk = ztokenmetainformation.zfile
    JOIN ztokentype
        ON ztokentype.z_pk = ztoken.ztokentype
    ORDER BY ztoken.z_pk
"#;

const DASH_ENTRY_MARKER: &str = "<dash_entry_";

/// One row of a docset's entry index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub name: String,
    pub kind: String,
    /// Path relative to the documents directory, without anchor.
    pub path: String,
    pub anchor: Option<String>,
}

impl IndexRow {
    fn new(
        name: String,
        kind: String,
        raw_path: &str,
        anchor: Option<String>,
    ) -> Self {
        let cleaned = strip_dash_markers(raw_path);
        let cleaned = cleaned.trim_start_matches('/');

        let (path, inline_anchor) = match cleaned.split_once('#') {
            Some((path, anchor)) => (path, Some(anchor)),
            None => (cleaned, None),
        };

        let anchor = anchor
            .or_else(|| inline_anchor.map(str::to_string))
            .filter(|a| !a.is_empty());

        Self {
            name,
            kind,
            path: path.to_string(),
            anchor,
        }
    }
}

/// Read every row of the docset's entry index, in index order.
///
/// Fails with [`Error::MissingIndex`] when the index file is absent and
/// with [`Error::CorruptIndex`] when neither known schema can be read.
pub fn read_rows(docset: &Docset) -> Result<Vec<IndexRow>> {
    let path = docset.index_path();
    if !path.is_file() {
        return Err(Error::MissingIndex {
            docset: docset.name().to_string(),
            path,
        });
    }

    let conn = Connection::open_with_flags(
        &path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| corrupt(docset, e.to_string()))?;

    match query_rows(&conn, DASH_QUERY) {
        Ok(rows) => Ok(rows),
        Err(dash_err) => {
            debug!(
                docset = docset.name(),
                "no Dash searchIndex ({dash_err}), trying Core Data schema"
            );
            query_rows(&conn, CORE_DATA_QUERY).map_err(|core_err| {
                corrupt(docset, format!("{dash_err}; {core_err}"))
            })
        }
    }
}

fn query_rows(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<IndexRow>> {
    let mut stmt = conn.prepare(sql)?;
    let mapped = stmt.query_map([], map_row)?;

    let mut rows = Vec::new();
    for row in mapped {
        match row? {
            Some(row) => rows.push(row),
            None => debug!("skipping index row with a NULL column"),
        }
    }
    Ok(rows)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Option<IndexRow>> {
    let name: Option<String> = row.get(0)?;
    let kind: Option<String> = row.get(1)?;
    let path: Option<String> = row.get(2)?;
    let anchor: Option<String> = row.get(3)?;

    Ok(match (name, kind, path) {
        (Some(name), Some(kind), Some(path)) => {
            Some(IndexRow::new(name, kind, &path, anchor))
        }
        _ => None,
    })
}

/// Remove Dash's inline `<dash_entry_...>` metadata from an entry path.
///
/// Everything from the first marker up to the last `>` is dropped.
pub fn strip_dash_markers(path: &str) -> String {
    let Some(start) = path.find(DASH_ENTRY_MARKER) else {
        return path.to_string();
    };
    match path.rfind('>') {
        Some(end) if end > start => {
            format!("{}{}", &path[..start], &path[end + 1..])
        }
        _ => path.to_string(),
    }
}

fn corrupt(docset: &Docset, reason: String) -> Error {
    Error::CorruptIndex {
        docset: docset.name().to_string(),
        reason,
    }
}
