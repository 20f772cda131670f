//! Builders for on-disk docsets used by the unit tests.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

use crate::docset::Docset;

/// Create `<parent>/<name>.docset` with a Dash `searchIndex` table.
pub fn dash_docset(
    parent: &Path,
    name: &str,
    rows: &[(&str, &str, &str)],
) -> Docset {
    let docset = empty_docset(parent, name);
    let conn = Connection::open(docset.index_path()).unwrap();
    conn.execute_batch(
        "CREATE TABLE searchIndex(id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT);",
    )
    .unwrap();
    for (entry_name, kind, path) in rows {
        conn.execute(
            "INSERT INTO searchIndex (name, type, path) VALUES (?1, ?2, ?3)",
            params![entry_name, kind, path],
        )
        .unwrap();
    }
    docset
}

/// Create `<parent>/<name>.docset` with an Apple Core Data index.
///
/// Rows are `(name, type, path, anchor)`.
pub fn core_data_docset(
    parent: &Path,
    name: &str,
    rows: &[(&str, &str, &str, &str)],
) -> Docset {
    let docset = empty_docset(parent, name);
    let conn = Connection::open(docset.index_path()).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE ztokentype(z_pk INTEGER PRIMARY KEY, ztypename TEXT);
        CREATE TABLE zfilepath(z_pk INTEGER PRIMARY KEY, zpath TEXT);
        CREATE TABLE ztokenmetainformation(
            z_pk INTEGER PRIMARY KEY, zfile INTEGER, zanchor TEXT
        );
        CREATE TABLE ztoken(
            z_pk INTEGER PRIMARY KEY,
            ztokenname TEXT,
            ztokentype INTEGER,
            zmetainformation INTEGER
        );
        "#,
    )
    .unwrap();
    for (i, (entry_name, kind, path, anchor)) in rows.iter().enumerate() {
        let pk = i as i64 + 1;
        conn.execute(
            "INSERT INTO ztokentype (z_pk, ztypename) VALUES (?1, ?2)",
            params![pk, kind],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO zfilepath (z_pk, zpath) VALUES (?1, ?2)",
            params![pk, path],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO ztokenmetainformation (z_pk, zfile, zanchor) VALUES (?1, ?1, ?2)",
            params![pk, anchor],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO ztoken (z_pk, ztokenname, ztokentype, zmetainformation) VALUES (?1, ?2, ?1, ?1)",
            params![pk, entry_name],
        )
        .unwrap();
    }
    docset
}

/// Create the bundle directories without an index.
pub fn empty_docset(parent: &Path, name: &str) -> Docset {
    let docset = Docset::new(parent.join(format!("{name}.docset")));
    std::fs::create_dir_all(docset.documents_dir()).unwrap();
    docset
}

/// Write a document file under the docset's documents directory.
pub fn touch_document(docset: &Docset, relative: &str) -> PathBuf {
    let path = docset.documents_dir().join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, "<html></html>").unwrap();
    path
}
