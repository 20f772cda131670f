use std::{
    collections::HashSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::error::{Error, Result};

/// Directory extension that marks a docset bundle.
pub const DOCSET_EXTENSION: &str = "docset";

const RESOURCES_DIR: &str = "Contents/Resources";
const INDEX_FILE: &str = "docSet.dsidx";
const DOCUMENTS_DIR: &str = "Documents";

/// A docset bundle on disk, e.g. `~/.local/share/dashp/docsets/Rust.docset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docset {
    name: String,
    root: PathBuf,
}

impl Docset {
    /// The name is the bundle's file stem (`Rust.docset` -> `Rust`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        Self { name, root }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The SQLite entry index, `Contents/Resources/docSet.dsidx`.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(RESOURCES_DIR).join(INDEX_FILE)
    }

    /// The directory entry paths are relative to.
    pub fn documents_dir(&self) -> PathBuf {
        self.root.join(RESOURCES_DIR).join(DOCUMENTS_DIR)
    }
}

/// List every `*.docset` bundle directly inside `dir`, sorted by file name.
///
/// A missing directory yields an empty list. Hidden entries are skipped.
pub fn discover(dir: &Path) -> Result<Vec<Docset>> {
    let unreadable = |source| Error::DocsetDir {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(unreadable(e)),
    };

    let mut roots = Vec::new();
    for entry in entries {
        let entry = entry.map_err(unreadable)?;
        let file_name = entry.file_name();
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }

        // `is_dir` on the path follows symlinked bundles.
        let path = entry.path();
        if is_bundle(&path) && path.is_dir() {
            roots.push(path);
        }
    }

    roots.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(roots.into_iter().map(Docset::new).collect())
}

/// Turn command-line identifiers into docsets, preserving their order.
///
/// An identifier is an existing directory given as a path (it ends in
/// `.docset` or contains a separator), or a name looked up as
/// `<dir>/<name>` and then `<dir>/<name>.docset`. Unknown identifiers are
/// skipped with a warning, and repeated bundles are kept once.
pub fn resolve_identifiers(identifiers: &[String], dir: &Path) -> Vec<Docset> {
    let mut seen = HashSet::new();
    let mut docsets = Vec::new();

    for identifier in identifiers {
        let Some(root) = resolve_identifier(identifier, dir) else {
            warn!("skipping unknown docset '{identifier}'");
            continue;
        };
        let key = root.canonicalize().unwrap_or_else(|_| root.clone());
        if seen.insert(key) {
            docsets.push(Docset::new(root));
        }
    }

    docsets
}

fn resolve_identifier(identifier: &str, dir: &Path) -> Option<PathBuf> {
    let direct = PathBuf::from(identifier);
    if looks_like_path(&direct) && direct.is_dir() {
        return Some(direct);
    }

    let named = dir.join(identifier);
    if named.is_dir() {
        return Some(named);
    }

    let bundle = dir.join(format!("{identifier}.{DOCSET_EXTENSION}"));
    bundle.is_dir().then_some(bundle)
}

/// Bare names like `Rust` are docset names, never paths in the cwd.
fn looks_like_path(path: &Path) -> bool {
    is_bundle(path) || path.components().count() > 1
}

fn is_bundle(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == DOCSET_EXTENSION)
}
