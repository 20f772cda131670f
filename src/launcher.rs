//! Turning a chosen entry into a file reference and handing it to a viewer.

use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::info;

use crate::{
    config::CommandLine,
    docset::Docset,
    error::{Error, Result},
    index::Entry,
};

/// Characters escaped in the path part of a `file://` URL.
const PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in a URL fragment.
const FRAGMENT_SET: &AsciiSet =
    &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// A resolved, existing document plus an optional in-page anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub file: PathBuf,
    pub anchor: Option<String>,
}

impl Target {
    /// `file:///abs/path.html#anchor`
    pub fn url(&self) -> String {
        let path = self.file.to_string_lossy();
        let mut url =
            format!("file://{}", utf8_percent_encode(&path, PATH_SET));
        if let Some(anchor) = &self.anchor {
            url.push('#');
            url.extend(utf8_percent_encode(anchor, FRAGMENT_SET));
        }
        url
    }

    /// `/abs/path.html#anchor`, unescaped.
    pub fn reference(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}#{anchor}", self.file.display()),
            None => self.file.display().to_string(),
        }
    }
}

/// Join an entry's path onto its docset's documents directory.
///
/// Fails with [`Error::UnresolvedEntry`] when the file is not on disk,
/// which happens when a docset's index and contents have drifted apart.
pub fn resolve(docset: &Docset, entry: &Entry) -> Result<Target> {
    let file = std::path::absolute(docset.documents_dir().join(&entry.path))?;
    if !file.is_file() {
        return Err(Error::UnresolvedEntry {
            name: entry.name.clone(),
            docset: entry.docset.clone(),
            path: file,
        });
    }

    Ok(Target {
        file,
        anchor: entry.anchor.clone(),
    })
}

/// Something that can show a resolved document.
pub trait Viewer {
    fn open(&self, target: &Target) -> Result<()>;
}

/// Spawns an external program with the target's URL and does not wait.
#[derive(Debug, Clone)]
pub struct CommandViewer {
    command: CommandLine,
}

impl CommandViewer {
    pub fn new(command: CommandLine) -> Self {
        Self { command }
    }
}

impl Viewer for CommandViewer {
    fn open(&self, target: &Target) -> Result<()> {
        let url = target.url();
        info!(viewer = self.command.program, %url, "opening");

        Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(&url)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::Viewer(format!(
                    "could not start '{}': {e}",
                    self.command.program
                ))
            })?;
        Ok(())
    }
}

/// Prints the target's plain reference to stdout instead of opening it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintViewer;

impl Viewer for PrintViewer {
    fn open(&self, target: &Target) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", target.reference())?;
        Ok(())
    }
}
