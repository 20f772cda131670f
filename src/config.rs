use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const DEFAULT_FINDER: &str = "fzf";

#[cfg(target_os = "macos")]
const DEFAULT_VIEWER: &str = "open";
#[cfg(not(target_os = "macos"))]
const DEFAULT_VIEWER: &str = "xdg-open";

/// Values given on the command line, taking priority over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub docset_dir: Option<PathBuf>,
    pub finder: Option<String>,
    pub viewer: Option<String>,
}

/// An external program and its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split a command string on whitespace, e.g. `"fzf --exact"`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut words = raw.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| Error::Config(format!("empty command: {raw:?}")))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// The program's file name, without any leading directories.
    pub fn program_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program)
    }
}

/// Everything a run needs to know about its surroundings.
#[derive(Debug, Clone)]
pub struct Config {
    docset_dir: PathBuf,
    finder: CommandLine,
    viewer: CommandLine,
}

impl Config {
    /// Resolve the configuration from, in order of priority:
    /// 1. Explicit overrides (from command-line flags)
    /// 2. The DASHP_DOCSET_DIR / DASHP_FINDER / DASHP_VIEWER variables
    ///    (BROWSER is also honored for the viewer)
    /// 3. Defaults: ~/.local/share/dashp/docsets, `fzf`, the platform opener
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let docset_dir = if let Some(path) = &overrides.docset_dir {
            path.clone()
        } else if let Some(val) = env("DASHP_DOCSET_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("dashp")
                .get_data_home()
                .map(|home| home.join("docsets"))
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        let finder = overrides
            .finder
            .clone()
            .or_else(|| env("DASHP_FINDER"))
            .unwrap_or_else(|| DEFAULT_FINDER.to_string());

        let viewer = overrides
            .viewer
            .clone()
            .or_else(|| env("DASHP_VIEWER"))
            .or_else(|| env("BROWSER"))
            .unwrap_or_else(|| DEFAULT_VIEWER.to_string());

        Ok(Self {
            docset_dir,
            finder: CommandLine::parse(&finder)?,
            viewer: CommandLine::parse(&viewer)?,
        })
    }

    pub fn docset_dir(&self) -> &Path {
        &self.docset_dir
    }

    pub fn finder(&self) -> &CommandLine {
        &self.finder
    }

    pub fn viewer(&self) -> &CommandLine {
        &self.viewer
    }
}
