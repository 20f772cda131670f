//! Interactive selection through an external fuzzy finder.

use std::{
    io::{ErrorKind, Write},
    process::{Command, Stdio},
};

use tracing::debug;

use crate::{
    config::CommandLine,
    error::{Error, Result},
    index::{MergedIndex, RowId},
};

/// Exit status fzf and skim use for Esc / Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;
/// Exit status fzf and skim use when nothing matched.
const EXIT_NO_MATCH: i32 = 1;

/// Result of one interactive selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Chosen(RowId),
    Cancelled,
}

/// Something that lets the user pick one line out of many.
pub trait Selector {
    /// Present `lines` and block until the user picks one.
    ///
    /// Returns `None` when the user aborts.
    fn choose(&mut self, lines: &[String]) -> Result<Option<String>>;
}

/// A finder program fed on stdin that prints the chosen line on stdout.
#[derive(Debug, Clone)]
pub struct FinderProcess {
    command: CommandLine,
    query: Option<String>,
}

impl FinderProcess {
    pub fn new(command: CommandLine) -> Self {
        Self {
            command,
            query: None,
        }
    }

    /// Pre-fill the finder's query (fzf and skim only).
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.command.args.clone();
        if matches!(self.command.program_name(), "fzf" | "sk") {
            args.extend(["--prompt".to_string(), "dashp> ".to_string()]);
            if let Some(query) = &self.query {
                args.extend(["--query".to_string(), query.clone()]);
            }
        } else if self.query.is_some() {
            debug!(
                finder = self.command.program,
                "finder does not take an initial query, ignoring it"
            );
        }
        args
    }
}

impl Selector for FinderProcess {
    fn choose(&mut self, lines: &[String]) -> Result<Option<String>> {
        let mut child = Command::new(&self.command.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::Finder(format!(
                    "'{}' is not installed",
                    self.command.program
                )),
                _ => Error::Finder(format!(
                    "could not start '{}': {e}",
                    self.command.program
                )),
            })?;

        let mut input = lines.join("\n");
        input.push('\n');

        // Feed stdin from another thread so a finder that writes before
        // draining its input cannot deadlock us.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Finder("finder stdin unavailable".into()))?;
        let writer = std::thread::spawn(move || {
            match stdin.write_all(input.as_bytes()) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        });

        let output = child.wait_with_output()?;
        writer.join().map_err(|_| {
            Error::Finder("finder input thread panicked".into())
        })??;

        match output.status.code() {
            Some(0) => {}
            Some(EXIT_INTERRUPTED | EXIT_NO_MATCH) => return Ok(None),
            Some(code) => {
                return Err(Error::Finder(format!(
                    "'{}' exited with status {code}",
                    self.command.program
                )));
            }
            None => {
                return Err(Error::Finder(format!(
                    "'{}' was terminated by a signal",
                    self.command.program
                )));
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let chosen = stdout.lines().next().unwrap_or_default();
        Ok((!chosen.is_empty()).then(|| chosen.to_string()))
    }
}

/// Ask the selector to pick one of `rows` and map the answer back.
///
/// When several rows render to the same line the first one wins.
pub fn select(
    index: &MergedIndex,
    rows: &[RowId],
    selector: &mut dyn Selector,
) -> Result<Selection> {
    let lines: Vec<String> = rows
        .iter()
        .filter_map(|&row| index.get(row))
        .map(ToString::to_string)
        .collect();

    let Some(chosen) = selector.choose(&lines)? else {
        return Ok(Selection::Cancelled);
    };
    let chosen = chosen.trim_end_matches(['\r', '\n']);
    if chosen.is_empty() {
        return Ok(Selection::Cancelled);
    }

    lines
        .iter()
        .position(|line| line == chosen)
        .map(|pos| Selection::Chosen(rows[pos]))
        .ok_or_else(|| {
            Error::Finder(format!("selection matches no entry: {chosen}"))
        })
}
