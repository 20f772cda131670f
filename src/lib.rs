//! dashp - merge offline Dash docsets and fuzzy-search them from the terminal.
//!
//! Each run reads the SQLite entry index of every requested docset, merges
//! the rows in memory, hands them to an external fuzzy finder such as
//! [fzf](https://github.com/junegunn/fzf), and opens the chosen document in
//! a viewer.
//!
//! # Quick start
//!
//! ```no_run
//! use dashp::{Config, FinderProcess, CommandViewer, docset, session};
//! use dashp::config::Overrides;
//!
//! let config = Config::resolve(&Overrides::default()).unwrap();
//! let docsets = docset::discover(config.docset_dir()).unwrap();
//!
//! let mut finder = FinderProcess::new(config.finder().clone());
//! let viewer = CommandViewer::new(config.viewer().clone());
//!
//! let outcome = session::run(&docsets, None, &mut finder, &viewer).unwrap();
//! println!("{outcome:?}");
//! ```

pub mod cli;
pub mod config;
pub mod docset;
pub mod dsidx;
pub mod error;
pub mod index;
pub mod launcher;
pub mod selector;
pub mod session;

#[cfg(test)]
mod fixtures;

pub use config::Config;
pub use docset::Docset;
pub use error::{Error, Result};
pub use index::{Entry, MergedIndex};
pub use launcher::{CommandViewer, PrintViewer, Target};
pub use selector::FinderProcess;
