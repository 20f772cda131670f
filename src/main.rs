use std::{io::Write, process::ExitCode};

use clap::Parser;
use dashp::{
    CommandViewer,
    Config,
    Docset,
    FinderProcess,
    MergedIndex,
    PrintViewer,
    cli::{Cli, Command, DocsetsArgs, EntriesArgs, OpenArgs},
    config::Overrides,
    docset,
    error::Result,
    index,
    launcher::Viewer,
    session::{self, Outcome},
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DASHP_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dashp: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        docset_dir: cli.docset_dir,
        finder: cli.open.finder.clone(),
        viewer: cli.open.viewer.clone(),
    };

    match cli.command {
        Some(Command::Completions(args)) => {
            args.generate();
            Ok(())
        }
        Some(Command::Docsets(args)) => {
            cmd_docsets(&Config::resolve(&overrides)?, &args)
        }
        Some(Command::Entries(args)) => {
            cmd_entries(&Config::resolve(&overrides)?, &args)
        }
        None => cmd_open(&Config::resolve(&overrides)?, cli.open),
    }
}

/// Explicit identifiers, or everything in the docset directory.
fn select_docsets(
    config: &Config,
    identifiers: &[String],
) -> Result<Vec<Docset>> {
    if identifiers.is_empty() {
        let found = docset::discover(config.docset_dir())?;
        if found.is_empty() {
            warn!("no docsets found in {}", config.docset_dir().display());
        }
        Ok(found)
    } else {
        Ok(docset::resolve_identifiers(identifiers, config.docset_dir()))
    }
}

fn cmd_open(config: &Config, args: OpenArgs) -> Result<()> {
    let docsets = select_docsets(config, &args.docsets)?;

    let mut finder =
        FinderProcess::new(config.finder().clone()).with_query(args.query);
    let viewer: Box<dyn Viewer> = if args.print {
        Box::new(PrintViewer)
    } else {
        Box::new(CommandViewer::new(config.viewer().clone()))
    };

    match session::run(
        &docsets,
        args.filter.as_deref(),
        &mut finder,
        viewer.as_ref(),
    )? {
        Outcome::Opened(_) | Outcome::Cancelled => {}
        Outcome::NoCandidates if args.filter.is_some() => {
            eprintln!("No entries match the filter.")
        }
        Outcome::NoCandidates => eprintln!("No entries to choose from."),
    }
    Ok(())
}

fn cmd_entries(config: &Config, args: &EntriesArgs) -> Result<()> {
    let docsets = select_docsets(config, &args.docsets)?;
    let index = MergedIndex::build(&docsets)?;
    let rows = index.filter(args.filter.as_deref().unwrap_or_default());

    let mut stdout = std::io::stdout().lock();
    if args.json {
        let entries: Vec<_> =
            rows.iter().filter_map(|&row| index.get(row)).collect();
        serde_json::to_writer(&mut stdout, &entries)?;
        writeln!(stdout)?;
    } else {
        for entry in rows.iter().filter_map(|&row| index.get(row)) {
            writeln!(stdout, "{entry}")?;
        }
    }
    Ok(())
}

fn cmd_docsets(config: &Config, args: &DocsetsArgs) -> Result<()> {
    let docsets = docset::discover(config.docset_dir())?;
    let statuses = index::survey(&docsets);

    let mut stdout = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer(&mut stdout, &statuses)?;
        writeln!(stdout)?;
    } else if statuses.is_empty() {
        writeln!(
            stdout,
            "No docsets found in {}",
            config.docset_dir().display()
        )?;
    } else {
        for status in &statuses {
            match (&status.entries, &status.error) {
                (Some(count), _) => {
                    writeln!(stdout, "{}\t{count} entries", status.name)?
                }
                (None, Some(error)) => {
                    writeln!(stdout, "{}\terror: {error}", status.name)?
                }
                (None, None) => writeln!(stdout, "{}", status.name)?,
            }
        }
    }
    Ok(())
}
