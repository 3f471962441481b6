//! Command-line argument parsing for the `svnwire` binary.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "svnwire", version, about = "A command-line client for the svnserve wire protocol")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints the repository's UUID, root URL, and latest revision.
    Info(InfoArgs),
    /// Prints the content of a file at a path and revision.
    Cat(CatArgs),
    /// Lists the entries under a directory.
    Ls(LsArgs),
    /// Prints the log history for a set of paths.
    Log(LogArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Repository URL, e.g. svn+ssh://host/path or file:///path.
    pub url: String,
}

#[derive(Debug, Args)]
pub struct CatArgs {
    pub url: String,
    pub path: String,
    /// Revision to read; defaults to HEAD.
    #[arg(short = 'r', long = "revision")]
    pub revision: Option<RevisionRange>,
}

#[derive(Debug, Args)]
pub struct LsArgs {
    pub url: String,
    pub path: String,
    #[arg(short = 'r', long = "revision")]
    pub revision: Option<RevisionRange>,
    /// Print size, created revision, and last author alongside each entry.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    pub url: String,
    /// Paths to restrict the log to; the repository root if none are given.
    pub paths: Vec<String>,
    #[arg(short = 'r', long = "revision")]
    pub revision: Option<RevisionRange>,
    /// Print each revision's changed paths alongside its message.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// A `-r rev` or `-r rev1:rev2` argument, following `svn`'s own convention.
#[derive(Debug, Clone, Copy)]
pub struct RevisionRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl std::str::FromStr for RevisionRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((start, end)) => Ok(RevisionRange {
                start: start
                    .parse()
                    .map_err(|_| format!("invalid revision {start:?}"))?,
                end: Some(
                    end.parse()
                        .map_err(|_| format!("invalid revision {end:?}"))?,
                ),
            }),
            None => Ok(RevisionRange {
                start: s.parse().map_err(|_| format!("invalid revision {s:?}"))?,
                end: None,
            }),
        }
    }
}
