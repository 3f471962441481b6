//! Thin CLI wrapper around [`svnwire::Client`]: argument parsing and
//! human-readable rendering only.

mod cli;

use std::io::Write as _;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use svnwire::{Client, Depth};

use cli::{CatArgs, Cli, Command, InfoArgs, LogArgs, LsArgs, RevisionRange};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Info(args) => run_info(args),
        Command::Cat(args) => run_cat(args),
        Command::Ls(args) => run_ls(args),
        Command::Log(args) => run_log(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("svnwire: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_info(args: InfoArgs) -> Result<(), String> {
    let mut client = Client::connect(&args.url).map_err(|e| e.to_string())?;
    let latest_rev = client.get_latest_rev().map_err(|e| e.to_string())?;
    println!("Repository UUID: {}", client.info.uuid.to_string_lossy());
    println!("Root URL: {}", client.info.url.to_string_lossy());
    println!("Latest revision: {latest_rev}");
    client.close().map_err(|e| e.to_string())
}

fn run_cat(args: CatArgs) -> Result<(), String> {
    let mut client = Client::connect(&args.url).map_err(|e| e.to_string())?;
    let rev = args.revision.map(|r| r.start);
    let (_props, content) = client
        .get_file(&args.path, rev, false, true)
        .map_err(|e| e.to_string())?;
    let content = content.ok_or_else(|| "server sent no file content".to_string())?;
    std::io::stdout()
        .write_all(&content)
        .map_err(|e| e.to_string())?;
    client.close().map_err(|e| e.to_string())
}

fn run_ls(args: LsArgs) -> Result<(), String> {
    let mut client = Client::connect(&args.url).map_err(|e| e.to_string())?;
    let rev = args.revision.map(|r| r.start);
    let entries = client
        .list(&args.path, rev, Depth::Immediates, &[])
        .map_err(|e| e.to_string())?;
    for entry in entries {
        if args.verbose {
            println!(
                "{:>10} {:>8} {:<20} {}",
                entry.size,
                entry.created_rev,
                entry.last_author.map(|a| a.to_string_lossy()).unwrap_or_default(),
                entry.path.to_string_lossy(),
            );
        } else {
            println!("{}", entry.path.to_string_lossy());
        }
    }
    client.close().map_err(|e| e.to_string())
}

fn run_log(args: LogArgs) -> Result<(), String> {
    let mut client = Client::connect(&args.url).map_err(|e| e.to_string())?;
    let (start_rev, end_rev) = match args.revision {
        Some(RevisionRange { start, end }) => (Some(start), end),
        None => (None, None),
    };
    let paths: Vec<&str> = if args.paths.is_empty() {
        vec!["/"]
    } else {
        args.paths.iter().map(String::as_str).collect()
    };
    let entries = client
        .log(&paths, start_rev, end_rev, args.verbose, None)
        .map_err(|e| e.to_string())?;
    for entry in entries {
        println!(
            "r{} | {} | {}",
            entry.rev,
            entry.author.to_string_lossy(),
            entry.date.to_string_lossy()
        );
        println!("{}", entry.message.to_string_lossy());
        if args.verbose {
            for changed in &entry.changed {
                println!(
                    "   {} {}",
                    changed.mode.to_string_lossy(),
                    changed.path.to_string_lossy()
                );
            }
        }
        println!();
    }
    client.close().map_err(|e| e.to_string())
}
