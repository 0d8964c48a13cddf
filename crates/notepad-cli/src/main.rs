//! CLI entry point for the notepad backend (for dev and testing).
//!
//! `notepad PATH` opens a file headlessly; the subcommands expose each call the
//! UI layer makes on the editor bridge.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use notepad_core::{app_data_dir, load_config, scan_files, set_last_file, status, Classification, EditorBridge};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "notepad")]
#[command(about = "Notepad: a small text editor backend")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// File to open on launch. Use `notepad -- PATH` when the file is named like
    /// a subcommand (e.g. `status`).
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend status (for dev).
    Status,
    /// Show where notepad stores its config (app data directory).
    DataDir,
    /// Report MIME type, text verdict, and grammar for files.
    Classify {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print a file's MIME type.
    Mime {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Print the human-readable description instead of the name.
        #[arg(long)]
        comment: bool,
    },
    /// Print the highlighting grammar for a file or a MIME type.
    Syntax {
        #[arg(value_name = "PATH", required_unless_present = "mime", conflicts_with = "mime")]
        path: Option<PathBuf>,
        /// Look up by MIME type name instead of a path.
        #[arg(long, value_name = "NAME")]
        mime: Option<String>,
    },
    /// Classify every file under a directory.
    Scan {
        #[arg(value_name = "DIR")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print a file's contents.
    Read {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Replace a file's contents.
    Write {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        content: String,
    },
    /// Open a file in a new, independent instance.
    OpenNew {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

/// One row of `classify` output.
#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    classification: Classification,
    grammar: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = load_config();
    let bridge = EditorBridge::from_config(&config);

    match (cli.command, cli.path) {
        (Some(command), _) => run(command, &bridge),
        (None, Some(path)) => open(&bridge, &path),
        (None, None) => {
            println!("Notepad backend");
            println!("  core: {}", status());
            if let Some(last) = config.last_file {
                println!("  last file: {}", last);
            }
            ExitCode::SUCCESS
        }
    }
}

fn run(command: Commands, bridge: &EditorBridge) -> ExitCode {
    match command {
        Commands::Status => {
            println!("Notepad backend");
            println!("  core: {}", status());
        }
        Commands::DataDir => match app_data_dir() {
            Some(p) => println!("{}", p.display()),
            None => {
                eprintln!("Could not determine app data directory.");
                return ExitCode::FAILURE;
            }
        },
        Commands::Classify { paths, json } => {
            let reports: Vec<Report> = paths.iter().map(|p| report(bridge, p)).collect();
            return print_reports(&reports, json);
        }
        Commands::Mime { path, comment } => {
            if comment {
                println!("{}", bridge.get_mime_type_comment(&path));
            } else {
                println!("{}", bridge.get_mime_type(&path));
            }
        }
        Commands::Syntax { path, mime } => match (path, mime) {
            (_, Some(mime)) => println!("{}", bridge.detect_syntax_from_mime_type(&mime)),
            (Some(path), None) => println!("{}", bridge.detect_syntax(&path)),
            (None, None) => {
                eprintln!("Give a PATH or --mime NAME.");
                return ExitCode::FAILURE;
            }
        },
        Commands::Scan { path, json } => match scan_files(bridge.mime_database(), &path) {
            Ok(files) => {
                if !json {
                    println!("Scanned {} file(s) under {}", files.len(), path.display());
                }
                let reports: Vec<Report> = files
                    .into_iter()
                    .map(|c| Report {
                        grammar: bridge.detect_syntax(&c.path),
                        classification: c,
                    })
                    .collect();
                return print_reports(&reports, json);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Commands::Read { path } => print!("{}", bridge.read_file(&path)),
        Commands::Write { path, content } => {
            if !bridge.write_file(&path, &content) {
                eprintln!("Could not write {}", path.display());
                return ExitCode::FAILURE;
            }
        }
        Commands::OpenNew { path } => bridge.open_in_new_instance(&path),
    }
    ExitCode::SUCCESS
}

/// Headless "open": show the file if it is text, and remember it.
fn open(bridge: &EditorBridge, path: &Path) -> ExitCode {
    let c = bridge.classify(path);
    if !c.is_text {
        eprintln!("Not opening {}: {} ({})", path.display(), c.mime_comment, c.mime_name);
        return ExitCode::FAILURE;
    }
    println!("# {} [{}; syntax: {}]", path.display(), c.mime_name, bridge.detect_syntax(path));
    print!("{}", bridge.read_file(path));
    if path.exists() {
        if let Err(e) = set_last_file(path) {
            tracing::warn!(error = %e, "could not remember last file");
        }
    }
    ExitCode::SUCCESS
}

fn report(bridge: &EditorBridge, path: &Path) -> Report {
    Report {
        classification: bridge.classify(path),
        grammar: bridge.detect_syntax(path),
    }
}

fn print_reports(reports: &[Report], json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(reports) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }
    for r in reports {
        let c = &r.classification;
        let verdict = if c.is_text { "text" } else { "binary" };
        println!("  {}  {}  {}  {}", c.path.display(), c.mime_name, verdict, r.grammar);
    }
    ExitCode::SUCCESS
}
