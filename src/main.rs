//! CLI entry point for arbor

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use arbor::{
    FormatMode, Formatter, OutputTarget, TreeWalker, WalkerConfig, write_json_lines, write_report,
};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "Render a directory hierarchy as an indented text tree")]
#[command(version)]
struct Args {
    /// Directories to display
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Show hidden files
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// List directories only
    #[arg(short = 'd', long = "dirs-only")]
    dirs_only: bool,

    /// Append a type indicator like `ls -F` (/ @ = | *)
    #[arg(short = 'F', long = "classify")]
    classify: bool,

    /// Print the full path of each entry after its name
    #[arg(short = 'f', long = "full-path")]
    full_path: bool,

    /// Do not print indentation lines
    #[arg(short = 'i', long = "no-indent")]
    no_indent: bool,

    /// Ignore entries matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore")]
    ignore: Vec<String>,

    /// Do not print the directory and file counts
    #[arg(long = "noreport")]
    noreport: bool,

    /// Print the SHA-1 checksum of each file instead of its name (implies -f -i)
    #[arg(long = "checksum")]
    checksum: bool,

    /// Output one JSON object per entry
    #[arg(long = "json")]
    json: bool,

    /// Write output to stdout (-), stderr, /dev/null or a file
    #[arg(short = 'o', long = "output", value_name = "DEST", default_value = "-")]
    output: String,
}

impl Args {
    fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            show_all: self.all,
            dirs_only: self.dirs_only,
            ignore_patterns: self.ignore.clone(),
        }
    }

    fn format_mode(&self) -> FormatMode {
        FormatMode {
            full_path: self.full_path || self.checksum,
            prefix: !(self.no_indent || self.checksum),
            decoration: self.classify,
            symlink_target: true,
            checksum: self.checksum,
            ..Default::default()
        }
    }
}

/// Timing is appended to the report when DEBUG is set.
fn debug_timing() -> bool {
    std::env::var("DEBUG").is_ok_and(|v| !v.is_empty())
}

fn main() {
    // Logs go to stderr so they never interleave with the tree (respects RUST_LOG)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("arbor: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> arbor::Result<()> {
    let started = Instant::now();

    let walker = TreeWalker::from_config(&args.walker_config());
    let formatter = Formatter::with_mode(args.format_mode());
    tracing::debug!("{}", formatter);

    let mut out = OutputTarget::parse(&args.output).open()?;

    for (i, root) in args.paths.iter().enumerate() {
        let stream = walker.traverse(root);
        if args.json {
            write_json_lines(stream, &mut *out)?;
        } else {
            if i > 0 {
                writeln!(out)?;
            }
            io::copy(&mut formatter.reader(stream), &mut out)?;
        }
    }

    if !args.noreport && !args.json {
        let (dirs, files) = walker.counts();
        let elapsed = debug_timing().then(|| started.elapsed());
        write_report(&mut *out, dirs, files, elapsed)?;
    }

    out.flush()?;
    Ok(())
}
