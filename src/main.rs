// klam - A KLambda compiler and trampolined runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use futures::executor::block_on;
use klam_core::{Error, Options, Result};
use klam_embed::Engine;
use klam_reader::{Direction, KlamStream, KlamVal, ReaderPort, StreamError, WriterPort};
use log::{debug, info};

/// Evaluate KLambda files, then start a REPL.
#[derive(Parser, Debug)]
#[command(name = "klam", version, about)]
struct Cli {
    /// Run in suspension-aware mode, awaiting asynchronous functions
    #[arg(long = "async")]
    async_mode: bool,

    /// Exit after evaluating the given files
    #[arg(long)]
    no_repl: bool,

    /// Source files, evaluated in order
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let engine = Engine::with_options(host_options(cli.async_mode));
    info!(
        "klam {} ({} mode)",
        env!("CARGO_PKG_VERSION"),
        if cli.async_mode { "async" } else { "sync" }
    );

    if let Err(e) = run_files(&cli.files, &engine) {
        eprintln!("{}", e);
        process::exit(1);
    }
    if !cli.no_repl {
        run_repl(&engine);
    }
}

/// Runtime options backed by the process's standard streams and file system.
fn host_options(suspend: bool) -> Options {
    Options::new()
        .with_implementation("klam")
        .with_release(env!("CARGO_PKG_VERSION"))
        .with_os(std::env::consts::OS)
        .with_port(env!("CARGO_PKG_VERSION"))
        .with_porters("Tom Waddington")
        .with_stinput(KlamStream::new(
            "stdin",
            Direction::In,
            ReaderPort(io::stdin()),
        ))
        .with_stoutput(KlamStream::new(
            "stdout",
            Direction::Out,
            WriterPort(io::stdout()),
        ))
        .with_sterror(KlamStream::new(
            "stderr",
            Direction::Out,
            WriterPort(io::stderr()),
        ))
        .with_open_read(|path| {
            let file = File::open(path).map_err(|e| io_error(path, e))?;
            Ok(KlamStream::new(
                path,
                Direction::In,
                ReaderPort(BufReader::new(file)),
            ))
        })
        .with_open_write(|path| {
            let file = File::create(path).map_err(|e| io_error(path, e))?;
            Ok(KlamStream::new(
                path,
                Direction::Out,
                WriterPort(BufWriter::new(file)),
            ))
        })
        .with_suspend(suspend)
}

fn io_error(path: &str, source: io::Error) -> Error {
    Error::Stream(StreamError::Io {
        name: path.to_string(),
        source,
    })
}

/// Evaluate a sequence of source files
fn run_files(files: &[PathBuf], engine: &Engine) -> std::result::Result<(), String> {
    for file_path in files {
        eval_file(file_path, engine)?;
    }
    Ok(())
}

/// Evaluate a single source file
fn eval_file(path: &Path, engine: &Engine) -> std::result::Result<(), String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("kl") => {}
        Some(ext) => {
            return Err(format!(
                "Error: unsupported file extension '.{}' for '{}'",
                ext,
                path.display()
            ));
        }
        None => {
            return Err(format!(
                "Error: file '{}' has no extension (expected .kl)",
                path.display()
            ));
        }
    }

    debug!("evaluating {}", path.display());
    let result = if engine.runtime().is_async() {
        block_on(engine.eval_file_async(path))
    } else {
        engine.eval_file(path)
    };
    result
        .map(|_| ())
        .map_err(|e| format!("Error in '{}': {}", path.display(), e))
}

fn eval_line(line: &str, engine: &Engine) -> Result<KlamVal> {
    if engine.runtime().is_async() {
        block_on(engine.eval_async(line))
    } else {
        engine.eval(line)
    }
}

/// Run the interactive REPL
fn run_repl(engine: &Engine) {
    println!("klam v{}", env!("CARGO_PKG_VERSION"));

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("(klam) ");
        if let Err(e) = io::stdout().flush() {
            eprintln!("Write error: {}", e);
            break;
        }

        input.clear();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let line = input.trim();
                if line.is_empty() {
                    continue;
                }
                match eval_line(line, engine) {
                    Ok(result) => println!("{}", result),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }
    }
}
