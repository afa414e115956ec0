//! Command-line driver: lex, compile, execute.
//!
//! The lexer writes token records to an intermediate file which the parser
//! re-reads; the parser never re-opens the source itself.  All errors funnel
//! through the single exit path below: print and exit 1.

use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pl0_compiler::{lexer, parser};
use pl0_runtime::interpreter::Interpreter;
use pl0_runtime::trace::TraceSink;

#[derive(Debug, Parser)]
#[command(
    name = "pl0",
    about = "Compile a PL/0 program to P-code and run it on the built-in machine"
)]
struct Cli {
    /// Source program.
    #[arg(default_value = "pascal.txt")]
    source: PathBuf,

    /// Intermediate token file written by the lexer and re-read by the parser.
    #[arg(default_value = "out.txt")]
    tokens: PathBuf,

    /// Write the per-instruction execution trace to this file.
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Print the compiled instruction listing before running.
    #[arg(long)]
    dump_code: bool,

    /// Print the frozen scope tree as JSON before running.
    #[arg(long)]
    dump_symbols: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&cli.source)?;
    let mut token_file = BufWriter::new(fs::File::create(&cli.tokens)?);
    lexer::tokenize(&source, &mut token_file)?;
    token_file.flush()?;
    drop(token_file);

    let records = BufReader::new(fs::File::open(&cli.tokens)?);
    let program = parser::parse(records)?;

    if cli.dump_code {
        for (index, instruction) in program.code.iter().enumerate() {
            println!("{index}: {instruction}");
        }
    }
    if cli.dump_symbols {
        println!("{}", serde_json::to_string_pretty(&program.symbols)?);
    }

    let mut trace: TraceSink<Box<dyn Write>> = match &cli.trace {
        Some(path) => TraceSink::new(Box::new(BufWriter::new(fs::File::create(path)?))),
        None => TraceSink::disabled(),
    };

    let stdin = io::stdin();
    let outcome = Interpreter::new(&program).execute(stdin.lock(), &mut trace)?;
    if let Some(mut writer) = trace.into_inner() {
        writer.flush()?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for value in &outcome.outputs {
        writeln!(out, "{value}")?;
    }
    Ok(())
}
