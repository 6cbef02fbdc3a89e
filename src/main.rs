use clap::Parser;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::process;

use shell_front::{parse, parse_str, ParseError, ProgramNode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "shell-front")]
#[command(about = "Parse shell scripts and print their syntax tree")]
#[command(version)]
struct Cli {
    /// Parse the script from command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Print the tree as JSON
    #[arg(long = "json")]
    json: bool,

    /// Script file to parse
    #[arg()]
    script_file: Option<String>,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Determine script source: -c, file, or stdin
    let result: Result<ProgramNode, ParseError> = if let Some(ref s) = cli.script {
        parse_str(s, "-c")
    } else if let Some(ref file) = cli.script_file {
        match File::open(file) {
            Ok(f) => parse(f, file),
            Err(e) => {
                eprintln!("Error: Cannot read script file: {}: {}", file, e);
                process::exit(1);
            }
        }
    } else {
        if io::stdin().is_terminal() {
            eprintln!("Error: No script provided. Use -c 'script', provide a script file, or pipe via stdin.");
            process::exit(1);
        }
        parse(io::stdin().lock(), "<stdin>")
    };

    let program = match result {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&program) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{:#?}", program);
    }
}
