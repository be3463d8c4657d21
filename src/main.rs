use std::fs;

use clap::Parser;

/// sexpr evaluates S-expression scripts against the demonstration
/// prelude and prints the list of top-level results.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells sexpr to read a file instead of an inline script.
    #[arg(short, long)]
    file: bool,

    /// Closes unterminated containers at end of input instead of failing,
    /// for piped or partial input.
    #[arg(short, long)]
    auto_close: bool,

    contents: String,
}

fn main() {
    let args = Args::parse();

    let script = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            std::process::exit(1);
        })
    } else {
        args.contents
    };

    match run_with_options(&script, args.auto_close) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        },
    }
}

fn run_with_options(script: &str, auto_close: bool) -> Result<String, sexpr::Error> {
    use sexpr::interpreter::{
        evaluator::{Interpreter, builtin},
        parser::{ParserOptions, parse_with_options},
    };

    let interp = Interpreter::new();
    builtin::install(&interp);

    let options = ParserOptions { auto_close_on_eof: auto_close };
    let root = parse_with_options(script.as_bytes(), options)?;
    let (_ctx, value) = interp.eval(&root)?;
    Ok(value.to_string())
}
