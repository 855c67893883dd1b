//! Command-line interface for wametuelewa
//! Tokenizes and parses single messages, mostly for trying out grammars.
//!
//! Usage:
//!   wametuelewa tokenize `<text>`                                - Print the tokens of a message
//!   wametuelewa parse `<text>` [--grammar `<name>`] [--notation `<expr>`] [--explain]
//!                                                              - Run a grammar over a message
//!   wametuelewa grammars                                       - List available grammars
//!
//! `parse` exits with 0 on a match, 2 when a field is missing, 3 when nothing
//! matched, and 1 on any error.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::process;
use wametuelewa::message::{compile, explain, grammars, parse, tokenize, Grammar, Outcome, Token};
use wametuelewa_config::{Loader, OutputFormat, WametuelewaConfig};

fn main() {
    let matches = Command::new("wametuelewa")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recover structured fields from short free-text messages")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .global(true)
                .value_parser(["text", "json"])
                .help("Output format (overrides the configuration)"),
        )
        .subcommand(
            Command::new("tokenize").about("Print the tokens of a message").arg(
                Arg::new("text")
                    .help("Message text")
                    .required(true)
                    .index(1),
            ),
        )
        .subcommand(
            Command::new("parse")
                .about("Run a grammar over a message")
                .arg(
                    Arg::new("text")
                        .help("Message text")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("grammar")
                        .long("grammar")
                        .short('g')
                        .help("Name of a configured or built-in grammar"),
                )
                .arg(
                    Arg::new("notation")
                        .long("notation")
                        .short('n')
                        .conflicts_with("grammar")
                        .help("Grammar written inline, e.g. 'Word[1:] & Delimiter & Number'"),
                )
                .arg(
                    Arg::new("explain")
                        .long("explain")
                        .action(ArgAction::SetTrue)
                        .help("Print every complete derivation to stderr"),
                ),
        )
        .subcommand(Command::new("grammars").about("List available grammars"))
        .get_matches();

    let config = load_config(&matches);
    let format = config.output.format;

    match matches.subcommand() {
        Some(("tokenize", tokenize_matches)) => {
            let text = required(tokenize_matches, "text");
            handle_tokenize_command(text, format);
        }
        Some(("parse", parse_matches)) => {
            let code = handle_parse_command(parse_matches, &config, format);
            process::exit(code);
        }
        Some(("grammars", _)) => {
            handle_grammars_command(&config);
        }
        _ => unreachable!(),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_default()
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_config(matches: &ArgMatches) -> WametuelewaConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader
            .set_override("output.format", format.as_str())
            .unwrap_or_else(|e| fail(format!("Invalid configuration: {}", e)));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("Invalid configuration: {}", e)))
}

/// Handle the tokenize command
fn handle_tokenize_command(text: &str, format: OutputFormat) {
    let tokens = tokenize(text).unwrap_or_else(|e| fail(e));

    match format {
        OutputFormat::Text => {
            for token in &tokens {
                println!("{}", token);
            }
        }
        OutputFormat::Json => print_json(&tokens),
    }
}

/// Handle the parse command, returning the exit code
fn handle_parse_command(matches: &ArgMatches, config: &WametuelewaConfig, format: OutputFormat) -> i32 {
    let grammar = resolve_grammar(matches, config).unwrap_or_else(|e| fail(e));
    let text = required(matches, "text");
    let tokens = tokenize(text).unwrap_or_else(|e| fail(e));

    if matches.get_flag("explain") {
        print_derivations(&grammar, &tokens);
    }

    let outcome = parse(&grammar, &tokens);
    match format {
        OutputFormat::Text => match &outcome {
            Outcome::Match(_) => println!("match: {}", outcome),
            Outcome::Diagnostic(diagnostic) => println!("missing: {}", diagnostic.label()),
            Outcome::NoMatch => println!("no match"),
        },
        OutputFormat::Json => print_json(&outcome),
    }

    match outcome {
        Outcome::Match(_) => 0,
        Outcome::Diagnostic(_) => 2,
        Outcome::NoMatch => 3,
    }
}

/// Handle the grammars command
fn handle_grammars_command(config: &WametuelewaConfig) {
    println!("Configured grammars:\n");
    for (name, notation) in &config.grammars {
        let marker = if *name == config.parse.default_grammar {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", name, marker);
        println!("    {}", notation);
    }

    println!("\nBuilt-in grammars:\n");
    for name in grammars::NAMES {
        if let Some(grammar) = grammars::by_name(name) {
            println!("  {}", name);
            println!("    {}", grammar);
        }
    }
}

/// Inline notation wins, then configured names, then built-in names
fn resolve_grammar(matches: &ArgMatches, config: &WametuelewaConfig) -> Result<Grammar, String> {
    if let Some(notation) = matches.get_one::<String>("notation") {
        return compile(notation).map_err(|e| e.to_string());
    }

    let name = matches
        .get_one::<String>("grammar")
        .unwrap_or(&config.parse.default_grammar);

    if let Some(notation) = config.grammar(name) {
        return compile(notation).map_err(|e| format!("grammar `{}`: {}", name, e));
    }
    grammars::by_name(name)
        .cloned()
        .ok_or_else(|| format!("Unknown grammar `{}`", name))
}

fn print_derivations(grammar: &Grammar, tokens: &[Token]) {
    let derivations = explain(grammar, tokens);
    eprintln!("{} complete derivation(s)", derivations.len());
    for (index, derivation) in derivations.iter().enumerate() {
        let items: Vec<String> = derivation.items.iter().map(|item| item.to_string()).collect();
        eprintln!("  [{}] {}", index, items.join(", "));
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}
