//! Glich CLI and REPL
//!
//! Usage:
//!   glich run <file.glcs>   - Execute a Glich script file
//!   glich repl              - Start interactive REPL
//!   glich help              - Show help message

use std::env;
use std::fs;
use std::io::Write;
use std::process;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use glich::{phrase, Runtime, Value, VERSION};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: glich run <file.glcs>");
                process::exit(1);
            }
            run_file(&args[2]);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("Glich {}", VERSION),
        _ => {
            // Assume it's a file
            if args[1].ends_with(".glcs") {
                run_file(&args[1]);
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("{}", "Glich".cyan().bold());
    println!("A script language for calendar arithmetic");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  glich run <file.glcs>    Execute a Glich script file");
    println!("  glich repl               Start interactive REPL");
    println!("  glich help               Show this help message");
    println!("  glich version            Show version\n");
    println!("{}", "EXAMPLES:".yellow());
    println!("  glich run birthdays.glcs");
    println!("  glich repl\n");
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  let d = date \"19sep1948\";   Parse a date to a day count");
    println!("  write text d + 7;           Print a date a week later");
    println!("  1948..1950 | 1956           Range list expressions");
    println!("  function f(x) {{ result = x; }}  Function definition");
}

/// A runtime whose `@read` built-in prompts on standard output.
fn console_runtime() -> Runtime {
    let mut rt = Runtime::with_input(Box::new(|prompt| {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        line.trim_end_matches(['\r', '\n']).to_string()
    }));
    rt.load_hics_library();
    rt
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(1);
        }
    };

    let mut rt = console_runtime();
    print!("{}", rt.run_script(&source));
}

fn run_repl() {
    println!(
        "{} {} - {}",
        "Glich".cyan().bold(),
        VERSION.cyan(),
        "calendar arithmetic".dimmed()
    );
    println!(
        "Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = DefaultEditor::new().expect("Failed to create REPL");

    // One runtime for the whole session, so definitions and marks
    // persist across lines.
    let mut rt = console_runtime();

    loop {
        match rl.readline(&format!("{} ", "glich>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Handle special commands
                match line {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    _ => {}
                }

                if let Some(phrase_text) = line.strip_prefix("date ").filter(|r| {
                    r.trim_start().starts_with(['"', '#', '[', '~', '('])
                }) {
                    let value = rt.evaluate(&phrase::parse_date_phrase(phrase_text));
                    print_value(&value);
                    continue;
                }

                if line.contains(';') {
                    // Statements: run and echo whatever they write.
                    let out = rt.run_script(line);
                    if !out.is_empty() {
                        print!("{}", out);
                        if !out.ends_with('\n') {
                            println!();
                        }
                    }
                } else {
                    let value = rt.evaluate(line);
                    print_value(&value);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

fn print_value(value: &Value) {
    match value {
        Value::Null => {}
        Value::Error(_) => {
            eprintln!("{}", format!("{}", value).red());
        }
        v => println!("{} {}", "=>".dimmed(), format!("{}", v).cyan()),
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit   Exit the REPL");
    println!("  help         Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  today");
    println!("  text today + 7");
    println!("  date \"19sep1948\"");
    println!("  date \"1948\" | \"1950..1956\"");
    println!("  let x = 10;");
    println!("  function double(n) {{ result = n * 2; }}");
    println!("  write @double(21);");
}
