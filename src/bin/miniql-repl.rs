//! miniql interactive shell.
//!
//! Reads queries line by line, parses them against a set of table
//! definitions and prints the resulting plan tree or the parse error. On a
//! failed parse the shell also reports how far the state machine got, which
//! is what the diagnostic entry point exists for.
//!
//! Usage: miniql-repl [--table name:col1,col2,...]... [--no-expand]

use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use miniql::{expand_wildcards, last_states, parse, Relation};

#[derive(Parser, Debug)]
#[command(name = "miniql-repl")]
#[command(about = "Interactive miniql query planner shell", long_about = None)]
struct Args {
    /// Table definition as name:col1,col2,... (repeatable; a demo schema is
    /// used when none is given)
    #[arg(short, long = "table", value_name = "SPEC")]
    tables: Vec<String>,

    /// Print plans as parsed, without expanding * projections
    #[arg(long)]
    no_expand: bool,
}

fn parse_table_spec(spec: &str) -> Result<Relation, String> {
    let (name, columns) = spec
        .split_once(':')
        .ok_or_else(|| format!("invalid table spec {:?}, expected name:col1,col2,...", spec))?;
    if name.is_empty() {
        return Err(format!("invalid table spec {:?}: empty table name", spec));
    }
    let columns: Vec<&str> = columns.split(',').filter(|c| !c.is_empty()).collect();
    if columns.is_empty() {
        return Err(format!("invalid table spec {:?}: no columns", spec));
    }
    Ok(Relation::new(name, &columns))
}

fn demo_relations() -> Vec<Relation> {
    vec![
        Relation::new("users", &["id", "name", "age", "profile"]),
        Relation::new("orders", &["id", "user_id", "total"]),
    ]
}

fn print_banner(relations: &[Relation]) {
    println!("  {}", "miniql interactive shell".white().bold());
    println!(
        "  Type a query, {} for help, {} or ctrl-d to quit\n",
        ".help".yellow(),
        ".exit".yellow()
    );
    print_tables(relations);
}

fn print_tables(relations: &[Relation]) {
    for relation in relations {
        println!(
            "  {} {}",
            relation.name.cyan(),
            relation.column_names().join(", ").dimmed()
        );
    }
    println!();
}

fn print_help() {
    println!("\n{}", "Commands:".white().bold());
    println!("  {}     Show this help", ".help".yellow());
    println!("  {}     Exit the shell", ".exit".yellow());
    println!("  {}   Show the known tables", ".tables".yellow());

    println!("\n{}", "Examples:".white().bold());
    println!("  {}", "SELECT name, age FROM users".green());
    println!("  {}", "SELECT * FROM users WHERE age > 18".green());
    println!(
        "  {}",
        "SELECT json_extract(profile, '$.city') FROM users WHERE age >= 21 ORDER BY name DESC"
            .green()
    );
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let relations = if args.tables.is_empty() {
        demo_relations()
    } else {
        let mut relations = Vec::with_capacity(args.tables.len());
        for spec in &args.tables {
            match parse_table_spec(spec) {
                Ok(relation) => relations.push(relation),
                Err(err) => {
                    eprintln!("{} {}", "Error:".red().bold(), err);
                    std::process::exit(1);
                }
            }
        }
        relations
    };

    print_banner(&relations);

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let history_file = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".miniql_history"))
        .unwrap_or_else(|_| std::path::PathBuf::from(".miniql_history"));
    let _ = rl.load_history(&history_file);

    loop {
        match rl.readline(&format!("{} ", "miniql>".cyan())) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    ".exit" | ".quit" | ".q" => break,
                    ".help" | ".h" | ".?" => {
                        print_help();
                        continue;
                    }
                    ".tables" => {
                        print_tables(&relations);
                        continue;
                    }
                    _ => {}
                }

                match parse(line, &relations) {
                    Ok(plan) => {
                        let plan = if args.no_expand {
                            Ok(plan)
                        } else {
                            expand_wildcards(plan)
                        };
                        match plan {
                            Ok(plan) => print!("{}", plan),
                            Err(err) => println!("{} {}", "Error:".red().bold(), err),
                        }
                    }
                    Err(err) => {
                        println!("{} {}", "Error:".red().bold(), err);
                        // Show how far the machine got before failing.
                        if let Ok((last, prev)) = last_states(line) {
                            println!(
                                "{}",
                                format!("  (parser stopped in {:?}, after {:?})", last, prev)
                                    .dimmed()
                            );
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Type .exit to quit".dimmed());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_file);
}
