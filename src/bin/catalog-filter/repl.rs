//! REPL mode for trying filter queries interactively

use colored::*;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::Value;

use catalog_filter::prelude::*;

use crate::record_label;

/// Run the interactive REPL mode.
///
/// Each line replaces the active filter. A line that does not parse keeps
/// the previous filter; an empty line clears it.
pub fn run_repl(parser: &FilterParser, records: &[Value]) -> anyhow::Result<()> {
    println!("{}", "catalog-filter REPL".cyan().bold());
    println!("{}", "Type a query to apply it. Commands:".dimmed());
    println!("  {}  - Show the active query", ".show".yellow());
    println!("  {} - Clear the active query", ".clear".yellow());
    println!("  {}  - List filter keys", ".keys".yellow());
    println!("  {}  - Exit the REPL", ".exit".yellow());
    println!();

    let mut rl = DefaultEditor::new()?;

    let history_path = dirs::home_dir()
        .map(|p| p.join(".catalog_filter_history"))
        .unwrap_or_default();
    let _ = rl.load_history(&history_path);

    let mut active = ActiveFilter::new();

    loop {
        let prompt = "filter> ".cyan().bold().to_string();
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match line.trim() {
                    ".exit" | ".quit" => break,
                    ".show" => {
                        match active.raw() {
                            Some(raw) => println!("{} {}", "→".green(), raw.white()),
                            None => println!("{}", "(no active filter)".dimmed()),
                        }
                        continue;
                    }
                    ".clear" => {
                        active.clear();
                        println!("{}", "Filter cleared.".dimmed());
                        continue;
                    }
                    ".keys" => {
                        let keys: Vec<&str> = parser.keys().keys().collect();
                        println!("{}", keys.join(", ").cyan());
                        continue;
                    }
                    _ => {}
                }

                match active.apply_or_clear(parser, &line) {
                    Ok(Some(root)) => println!("{} {}", "→".green(), root.to_string().white().bold()),
                    Ok(None) => println!("{}", "Filter cleared.".dimmed()),
                    Err(e) => {
                        eprintln!("{} {}", "✗".red(), e.to_string().red());
                        if let Some(raw) = active.raw() {
                            eprintln!("  {} {}", "still active:".dimmed(), raw);
                        }
                        continue;
                    }
                }

                if !records.is_empty() {
                    show_matches(&active, parser.keys(), records);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    let _ = rl.save_history(&history_path);
    Ok(())
}

fn show_matches(active: &ActiveFilter, keys: &KeySet, records: &[Value]) {
    let matched: Vec<&Value> = records.iter().filter(|r| active.matches(*r, keys)).collect();
    for record in &matched {
        println!("  • {}", record_label(record));
    }
    println!(
        "{}",
        format!("{} of {} record(s) matched", matched.len(), records.len()).dimmed()
    );
    println!();
}
