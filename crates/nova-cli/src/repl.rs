//! Interactive chat loop.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use nova_core::Assistant;
use tracing::{info, warn};

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

const EXAMPLES: &[&str] = &[
    "open youtube",
    "launch calculator",
    "i feel tired and stressed",
    "create flashcards on photosynthesis",
    "practice test math",
    "link recursion to induction",
    "log progress rust 40",
    "deep research: solid state batteries",
    "add event standup at 09:30 for 15 min",
    "device status",
];

/// Run the chat loop until EOF or an exit word.
pub async fn cmd_chat(assistant: &Assistant) -> Result<()> {
    let report = assistant.status_report().await;

    println!();
    println!("  {} v{}", assistant.name(), env!("CARGO_PKG_VERSION"));
    println!("  Session: {}", assistant.session_id());
    println!(
        "  Backend: {}",
        report.backend.as_deref().unwrap_or("none (set an API key to enable)")
    );
    println!("  Skills: {}/{}", report.active_skills, report.catalogue_size);
    if !assistant.initialization_errors().is_empty() {
        println!(
            "  Startup issues: {} (run `nova status` for details)",
            assistant.initialization_errors().len()
        );
    }
    println!("  Type a request, 'help' for examples, or 'quit' to exit.");
    println!();

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n  Interrupted. Goodbye!");
            std::process::exit(0);
        }
    });

    let stdin = io::stdin();
    let mut line_buf = String::new();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        line_buf.clear();
        match stdin.lock().read_line(&mut line_buf) {
            Ok(0) => {
                println!();
                info!("EOF received, exiting");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("  Error reading input: {e}");
                continue;
            }
        }

        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }

        let lowered = trimmed.to_ascii_lowercase();
        if EXIT_WORDS.contains(&lowered.as_str()) {
            info!("user requested exit");
            println!("  Goodbye!");
            break;
        }
        if lowered == "help" {
            print_help();
            continue;
        }

        let reply = assistant.handle(trimmed).await;
        println!("{reply}");
        println!();

        if assistant.speech_enabled() && !assistant.speak(&reply).await {
            warn!("reply was not spoken");
        }
    }

    Ok(())
}

fn print_help() {
    println!("  Try one of:");
    for example in EXAMPLES {
        println!("    {example}");
    }
    println!("  Anything else goes to the knowledge backend when one is configured.");
    println!();
}
