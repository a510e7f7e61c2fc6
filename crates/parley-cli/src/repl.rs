//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use parley_agent::Agent;
use parley_core::utils::{get_data_path, truncate_string};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Commands that clear the session and replay the intro.
const NEW_SESSION_COMMANDS: &[&str] = &["/new", "/reset"];

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Exit,
    NewSession,
    Message(&'a str),
}

/// Run the interactive REPL loop.
pub async fn run(agent: Agent) -> Result<()> {
    helpers::print_banner(agent.name(), agent.session_id());

    // Greet only on a fresh session so persisted history survives a restart.
    if agent.history().is_empty() {
        greet(&agent);
    } else {
        println!();
    }

    let mut editor = create_editor()?;

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        match classify(&line) {
            Input::Skip => continue,
            Input::Exit => {
                println!("\nGoodbye!");
                break;
            }
            Input::NewSession => {
                let _ = editor.add_history_entry(&line);
                greet(&agent);
            }
            Input::Message(message) => {
                let _ = editor.add_history_entry(&line);
                debug!(
                    session = agent.session_id(),
                    input = %truncate_string(message, 80),
                    "processing input"
                );
                helpers::print_thinking();

                let result = agent.chat_with_history(message).await;
                helpers::clear_thinking();
                match result {
                    Ok(response) => helpers::print_response(agent.name(), &response),
                    Err(e) => eprintln!("\n{} {e}\n", "Error:".red().bold()),
                }
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Start a fresh session and show the intro, if the agent has one.
fn greet(agent: &Agent) {
    match agent.start_new_session(None) {
        Some(intro) => helpers::print_response(agent.name(), &intro),
        None => println!("\n{}\n", "(new session)".dimmed()),
    }
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Skip;
    }
    let lower = trimmed.to_lowercase();
    if EXIT_COMMANDS.contains(&lower.as_str()) {
        Input::Exit
    } else if NEW_SESSION_COMMANDS.contains(&lower.as_str()) {
        Input::NewSession
    } else {
        Input::Message(trimmed)
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    get_data_path().join("history").join("cli_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
