//! Shared CLI helpers: response printing and the REPL banner.

use colored::Colorize;

/// Print an agent turn to stdout under the agent's name.
pub fn print_response(agent_name: &str, response: &str) {
    println!();
    println!("{}", agent_name.cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(agent_name: &str, session_id: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Parley".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!("Talking to {agent_name} (session: {session_id})").dimmed()
    );
    println!(
        "{}",
        "Type a message, \"/new\" to start over, or \"exit\" to quit.".dimmed()
    );
}

/// Print a "thinking" placeholder while the model answers.
pub fn print_thinking() {
    eprint!("{}", "… thinking".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Mark for a configured / missing item in status listings.
pub fn check_mark(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}
