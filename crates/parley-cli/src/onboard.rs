//! `parley onboard` — initialize configuration and sample agent files.
//!
//! - Creates `~/.parley/config.json` with defaults
//! - Creates `~/.parley/prompts/` with a sample prompt and intro file
//! - Creates the sessions and REPL history directories

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use parley_core::config::{get_config_path, save_config, Config};
use parley_core::utils::{get_data_path, get_prompts_path};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "Parley — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&Config::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let prompts_dir = get_prompts_path();
    write_samples(&prompts_dir)?;

    let data_dir = get_data_path();
    std::fs::create_dir_all(data_dir.join("sessions"))?;
    std::fs::create_dir_all(data_dir.join("history"))?;

    println!();
    println!(
        "{}",
        "  Setup complete! Run `parley chat` to start talking.".green()
    );
    println!();

    Ok(())
}

/// Write the sample prompt and intro files into `dir`, keeping existing ones.
fn write_samples(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    create_template(&dir.join("parley_prompt.txt"), PROMPT_TEMPLATE)?;
    create_template(&dir.join("parley_intro.json"), INTRO_TEMPLATE)?;
    Ok(())
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────

const PROMPT_TEMPLATE: &str = r#"You are Parley, a friendly conversation partner for language learners.

- Keep replies short: two or three sentences.
- Use simple, natural language and stay in the scenario the learner picks.
- When the learner makes a mistake, reply normally first, then add one gentle
  correction on a new line starting with "Tip:".
"#;

const INTRO_TEMPLATE: &str = r#"{
  "greeting": "Hi! I'm Parley. What would you like to talk about today?",
  "cafe": "Good morning! Welcome to the Corner Café. What can I get for you?",
  "hotel_checkin": "Good evening and welcome to the Grand Hotel. Do you have a reservation?"
}
"#;

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
