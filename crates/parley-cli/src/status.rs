//! `parley status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use parley_core::config::{get_config_path, load_config};
use parley_core::utils::expand_home;
use parley_providers::registry::{match_provider, PROVIDERS};

use crate::helpers::check_mark;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "Parley Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        check_mark(config_path.exists())
    );

    // Agent files
    let agent = &config.agent;
    println!("  {:<18} {}", "Agent:".bold(), agent.name);
    let prompt = expand_home(&agent.prompt_file);
    println!(
        "  {:<18} {} {}",
        "Prompt:".bold(),
        prompt.display(),
        check_mark(prompt.exists())
    );
    match &agent.intro_file {
        Some(intro) => {
            let intro = expand_home(intro);
            println!(
                "  {:<18} {} {}",
                "Intro:".bold(),
                intro.display(),
                check_mark(intro.exists())
            );
        }
        None => println!("  {:<18} {}", "Intro:".bold(), "· none".dimmed()),
    }
    println!(
        "  {:<18} {}",
        "Session:".bold(),
        agent.session_id.as_deref().unwrap_or(&agent.name)
    );

    // Model
    println!("  {:<18} {}", "Model:".bold(), config.model.model);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", config.model.temperature).dimmed(),
        format!("{}", config.model.max_tokens).dimmed(),
    );
    println!(
        "  {:<18} {}",
        "History:".bold(),
        format!(
            "{} turns, {}",
            config.sessions.max_messages,
            if config.sessions.persist { "persisted" } else { "in memory" }
        )
        .dimmed()
    );

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    let providers_map = config.providers.to_map();
    let selected = match_provider(&config.model.model, &providers_map).map(|(_, spec)| spec.name);

    for spec in PROVIDERS {
        let config = providers_map.get(spec.name).cloned().unwrap_or_default();
        let mut status = if !spec.is_usable(&config) {
            format!("{}", "· not configured".dimmed())
        } else if config.api_key.is_empty() {
            format!("{} (local)", "✓".green())
        } else {
            format!("{} (key set)", "✓".green())
        };
        if selected == Some(spec.name) {
            status.push_str(&format!(" {}", "← active".cyan()));
        }
        println!("    {:<20} {}", spec.display_name, status);
    }

    println!();

    Ok(())
}
