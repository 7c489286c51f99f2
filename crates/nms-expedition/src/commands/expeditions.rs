use super::Context;
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::print_json;
use colored::Colorize;
use miette::Result;

pub fn list_expeditions(ctx: &Context) -> Result<()> {
    let service = ctx.service();
    let expeditions = service.list_available();

    if ctx.json {
        return print_json(expeditions);
    }

    let expeditions = expeditions.map_err(CliError::from)?;
    let current_id = service
        .current_state()
        .current_expedition()
        .map(|d| d.id.clone());

    println!();
    if expeditions.is_empty() {
        println_pad!(
            "{} {}",
            "No expeditions found in".bright_yellow(),
            service.catalog().data_dir()
        );
        println!();
        return Ok(());
    }

    println_pad!("{}", "🚀 Expeditions:".bright_magenta().bold());
    for expedition in &expeditions {
        let marker = if current_id.as_deref() == Some(expedition.id.as_str()) {
            "●".bright_green().bold()
        } else {
            "•".bright_cyan()
        };
        println_pad!(
            "   {} {} {}",
            marker,
            expedition.display_name().bright_white().bold(),
            format!("({})", expedition.id).dimmed()
        );

        let meta = &expedition.metadata;
        if let Some(description) = &meta.description {
            println_pad!("       {}", description);
        }
        let details: Vec<String> = [
            meta.difficulty.as_ref().map(|d| format!("Difficulty: {}", d)),
            meta.release_date.as_ref().map(|d| format!("Released: {}", d)),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !details.is_empty() {
            println_pad!("       {}", details.join("  ").dimmed());
        }
        if !meta.rewards.is_empty() {
            println_pad!("       {} {}", "Rewards:".bright_yellow(), meta.rewards.join(", "));
        }
    }
    println!();
    Ok(())
}

pub fn activate_expedition(ctx: &Context, id: &str) -> Result<()> {
    let result = ctx.service().activate(id);

    if ctx.json {
        return print_json(result);
    }

    let activation = result.map_err(CliError::from)?;
    println!();
    println_pad!(
        "{} {}",
        "✓".bright_green().bold(),
        activation.message.bright_green().bold()
    );
    if activation.backup_created {
        println_pad!("  {}", "Original season data backed up".dimmed());
    }
    println_pad!(
        "  {}",
        "Launch the game in offline mode to play the expedition.".bright_cyan()
    );
    println!();
    Ok(())
}

pub fn restore_original(ctx: &Context) -> Result<()> {
    let result = ctx.service().restore();

    if ctx.json {
        return print_json(result);
    }

    let restoration = result.map_err(CliError::from)?;
    println!();
    println_pad!(
        "{} {}",
        "✓".bright_green().bold(),
        restoration.message.bright_green().bold()
    );
    println_pad!("  {} {}", "Path:".bright_white(), restoration.restored_path);
    println!();
    Ok(())
}
