use super::Context;
use crate::println_pad;
use crate::utils::print_json;
use colored::Colorize;
use miette::Result;
use nms_expedition_core::{default_steam_roots, steam_status, ErrorResponse};

pub fn show_steam_status(ctx: &Context) -> Result<()> {
    let status = steam_status(&default_steam_roots());

    if ctx.json {
        return print_json::<_, ErrorResponse>(Ok(status));
    }

    let message = match status.offline {
        Some(true) => status.message.bright_green().bold(),
        Some(false) => status.message.bright_yellow().bold(),
        None => status.message.dimmed(),
    };

    println!();
    println_pad!("{}", message);
    if status.offline == Some(false) {
        println_pad!(
            "  {}",
            "Expeditions loaded from a local dataset need Steam in offline mode.".bright_yellow()
        );
    }
    println!();
    Ok(())
}
