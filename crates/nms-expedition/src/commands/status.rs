use super::Context;
use crate::utils::{print_ansi_boxed_lines, print_json};
use crate::println_pad;
use colored::Colorize;
use miette::Result;
use nms_expedition_core::{CacheState, ErrorResponse};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    #[serde(flatten)]
    state: CacheState,
    game_running: bool,
}

pub fn show_status(ctx: &Context) -> Result<()> {
    let service = ctx.service();
    let state = service.current_state();
    let game_running = service.is_running();

    if ctx.json {
        return print_json::<_, ErrorResponse>(Ok(StatusReport {
            state,
            game_running,
        }));
    }

    println!();
    print_ansi_boxed_lines(&status_lines(&state));

    if game_running {
        println!();
        println_pad!(
            "{} {}",
            "⚠".bright_yellow().bold(),
            "No Man's Sky is running. Close it before switching expeditions.".bright_yellow()
        );
    }
    println!();
    Ok(())
}

fn status_lines(state: &CacheState) -> Vec<String> {
    let mut lines = Vec::new();
    match state {
        CacheState::Error { error, cache_path } => {
            lines.push(format!("{} {}", "Mode:".bright_white(), "Error".bright_red().bold()));
            lines.push(error.bright_red().to_string());
            if let Some(path) = cache_path {
                lines.push(format!("{} {}", "Cache:".bright_white(), path));
            }
        }
        CacheState::NoCache { error, cache_path } => {
            lines.push(format!(
                "{} {}",
                "Mode:".bright_white(),
                "No cache".bright_yellow().bold()
            ));
            lines.push(format!("{} {}", "Cache:".bright_white(), cache_path));
            lines.push(error.bright_yellow().to_string());
            lines.push("Start the game once online to create it.".dimmed().to_string());
        }
        CacheState::Online { cache_path, .. } => {
            lines.push(format!(
                "{} {}",
                "Mode:".bright_white(),
                "Online".bright_green().bold()
            ));
            lines.push(format!("{} {}", "Cache:".bright_white(), cache_path));
        }
        CacheState::Expedition {
            cache_path,
            current_expedition,
            files,
        } => {
            lines.push(format!(
                "{} {}",
                "Mode:".bright_white(),
                "Expedition".bright_cyan().bold()
            ));
            lines.push(format!("{} {}", "Cache:".bright_white(), cache_path));
            let current = match current_expedition {
                Some(descriptor) => descriptor.display_name().bright_cyan().bold().to_string(),
                None => "Unknown dataset".bright_yellow().to_string(),
            };
            lines.push(format!("{} {}", "Active:".bright_white(), current));
            if let Some(backup) = &files.backup_file {
                lines.push(format!("{} {}", "Backup:".bright_white(), backup));
            }
        }
    }
    lines
}
