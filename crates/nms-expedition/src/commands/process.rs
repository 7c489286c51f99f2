use super::Context;
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::print_json;
use colored::Colorize;
use miette::Result;
use nms_expedition_core::ErrorResponse;
use std::sync::mpsc;
use std::time::Duration;

pub struct WatchArgs {
    pub interval_ms: u64,
}

pub fn show_process(ctx: &Context) -> Result<()> {
    let info = ctx.service().process_info();

    if ctx.json {
        return print_json::<_, ErrorResponse>(Ok(info));
    }

    println!();
    match info {
        Some(info) => {
            println_pad!(
                "{} {}",
                "●".bright_green().bold(),
                "No Man's Sky is running".bright_green().bold()
            );
            println_pad!("  {} {}", "Process:".bright_white(), info.name);
            println_pad!("  {} {}", "PID:".bright_white(), info.pid);
            println_pad!("  {} {}", "Platform:".bright_white(), info.platform);
            println_pad!("  {} {}", "Memory:".bright_white(), info.memory_usage);
            println_pad!("  {} {}", "Started:".bright_white(), info.start_time);
        }
        None => println_pad!(
            "{} {}",
            "○".dimmed(),
            "No Man's Sky is not running".bright_white()
        ),
    }
    println!();
    Ok(())
}

/// Prints every change in game liveness until the process is interrupted.
pub fn watch_process(ctx: &Context, args: WatchArgs) -> Result<()> {
    let interval = Duration::from_millis(args.interval_ms.max(100));
    let (tx, rx) = mpsc::channel();

    let watcher = ctx
        .service()
        .watch(interval, move |running| {
            let _ = tx.send(running);
        })
        .map_err(CliError::from)?;

    if !ctx.json {
        println_pad!(
            "{}",
            format!("Watching for No Man's Sky every {:?} (Ctrl+C to stop)", interval).dimmed()
        );
    }

    let mut last = None;
    for running in rx {
        if last == Some(running) {
            continue;
        }
        last = Some(running);

        if ctx.json {
            println!("{}", serde_json::json!({ "running": running }));
        } else if running {
            println_pad!("{} {}", "●".bright_green().bold(), "Game started".bright_green());
        } else {
            println_pad!("{} {}", "○".dimmed(), "Game not running".bright_white());
        }
    }

    watcher.stop();
    Ok(())
}
