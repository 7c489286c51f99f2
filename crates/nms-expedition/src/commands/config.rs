use super::Context;
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::print_json;
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use nms_expedition_core::{
    app_data_root, build_cache_path, detect_steam_accounts, main_steam_account, nms_root,
    AppConfig, ErrorCode, ErrorResponse, Platform, SteamAccount,
};

pub struct SetPlatformArgs {
    pub platform: Platform,
    pub steam_id: Option<String>,
}

/// Print a config path entry with status indicator
fn print_path_config(name: &str, path: Option<&Utf8PathBuf>) {
    match path {
        Some(p) => {
            let status = if p.exists() {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!("  {} {} {}", format!("{}:", name).bright_white(), p, status);
        }
        None => {
            println!(
                "  {} {}",
                format!("{}:", name).bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }
}

fn print_value_config(name: &str, value: Option<&str>) {
    let value = match value {
        Some(v) => v.bright_green(),
        None => "(not set)".bright_yellow(),
    };
    println!("  {} {}", format!("{}:", name).bright_white(), value);
}

pub fn show_config(ctx: &Context) -> Result<()> {
    let cfg = ctx.store.load();

    if ctx.json {
        return print_json::<_, ErrorResponse>(Ok(cfg));
    }

    println!();
    println!("  {} {}", "config_file:".bright_white(), ctx.store.path());
    print_value_config("platform", cfg.platform.map(Platform::as_str));
    print_value_config("steam_id", cfg.steam_id.as_deref());
    print_path_config("cache_path", cfg.cache_path.as_ref());
    print_path_config("data_dir", Some(&ctx.catalog.data_dir().to_path_buf()));
    println!();
    Ok(())
}

pub fn set_platform(ctx: &Context, args: SetPlatformArgs) -> Result<()> {
    let result = resolve_platform_config(ctx, args);

    if ctx.json {
        return match result {
            Ok(cfg) => print_json::<_, ErrorResponse>(Ok(cfg)),
            Err(e) => print_json::<AppConfig, _>(Err(ErrorResponse::new(
                ErrorCode::Config,
                e.to_string(),
            ))),
        };
    }

    let cfg = result?;
    println!(
        "{}",
        "✓ Platform configured successfully!".bright_green().bold()
    );
    println!();
    print_value_config("platform", cfg.platform.map(Platform::as_str));
    if let Some(steam_id) = &cfg.steam_id {
        print_value_config("steam_id", Some(steam_id));
    }
    print_path_config("cache_path", cfg.cache_path.as_ref());

    if cfg.cache_path.as_ref().is_some_and(|p| !p.exists()) {
        println!();
        println!(
            "  {}",
            "The cache directory does not exist yet. Start the game once to create it."
                .bright_yellow()
        );
    }
    Ok(())
}

fn resolve_platform_config(ctx: &Context, args: SetPlatformArgs) -> Result<AppConfig, CliError> {
    let app_data = app_data_root().ok_or(CliError::NoAppDataDir)?;

    let steam_id = match (args.platform, args.steam_id) {
        (Platform::Steam, Some(id)) => Some(id),
        (Platform::Steam, None) if !cfg!(target_os = "macos") => {
            let account =
                main_steam_account(&nms_root(&app_data)).ok_or(CliError::NoSteamAccount)?;
            tracing::info!("Using Steam account {}", account.steam_id);
            Some(account.steam_id)
        }
        _ => None,
    };

    let cache_path =
        build_cache_path(args.platform, steam_id.as_deref()).ok_or(CliError::NoAppDataDir)?;

    let cfg = ctx.store.update(|cfg| {
        cfg.platform = Some(args.platform);
        cfg.steam_id = steam_id;
        cfg.cache_path = Some(cache_path);
        cfg.first_setup = false;
    })?;
    Ok(cfg)
}

pub fn detect_steam(ctx: &Context) -> Result<()> {
    let root = app_data_root()
        .map(|dir| nms_root(&dir))
        .ok_or(CliError::NoAppDataDir)?;
    let accounts = detect_steam_accounts(&root);
    let main = main_steam_account(&root);

    if ctx.json {
        return print_json::<Vec<SteamAccount>, ErrorResponse>(Ok(accounts));
    }

    println!(
        "{}",
        "Searching for No Man's Sky Steam accounts...".bright_cyan()
    );
    println!();

    if accounts.is_empty() {
        println!("{}", "✗ No Steam accounts found".bright_red().bold());
        println!();
        println!("  {} {}", "Searched:".bright_white(), root);
        return Ok(());
    }

    for account in &accounts {
        let is_main = main.as_ref() == Some(account);
        let marker = if is_main {
            "●".bright_green().bold()
        } else {
            "•".bright_cyan()
        };
        let label = if is_main {
            format!("{} {}", account.steam_id, "(most recent)".dimmed())
        } else {
            account.steam_id.clone()
        };
        println_pad!("{} {}", marker, label);
        println_pad!("  {}", account.cache_path.as_str().dimmed());
    }
    println!();
    println!(
        "  {} Use 'nms-expedition config set-platform steam --steam-id <id>' to pick one",
        "•".bright_cyan()
    );
    Ok(())
}

pub fn reset_config(ctx: &Context) -> Result<()> {
    let cfg = AppConfig::default();
    let result = ctx.store.save(&cfg).map(|()| cfg);

    if ctx.json {
        return print_json(result);
    }

    result.map_err(CliError::from)?;
    println!("{}", "✓ Configuration reset".bright_green().bold());
    Ok(())
}
