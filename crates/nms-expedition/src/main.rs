use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use commands::{
    activate_expedition, detect_steam, list_expeditions, reset_config, restore_original,
    set_platform, show_config, show_process, show_status, show_steam_status, watch_process,
    Context, SetPlatformArgs, WatchArgs,
};
use miette::Result;
use nms_expedition_core::{Platform, DEFAULT_WATCH_INTERVAL};
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print machine-readable JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Directory containing the expedition datasets
    #[arg(long, global = true, env = "NMS_EXPEDITIONS_DIR")]
    data_dir: Option<Utf8PathBuf>,

    /// Configuration file to use instead of ~/.nms-utils/config.json
    #[arg(long, global = true, env = "NMS_UTILS_CONFIG")]
    config_file: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which season data is active
    Status,
    /// List the available expeditions
    List,
    /// Back up the online season data and load an expedition
    Activate {
        /// Expedition id (dataset file name without .json)
        id: String,
    },
    /// Put the original season data back
    Restore,
    /// Show whether No Man's Sky is running
    Process,
    /// Report whenever No Man's Sky starts or stops
    Watch {
        /// Polling interval in milliseconds
        #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL.as_millis() as u64)]
        interval_ms: u64,
    },
    /// Manage the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Show whether Steam is in offline mode
    SteamStatus,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Choose the store the game was bought from and derive its cache path
    SetPlatform {
        #[arg(value_enum)]
        platform: PlatformArg,

        /// Steam account directory (st_<17 digits>); detected when omitted
        #[arg(long)]
        steam_id: Option<String>,
    },
    /// List Steam accounts that have a season cache
    DetectSteam,
    /// Restore the default configuration
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PlatformArg {
    Steam,
    #[value(name = "msstore")]
    MsStore,
    Gog,
    #[value(name = "gamepass")]
    GamePass,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Steam => Platform::Steam,
            PlatformArg::MsStore => Platform::MsStore,
            PlatformArg::Gog => Platform::Gog,
            PlatformArg::GamePass => Platform::GamePass,
        }
    }
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("nms_expedition={0},nms_expedition_core={0}", default_level).into()
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    let ctx = Context {
        store: utils::config::config_store(args.config_file.as_deref())?,
        catalog: utils::config::catalog(args.data_dir.as_deref()),
        json: args.json,
    };

    match args.command {
        Commands::Status => show_status(&ctx),
        Commands::List => list_expeditions(&ctx),
        Commands::Activate { id } => activate_expedition(&ctx, &id),
        Commands::Restore => restore_original(&ctx),
        Commands::Process => show_process(&ctx),
        Commands::Watch { interval_ms } => watch_process(&ctx, WatchArgs { interval_ms }),
        Commands::Config { action } => match action {
            ConfigCommands::Show => show_config(&ctx),
            ConfigCommands::SetPlatform { platform, steam_id } => set_platform(
                &ctx,
                SetPlatformArgs {
                    platform: platform.into(),
                    steam_id,
                },
            ),
            ConfigCommands::DetectSteam => detect_steam(&ctx),
            ConfigCommands::Reset => reset_config(&ctx),
        },
        Commands::SteamStatus => show_steam_status(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "nms-expedition",
            "activate",
            "01_pioneers",
            "--json",
            "--data-dir",
            "/data",
            "-vv",
        ])
        .unwrap();

        assert!(args.json);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.data_dir, Some(Utf8PathBuf::from("/data")));
        assert!(matches!(args.command, Commands::Activate { ref id } if id == "01_pioneers"));
    }

    #[test]
    fn watch_interval_defaults_to_core_interval() {
        let default_ms = DEFAULT_WATCH_INTERVAL.as_millis() as u64;
        let args = Args::try_parse_from(["nms-expedition", "watch"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Watch { interval_ms } if interval_ms == default_ms
        ));

        let args =
            Args::try_parse_from(["nms-expedition", "watch", "--interval-ms", "250"]).unwrap();
        assert!(matches!(args.command, Commands::Watch { interval_ms: 250 }));
    }

    #[test]
    fn parses_platform_names() {
        let args =
            Args::try_parse_from(["nms-expedition", "config", "set-platform", "msstore"]).unwrap();
        match args.command {
            Commands::Config {
                action: ConfigCommands::SetPlatform { platform, steam_id },
            } => {
                assert_eq!(Platform::from(platform), Platform::MsStore);
                assert!(steam_id.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
