//! Clap derive structures for the `marspro` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// marspro -- control MarsPro grow lights and inline fans
#[derive(Debug, Parser)]
#[command(
    name = "marspro",
    version,
    about = "Control MarsPro grow lights and fans from the command line",
    long_about = "A CLI for MarsPro cloud-connected grow lights and inline fans.\n\n\
        Talks to the same cloud service as the mobile app. Device state is\n\
        polled; changes show up on the next refresh.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "MARSPRO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account username (overrides profile)
    #[arg(long, short = 'u', env = "MARSPRO_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MARSPRO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MARSPRO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the configured credentials against the service
    Login,

    /// List devices across all polled product groups
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Control grow lights
    #[command(alias = "lights", alias = "l")]
    Light(LightArgs),

    /// Control inline fans
    #[command(alias = "fans", alias = "f")]
    Fan(FanArgs),

    /// Poll continuously and print every refresh
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices from the latest poll
    #[command(alias = "ls")]
    List {
        /// Only show one product group (1 = lights, 2 = fans)
        #[arg(long, short = 'g')]
        group: Option<u32>,
    },

    /// Fetch the full device record from the service
    Get {
        /// Device ID
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIGHTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// List lights with their current brightness
    #[command(alias = "ls")]
    List,

    /// Turn a light on
    On {
        /// Device ID
        device: String,

        /// Brightness (0-255). Defaults to the last reported level.
        #[arg(long, short = 'b')]
        brightness: Option<u8>,
    },

    /// Turn a light off
    Off {
        /// Device ID
        device: String,
    },

    /// Set a light's brightness
    Set {
        /// Device ID
        device: String,

        /// Brightness (0-255)
        brightness: u8,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FANS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FanArgs {
    #[command(subcommand)]
    pub command: FanCommand,
}

#[derive(Debug, Subcommand)]
pub enum FanCommand {
    /// List fans with their current speed
    #[command(alias = "ls")]
    List,

    /// Turn a fan on
    On {
        /// Device ID
        device: String,

        /// Speed percentage (raised to 25 if lower)
        #[arg(long, short = 's', value_parser = clap::value_parser!(u8).range(0..=100))]
        percentage: Option<u8>,
    },

    /// Drop a fan to its minimum speed (the hardware has no off state)
    Off {
        /// Device ID
        device: String,
    },

    /// Set a fan's speed
    Set {
        /// Device ID
        device: String,

        /// Speed percentage (raised to 25 if lower)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percentage: u8,
    },

    /// Show airflow (CFM) and static pressure (PA) for a speed
    Calc {
        /// Device ID
        device: String,

        /// Speed percentage
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percentage: u8,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides profile)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (passwords masked)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
