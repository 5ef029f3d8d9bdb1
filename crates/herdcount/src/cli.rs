//! Clap derive structures for the `herdcount` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// herdcount -- live dashboard for livestock counting sensors
#[derive(Debug, Parser)]
#[command(
    name = "herdcount",
    version,
    about = "Watch livestock counts and sensor devices from the command line",
    long_about = "A terminal client for the herdcount counting service.\n\n\
        `herdcount watch` runs the interactive session: log in, then follow\n\
        counts and device liveness as they refresh. Other commands are\n\
        one-shot queries for scripting.",
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
    /// Counting service API root (overrides config)
    #[arg(long, short = 'u', env = "HERDCOUNT_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Username to log in as
    #[arg(long, env = "HERDCOUNT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password (prompted for when omitted)
    #[arg(long, env = "HERDCOUNT_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HERDCOUNT_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
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
    /// Log in and follow the live dashboard
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Create an account
    Register,

    /// Show who the current credentials belong to
    Whoami,

    /// Aggregate count statistics
    Stats,

    /// List count records
    #[command(alias = "c")]
    Counts(CountsArgs),

    /// Manage sensor devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Submit a count the way a sensor does
    Count(CountArgs),

    /// Check that the service is up
    Ping,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Start on the account creation form
    #[arg(long)]
    pub register: bool,
}

// ── Counts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CountsArgs {
    /// Every record instead of today's
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Only the newest ten, newest first
    #[arg(long, conflicts_with = "all")]
    pub recent: bool,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices with liveness
    #[command(alias = "ls")]
    List,

    /// Register a sensor device
    Add {
        /// Display name
        name: String,

        /// Where the device is installed
        #[arg(long, short = 'l', default_value = "")]
        location: String,
    },

    /// Remove a device
    #[command(alias = "rm")]
    Remove {
        /// Device ID
        device: String,
    },

    /// Send a heartbeat on behalf of a device
    Heartbeat {
        /// Device ID
        device: String,
    },
}

// ── Count ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CountArgs {
    #[command(subcommand)]
    pub command: CountCommand,
}

#[derive(Debug, Subcommand)]
pub enum CountCommand {
    /// Record a detection
    Add {
        /// Reporting device ID
        device: String,

        /// Animals detected
        #[arg(long, short = 'n', default_value = "1")]
        count: u32,

        /// Animal type label
        #[arg(long, short = 't', default_value = "bovino")]
        animal_type: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
