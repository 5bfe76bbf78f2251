// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command-line surface of the `gatehouse` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Gatehouse: issues bearer tokens, tracks their sessions and answers
/// forward-auth checks for the services behind it.
#[derive(Parser, Debug)]
#[command(
    name = "gatehouse",
    author = "Sylvex <contact@sylvex.io>",
    version = gatehouse_api::VERSION,
    about = "Authentication and authorization gate",
    propagate_version = true
)]
pub struct Cli {
    /// YAML, TOML or JSON file describing the gate
    #[arg(
        short,
        long,
        default_value = "gatehouse.yaml",
        env = "GATEHOUSE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub log: LogArgs,

    /// What to do; serves the gate when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Logging overrides. Any flag given here beats the `logging` section.
#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Filter directive, e.g. `info` or `gatehouse_api=debug,info`
    #[arg(
        id = "log_level",
        short = 'l',
        long = "log-level",
        env = "GATEHOUSE_LOG_LEVEL",
        global = true
    )]
    pub level: Option<String>,

    /// Line format of log output
    #[arg(
        id = "log_format",
        long = "log-format",
        env = "GATEHOUSE_LOG_FORMAT",
        global = true
    )]
    pub format: Option<LogFormat>,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Include debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl LogArgs {
    /// `-q` and `-v` win over `-l`, which wins over the configured level.
    pub fn level<'a>(&'a self, configured: Option<&'a str>) -> &'a str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (_, true) => "debug",
            _ => self.level.as_deref().or(configured).unwrap_or("info"),
        }
    }

    /// The flag, else the configured format, else text.
    pub fn format(&self, configured: Option<LogFormat>) -> LogFormat {
        self.format.or(configured).unwrap_or_default()
    }
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the gate until SIGTERM or SIGINT
    #[command(alias = "serve")]
    Run,

    /// Load and check the configuration without binding a port
    Validate(ValidateArgs),

    /// Print crate versions and the build target
    Version,

    /// Print an Argon2id hash for `directory.users[].password_hash`
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

/// `gatehouse validate`
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Also print the effective configuration, secrets redacted
    #[arg(short, long)]
    pub show_config: bool,

    /// Report as text or JSON
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// `gatehouse hash-password`
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Plaintext password; prefer --stdin to keep it out of shell history
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    pub password: Option<String>,

    /// Read one line from standard input instead
    #[arg(long)]
    pub stdin: bool,
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, colored on a terminal
    #[default]
    Text,
    /// One JSON object per event
    Json,
    /// Single line without targets
    Compact,
}

impl From<gatehouse_config::LogFormat> for LogFormat {
    fn from(format: gatehouse_config::LogFormat) -> Self {
        use gatehouse_config::LogFormat as Configured;
        match format {
            Configured::Text => Self::Text,
            Configured::Json => Self::Json,
            Configured::Compact => Self::Compact,
        }
    }
}

/// Report layout for `validate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Readable summary
    #[default]
    Text,
    /// Machine-readable report
    Json,
}

impl Cli {
    /// Parses `std::env::args`, exiting on usage errors.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand, with a bare `gatehouse` meaning `run`.
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("gatehouse").chain(args.iter().copied()))
    }

    #[test]
    fn test_bare_invocation_serves() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run));
        assert!(matches!(parse(&["serve"]).effective_command(), Commands::Run));
    }

    #[test]
    fn test_validate_flags() {
        let cli = parse(&["validate", "--show-config", "-f", "json"]);
        let Some(Commands::Validate(args)) = cli.command else {
            panic!("expected validate");
        };
        assert!(args.show_config);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_path_is_global() {
        let cli = parse(&["validate", "-c", "/etc/gatehouse/gate.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/gatehouse/gate.toml"));
    }

    #[test]
    fn test_log_level_precedence() {
        assert_eq!(parse(&["-l", "trace"]).log.level(Some("error")), "trace");
        assert_eq!(parse(&[]).log.level(Some("error")), "error");
        assert_eq!(parse(&[]).log.level(None), "info");
        assert_eq!(parse(&["-q", "-l", "trace"]).log.level(None), "warn");
        assert_eq!(parse(&["-v"]).log.level(None), "debug");
        assert!(Cli::try_parse_from(["gatehouse", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_log_format_precedence() {
        let configured = Some(LogFormat::Compact);
        assert_eq!(parse(&["--log-format", "json"]).log.format(configured), LogFormat::Json);
        assert_eq!(parse(&[]).log.format(configured), LogFormat::Compact);
        assert_eq!(parse(&[]).log.format(None), LogFormat::Text);
    }

    #[test]
    fn test_validate_format_is_separate_from_log_format() {
        let cli = parse(&["validate", "--log-format", "compact", "-f", "json"]);
        assert_eq!(cli.log.format(None), LogFormat::Compact);
        let Some(Commands::Validate(args)) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.format, OutputFormat::Json);

        let cli = parse(&["validate"]);
        assert_eq!(cli.log.format(None), LogFormat::Text);
        let Some(Commands::Validate(args)) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_hash_password_sources() {
        let cli = parse(&["hash-password", "hunter22"]);
        let Some(Commands::HashPassword(args)) = cli.command else {
            panic!("expected hash-password");
        };
        assert_eq!(args.password.as_deref(), Some("hunter22"));
        assert!(!args.stdin);

        assert!(Cli::try_parse_from(["gatehouse", "hash-password"]).is_err());
        assert!(Cli::try_parse_from(["gatehouse", "hash-password", "--stdin"]).is_ok());
        assert!(Cli::try_parse_from(["gatehouse", "hash-password", "x", "--stdin"]).is_err());
    }
}
