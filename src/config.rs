use crate::auth::Role;
use anyhow::{Context, Result, anyhow};
use chrono::Duration;
use clap::Parser;
use std::env;

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 30;
/// Ten years.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret for signing bearer tokens; required to serve or issue.
    pub token_secret: Option<String>,
    /// Lifetime of tokens handed out by login and `--issue-token`.
    pub token_ttl: Duration,
}

/// What the process should do once configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Serve,
    /// Apply migrations and exit.
    Migrate,
    /// Print a signed operator token and exit.
    IssueToken {
        subject: String,
        role: Role,
    },
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Campsite booking and occupancy API")]
pub struct Args {
    /// Host to bind to (overrides CAMPSITE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CAMPSITE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides CAMPSITE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Token signing secret (overrides CAMPSITE_TOKEN_SECRET)
    #[arg(long)]
    pub token_secret: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Issue a bearer token for SUBJECT and exit
    #[arg(long, value_name = "SUBJECT", conflicts_with = "migrate")]
    pub issue_token: Option<String>,

    /// Role carried by the issued token
    #[arg(long, value_enum)]
    pub role: Option<Role>,

    /// Lifetime of issued tokens in hours (overrides CAMPSITE_TOKEN_TTL_HOURS)
    #[arg(long)]
    pub token_ttl_hours: Option<i64>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, Mode)> {
        // Parse CLI once
        let args = Args::parse();
        Self::resolve(args, |key| env::var(key).ok())
    }

    /// Merge parsed args over values looked up with `env`.
    pub fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<(Self, Mode)> {
        // --- Environment fallback ---
        let env_host = env("CAMPSITE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match env("CAMPSITE_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing CAMPSITE_PORT value `{}`", value))?,
            None => 5000,
        };
        let env_db =
            env("CAMPSITE_DATABASE_URL").unwrap_or_else(|| "sqlite://./data/campsite.db".into());
        let env_secret = env("CAMPSITE_TOKEN_SECRET").filter(|s| !s.is_empty());
        let env_ttl = match env("CAMPSITE_TOKEN_TTL_HOURS") {
            Some(value) => value
                .parse::<i64>()
                .with_context(|| format!("parsing CAMPSITE_TOKEN_TTL_HOURS value `{}`", value))?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };
        let token_ttl = parse_token_ttl(args.token_ttl_hours.unwrap_or(env_ttl))?;

        let mode = match (args.migrate, args.issue_token) {
            (true, _) => Mode::Migrate,
            (false, Some(subject)) => Mode::IssueToken {
                subject,
                role: args
                    .role
                    .ok_or_else(|| anyhow!("--issue-token requires --role"))?,
            },
            (false, None) => Mode::Serve,
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            token_secret: args.token_secret.or(env_secret),
            token_ttl,
        };

        Ok((cfg, mode))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn require_token_secret(&self) -> Result<&str> {
        self.token_secret
            .as_deref()
            .ok_or_else(|| anyhow!("CAMPSITE_TOKEN_SECRET (or --token-secret) must be set"))
    }
}

fn parse_token_ttl(hours: i64) -> Result<Duration> {
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(anyhow!(
            "token lifetime must be between 1 and {} hours, got {}",
            MAX_TOKEN_TTL_HOURS,
            hours
        ));
    }
    Duration::try_hours(hours).ok_or_else(|| anyhow!("token lifetime of {} hours is out of range", hours))
}
