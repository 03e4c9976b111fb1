//! CLI options.

use clap::{Args, Parser, Subcommand};

use crate::api::models::{Id, Strategy};
use crate::api::DEFAULT_BASE_URL;
use crate::credentials::Credentials;
use crate::game;
use crate::prelude::*;

pub mod parsers;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Opts {
    #[command(flatten)]
    pub connection: ConnectionOpts,

    /// Sentry DSN
    #[arg(long, env = "SENTRY_DSN", global = true)]
    pub sentry_dsn: Option<String>,

    /// Sentry performance monitoring sample rate
    #[arg(long, default_value = "0", global = true)]
    pub traces_sample_rate: f32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Plays through the full game loop, registering a new account unless credentials are given
    Play(PlayOpts),

    /// Shows the player profile
    Profile,

    /// Lists the units available in the shop
    Shop,

    /// Lists the units the player owns
    Roster,

    /// Lists the player's teams
    Teams,

    /// Shows the result of a finished battle
    Battle(BattleOpts),
}

#[derive(Args)]
pub struct ConnectionOpts {
    /// API base URL
    #[arg(
        long,
        env = "APICOMBAT_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        value_parser = parsers::base_url,
        global = true,
    )]
    pub base_url: String,

    /// Existing account e-mail
    #[arg(long, env = "APICOMBAT_EMAIL", requires = "password", global = true)]
    pub email: Option<String>,

    /// Existing account password
    #[arg(
        long,
        env = "APICOMBAT_PASSWORD",
        requires = "email",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// HTTP request timeout
    #[arg(long, default_value = "30s", value_parser = parsers::non_zero_duration, global = true)]
    pub timeout: StdDuration,
}

impl ConnectionOpts {
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Args)]
pub struct PlayOpts {
    /// Name of the team to create when the player has none
    #[arg(long, default_value = "Rust Starter Team")]
    pub team_name: String,

    /// Number of roster units to put into a new team
    #[arg(long, default_value = "5", value_parser = parsers::team_size)]
    pub team_size: usize,

    /// Team formation
    #[arg(long, default_value = "balanced")]
    pub formation: String,

    /// Comma-separated target priorities
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [String::from("lowest_hp"), String::from("healers")],
    )]
    pub target_priority: Vec<String>,

    /// Battle mode
    #[arg(long, default_value = "casual")]
    pub mode: String,

    /// Battle status polling interval
    #[arg(long, default_value = "3s", value_parser = parsers::non_zero_duration)]
    pub poll_interval: StdDuration,

    /// Maximum time to wait for the battle to complete
    #[arg(long, default_value = "1m", value_parser = humantime::parse_duration)]
    pub max_wait: StdDuration,

    #[command(flatten)]
    pub log: LogOpts,
}

#[derive(Args)]
pub struct BattleOpts {
    /// Battle ID
    pub battle_id: String,

    #[command(flatten)]
    pub log: LogOpts,
}

#[derive(Args)]
pub struct LogOpts {
    /// Number of combat log entries to show
    #[arg(long = "log-entries", default_value = "20")]
    pub n_log_entries: usize,
}

impl BattleOpts {
    pub fn battle_id(&self) -> Id {
        Id::from(self.battle_id.as_str())
    }
}

impl From<PlayOpts> for game::Settings {
    fn from(opts: PlayOpts) -> Self {
        Self {
            team_name: opts.team_name,
            team_size: opts.team_size,
            strategy: Strategy {
                formation: opts.formation,
                target_priority: opts.target_priority,
            },
            mode: opts.mode,
            poll_interval: opts.poll_interval,
            max_wait: opts.max_wait,
            n_log_entries: opts.log.n_log_entries,
        }
    }
}
