//! The starter game loop: authenticate, look around, build a team, fight, and watch the result.

use tokio::time::sleep;

use crate::api::models::*;
use crate::api::{ApiError, GameApi};
use crate::credentials::{Credentials, NewAccount};
use crate::logging::{self, format_duration};
use crate::prelude::*;
use crate::views;

pub struct Settings {
    pub team_name: String,

    /// Maximum number of roster units to put into a new team.
    pub team_size: usize,

    pub strategy: Strategy,
    pub mode: String,
    pub poll_interval: StdDuration,
    pub max_wait: StdDuration,
    pub n_log_entries: usize,
}

impl Settings {
    /// Number of status checks that fit into the maximum waiting time, but at least one.
    pub fn n_poll_attempts(&self) -> u32 {
        let n_attempts = self.max_wait.as_nanos() / self.poll_interval.as_nanos().max(1);
        u32::try_from(n_attempts).unwrap_or(u32::MAX).max(1)
    }
}

pub enum Account {
    Existing(Credentials),
    New(NewAccount),
}

/// Where the game loop has stopped.
#[derive(Debug)]
pub enum Outcome {
    Finished(BattleResult),
    EmptyRoster,

    /// The service refused to queue the team, for example because of the daily battle limit.
    QueueRejected(ApiError),

    TimedOut,
}

/// Logs in or registers, and authorizes the subsequent calls.
pub async fn authenticate<A: GameApi>(api: &mut A, account: &Account) -> Result<Id> {
    let response = match account {
        Account::Existing(credentials) => {
            println!("{}", views::heading(&format!("Logging in as '{}'", credentials.email)));
            api.login(&credentials.as_login_request())
                .await
                .context("failed to log in")?
        }
        Account::New(account) => {
            println!("{}", views::heading(&format!("Registering as '{}'", account.username)));
            api.register(&account.as_register_request())
                .await
                .context("failed to register")?
        }
    };
    info!(player_id = %response.player_id, "authenticated");
    println!("  Player ID: {}", response.player_id);
    logging::set_user(&response.player_id);
    api.authorize(response.token);
    Ok(response.player_id)
}

/// Fetches and prints the battle result.
pub async fn show_battle_result<A: GameApi>(
    api: &A,
    battle_id: &Id,
    n_log_entries: usize,
) -> Result<BattleResult> {
    println!("{}", views::heading("Battle Results"));
    let result = api
        .get_battle_results(battle_id)
        .await
        .with_context(|| format!("failed to retrieve the results of battle #{}", battle_id))?;
    println!("{}", views::battle_result(&result, n_log_entries));
    Ok(result)
}

pub struct Game<A> {
    api: A,
    settings: Settings,
}

impl<A: GameApi> Game<A> {
    pub fn new(api: A, settings: Settings) -> Self {
        Self { api, settings }
    }

    #[instrument(skip_all)]
    pub async fn play(mut self, account: Account) -> Result<Outcome> {
        if let Account::New(account) = &account {
            println!("\n  Generated credentials:");
            println!("    Email:    {}", account.credentials.email);
            println!("    Password: {}", account.credentials.password);
            println!("    (save these to log in later with --email and --password)");
        }
        authenticate(&mut self.api, &account).await?;

        println!("{}", views::heading("Player Profile"));
        println!("{}", views::profile(&self.api.get_profile().await?));

        println!("{}", views::heading("Unit Shop"));
        for unit in self.api.get_available_units().await? {
            println!("{}", views::shop_unit(&unit));
        }

        println!("{}", views::heading("Your Roster"));
        let roster = self.api.get_roster().await?;
        println!("{}", views::roster(&roster));
        if roster.is_empty() {
            return Ok(Outcome::EmptyRoster);
        }

        let team = self.select_team(&roster).await?;
        let status = match self.queue(&team).await? {
            Ok(status) => status,
            Err(error) => return Ok(Outcome::QueueRejected(error)),
        };
        match self.wait_for_result(&status.battle_id).await? {
            Some(result) => Ok(Outcome::Finished(result)),
            None => Ok(Outcome::TimedOut),
        }
    }

    /// Picks the first existing team or creates one from the head of the roster.
    async fn select_team(&self, roster: &[RosterUnit]) -> Result<Team> {
        if let Some(team) = self.api.list_teams().await?.into_iter().next() {
            println!("{}", views::heading(&format!("Using existing team: '{}'", team.name)));
            return Ok(team);
        }

        println!("{}", views::heading("Creating Team"));
        let request = TeamRequest {
            name: self.settings.team_name.clone(),
            unit_ids: roster
                .iter()
                .take(self.settings.team_size)
                .map(|unit| unit.id.clone())
                .collect(),
            strategy: self.settings.strategy.clone(),
        };
        let team = self
            .api
            .configure_team(&request)
            .await
            .context("failed to create the team")?;
        println!("{}", views::team(&team));
        Ok(team)
    }

    /// Queues the team. A request rejected by the service is not an error for the game loop.
    async fn queue(&self, team: &Team) -> Result<Result<QueueStatus, ApiError>> {
        println!("{}", views::heading("Queuing for Battle"));
        let request = QueueRequest {
            team_id: team.id.clone(),
            mode: self.settings.mode.clone(),
        };
        match self.api.queue_battle(&request).await {
            Ok(status) => {
                println!("{}", views::queue_status(&status));
                Ok(Ok(status))
            }
            Err(error) => match error.downcast::<ApiError>() {
                Ok(error) if error.is_rejection() => {
                    warn!(team_id = %team.id, "{:#}", error);
                    println!("  Queue failed ({}): {}", error.status, error.body);
                    Ok(Err(error))
                }
                Ok(error) => Err(anyhow::Error::new(error).context("failed to queue the team")),
                Err(error) => Err(error.context("failed to queue the team")),
            },
        }
    }

    /// Polls the battle status until it completes or the waiting time runs out.
    async fn wait_for_result(&self, battle_id: &Id) -> Result<Option<BattleResult>> {
        println!("{}", views::heading("Waiting for Battle Result"));
        let n_attempts = self.settings.n_poll_attempts();
        for attempt in 0..n_attempts {
            let status = self.api.get_battle_status(battle_id).await?;
            debug!(%battle_id, attempt, %status.status);
            println!(
                "  [{}] Status: {}",
                format_duration(self.settings.poll_interval * attempt),
                status.status,
            );
            if status.status.is_completed() {
                let result =
                    show_battle_result(&self.api, battle_id, self.settings.n_log_entries).await?;
                return Ok(Some(result));
            }
            if attempt + 1 != n_attempts {
                sleep(self.settings.poll_interval).await;
            }
        }
        warn!(%battle_id, n_attempts, "timed out waiting for the battle to complete");
        println!("  Timed out waiting for battle to complete.");
        Ok(None)
    }
}
