use clap::Parser;

use crate::api::{Client, GameApi};
use crate::credentials::NewAccount;
use crate::game::{Account, Game, Outcome};
use crate::opts::{Command, Opts};
use crate::prelude::*;

mod api;
mod credentials;
mod game;
mod logging;
mod opts;
mod prelude;
mod views;

#[tokio::main]
async fn main() -> Result {
    let opts = Opts::parse();
    let _sentry_guard = logging::init(opts.sentry_dsn.clone(), opts.traces_sample_rate)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting…");

    let result = run(opts).await;
    if let Err(error) = &result {
        // Returning the error prints it, so it only goes to Sentry here.
        sentry::integrations::anyhow::capture_anyhow(error);
    }
    result
}

async fn run(opts: Opts) -> Result {
    let client = Client::new(&opts.connection.base_url, opts.connection.timeout)?;
    let credentials = opts.connection.credentials();

    match opts.command {
        Command::Play(play_opts) => {
            let account = match credentials {
                Some(credentials) => Account::Existing(credentials),
                None => Account::New(NewAccount::random()),
            };
            let outcome = Game::new(client, play_opts.into()).play(account).await?;
            report(&outcome);
            Ok(())
        }
        command => {
            let credentials = credentials.ok_or_else(|| {
                anyhow!("this command needs --email and --password of an existing account")
            })?;
            show(client, Account::Existing(credentials), command).await
        }
    }
}

/// Runs a single read-only command.
async fn show(mut client: Client, account: Account, command: Command) -> Result {
    game::authenticate(&mut client, &account).await?;

    match command {
        Command::Profile => {
            println!("{}", views::heading("Player Profile"));
            println!("{}", views::profile(&client.get_profile().await?));
        }
        Command::Shop => {
            println!("{}", views::heading("Unit Shop"));
            for unit in client.get_available_units().await? {
                println!("{}", views::shop_unit(&unit));
            }
        }
        Command::Roster => {
            println!("{}", views::heading("Your Roster"));
            println!("{}", views::roster(&client.get_roster().await?));
        }
        Command::Teams => {
            println!("{}", views::heading("Your Teams"));
            for team in client.list_teams().await? {
                println!("{}", views::team(&team));
            }
        }
        Command::Battle(opts) => {
            game::show_battle_result(&client, &opts.battle_id(), opts.log.n_log_entries).await?;
        }
        Command::Play(_) => bail!("`play` is not a read-only command"),
    }
    Ok(())
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Finished(_) => {
            println!("\n  GG! Tweak the options to build your own strategy.");
            println!("  Docs: https://apicombat.com/api-docs/v1");
        }
        Outcome::EmptyRoster => {
            println!("\nNo units in roster. Buy some from the shop first!");
        }
        Outcome::QueueRejected(error) => {
            println!(
                "\nCould not queue ({}). You may have hit the daily battle limit.",
                error.status,
            );
        }
        Outcome::TimedOut => {
            println!("\nThe battle is still running, check it later with the `battle` command.");
        }
    }
}
