use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use serde::Serialize;
use skycast_core::{
    Config, CredentialStore, VisualCrossingProvider, WeatherAggregator,
    provider::provider_from_config,
    response::{self, ErrorResponse, MessageBody, WeekAverageBody},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City forecasts and user accounts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weather provider API key and other settings.
    Configure {
        /// API key; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,

        /// Unit group passed upstream: us, metric, uk or base.
        #[arg(long)]
        unit_group: Option<String>,

        /// Upstream timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// SQLite file for user accounts.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },

    /// Report service health.
    Health,

    /// Full normalized forecast for a city.
    Forecast { city: String },

    /// Current conditions for a city.
    Current { city: String },

    /// Average temperature over the forecast days.
    WeekAverage { city: String },

    /// Day with the highest maximum temperature.
    MaxTempDay { city: String },

    /// Day with the lowest minimum temperature.
    MinTempDay { city: String },

    /// Day with the highest precipitation probability.
    HighestPrecipDay { city: String },

    /// Manage user accounts.
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create a new account.
    Create {
        username: String,
        /// Prompted for when absent.
        #[arg(long)]
        password: Option<String>,
    },

    /// Check a username and password.
    Login {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// Change the password of an existing account.
    UpdatePassword {
        username: String,
        #[arg(long)]
        old_password: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure { api_key, unit_group, timeout_secs, db_path } => {
                let api_key = match api_key {
                    Some(key) => key,
                    None => Password::new("Visual Crossing API key:")
                        .with_display_mode(PasswordDisplayMode::Masked)
                        .without_confirmation()
                        .prompt()
                        .context("Failed to read API key")?,
                };

                config.set_api_key(api_key);
                if let Some(unit_group) = unit_group {
                    config.unit_group = unit_group;
                }
                if let Some(timeout_secs) = timeout_secs {
                    config.timeout_secs = timeout_secs;
                }
                if db_path.is_some() {
                    config.db_path = db_path;
                }
                config.save()?;

                eprintln!("Saved configuration to {}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
            Command::Health => respond::<_, skycast_core::WeatherError>(Ok(response::health())),
            Command::Forecast { city } => respond(aggregator(&config)?.get_forecast(&city).await),
            Command::Current { city } => {
                respond(aggregator(&config)?.get_current_conditions(&city).await)
            }
            Command::WeekAverage { city } => respond(
                aggregator(&config)?
                    .get_weekly_average(&city)
                    .await
                    .map(|week_average_temp| WeekAverageBody { week_average_temp }),
            ),
            Command::MaxTempDay { city } => respond(aggregator(&config)?.get_max_temp_day(&city).await),
            Command::MinTempDay { city } => respond(aggregator(&config)?.get_min_temp_day(&city).await),
            Command::HighestPrecipDay { city } => {
                respond(aggregator(&config)?.get_highest_precip_day(&city).await)
            }
            Command::Account { command } => {
                let store = CredentialStore::open(config.db_path()?)
                    .context("Failed to open the user database")?;
                run_account(&store, command)
            }
        }
    }
}

fn run_account(store: &CredentialStore, command: AccountCommand) -> anyhow::Result<ExitCode> {
    match command {
        AccountCommand::Create { username, password } => {
            let password = password_or_prompt(password, "Password:", true)?;
            respond(
                store
                    .create_account(&username, &password)
                    .map(|()| MessageBody::new(response::ACCOUNT_CREATED)),
            )
        }
        AccountCommand::Login { username, password } => {
            let password = password_or_prompt(password, "Password:", false)?;
            respond(
                store
                    .login(&username, &password)
                    .map(|()| MessageBody::new(response::LOGIN_SUCCESSFUL)),
            )
        }
        AccountCommand::UpdatePassword { username, old_password, new_password } => {
            let old_password = password_or_prompt(old_password, "Current password:", false)?;
            let new_password = password_or_prompt(new_password, "New password:", true)?;
            respond(
                store
                    .update_password(&username, &old_password, &new_password)
                    .map(|()| MessageBody::new(response::PASSWORD_UPDATED)),
            )
        }
    }
}

fn aggregator(config: &Config) -> anyhow::Result<WeatherAggregator<VisualCrossingProvider>> {
    let provider = provider_from_config(config)?;
    Ok(WeatherAggregator::new(provider, config.timeout()))
}

fn password_or_prompt(value: Option<String>, prompt: &str, confirm: bool) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    let mut input = Password::new(prompt).with_display_mode(PasswordDisplayMode::Masked);
    if !confirm {
        input = input.without_confirmation();
    }
    input.prompt().context("Failed to read password")
}

/// Print the success body or the error body as JSON on stdout.
fn respond<T, E>(result: Result<T, E>) -> anyhow::Result<ExitCode>
where
    T: Serialize,
    E: ErrorResponse,
{
    match result {
        Ok(body) => {
            print_json(&body)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(kind = err.kind(), status = err.status_code(), "request failed");
            print_json(&err.body())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json<T: Serialize>(body: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(body).context("Failed to serialize response")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_weather_commands() {
        let cli = Cli::try_parse_from(["skycast", "max-temp-day", "Boston"]).unwrap();
        assert!(matches!(cli.command, Command::MaxTempDay { ref city } if city == "Boston"));

        let cli = Cli::try_parse_from(["skycast", "week-average", "New York"]).unwrap();
        assert!(matches!(cli.command, Command::WeekAverage { ref city } if city == "New York"));
    }

    #[test]
    fn parses_account_commands() {
        let cli = Cli::try_parse_from([
            "skycast",
            "account",
            "update-password",
            "alice",
            "--old-password",
            "a",
            "--new-password",
            "b",
        ])
        .unwrap();

        match cli.command {
            Command::Account {
                command: AccountCommand::UpdatePassword { username, old_password, new_password },
            } => {
                assert_eq!(username, "alice");
                assert_eq!(old_password.as_deref(), Some("a"));
                assert_eq!(new_password.as_deref(), Some("b"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explicit_password_skips_prompt() {
        let pw = password_or_prompt(Some("given".into()), "Password:", true).unwrap();
        assert_eq!(pw, "given");
    }

    #[test]
    fn account_flow_through_store() {
        let store = CredentialStore::in_memory().unwrap();

        let code = run_account(
            &store,
            AccountCommand::Create { username: "alice".into(), password: Some("pw".into()) },
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let code = run_account(
            &store,
            AccountCommand::Login { username: "alice".into(), password: Some("wrong".into()) },
        )
        .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }
}
