use std::fmt;

use anyhow::Context;
use clap::{Parser, Subcommand};
use countries_core::{Config, Country, MatchView, Pipeline, config::API_KEY_ENV};
use inquire::{InquireError, Password, Select, Text};

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "countries", version, about = "Find countries and their capital's weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Search once and print the result.
    Search {
        /// Part of a country's common name, any case.
        query: String,

        /// Alpha-3 code of a listed country to show, e.g. "CHE".
        #[arg(long)]
        show: Option<String>,
    },

    /// Search as you type, picking countries from the list.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query, show } => {
                let mut pipeline = pipeline()?;
                pipeline.search(query.as_str()).await;
                if let Some(code) = show {
                    let code = code.to_uppercase();
                    let session = pipeline.show(code.as_str()).await;
                    if !is_shown(session.selected(), &code) {
                        eprintln!("{code} is not among the matches for \"{query}\"");
                    }
                }
                print!("{}", render(&pipeline.session().view()));
                Ok(())
            }
            Command::Interactive => interactive(pipeline()?).await,
        }
    }
}

fn is_shown(selected: Option<&Country>, code: &str) -> bool {
    selected.is_some_and(|c| c.alpha3_code == code)
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?.with_env_overrides();
    if config.weather_api_key.is_none() {
        tracing::warn!(
            "no weather API key configured; set {API_KEY_ENV} or run `countries configure`"
        );
    }
    Ok(config)
}

fn pipeline() -> anyhow::Result<Pipeline> {
    Pipeline::from_config(&load_config()?)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// One row of the "show" picker.
enum Choice {
    Show { name: String, code: String },
    SearchAgain,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Show { name, .. } => write!(f, "show {name}"),
            Choice::SearchAgain => f.write_str("search again"),
        }
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

async fn interactive(mut pipeline: Pipeline) -> anyhow::Result<()> {
    let mut last = String::new();

    loop {
        let query = match Text::new("find countries").with_initial_value(&last).prompt() {
            Ok(query) => query,
            Err(err) if is_cancel(&err) => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        let session = pipeline.search(query.as_str()).await;
        print!("{}", render(&session.view()));
        last = query;

        loop {
            let Some(choices) = session_choices(&pipeline) else {
                break;
            };

            match Select::new("show which?", choices).prompt() {
                Ok(Choice::Show { code, .. }) => {
                    let session = pipeline.show(code).await;
                    println!();
                    print!("{}", render(&session.view()));
                }
                Ok(Choice::SearchAgain) => break,
                Err(err) if is_cancel(&err) => return Ok(()),
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn session_choices(pipeline: &Pipeline) -> Option<Vec<Choice>> {
    let MatchView::Listing(countries) = pipeline.session().view().matches else {
        return None;
    };

    let mut choices: Vec<_> = countries
        .iter()
        .map(|c| Choice::Show {
            name: c.common_name.clone(),
            code: c.alpha3_code.clone(),
        })
        .collect();
    choices.push(Choice::SearchAgain);
    Some(choices)
}
