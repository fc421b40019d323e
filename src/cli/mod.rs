use crate::{
    config::PlannerConfig,
    services::{fallback::synthesize_fallback, prompt::select_variant},
    types::{result::PlanVariants, trip::TripRequest},
    Planner,
};
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{fs, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

fn command() -> Command {
    Command::new("trip-planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate a day-by-day travel itinerary from a trip request")
        .arg(
            Arg::new("request")
                .help("Path to the trip request JSON file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Completion model (or set PLANNER_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Completion API key (or set GROQ_API_KEY / OPENAI_API_KEY)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("OpenAI-compatible base URL (or set PLANNER_BASE_URL / OPENAI_BASE_URL)"),
        )
        .arg(
            Arg::new("attempts")
                .short('a')
                .long("attempts")
                .value_name("COUNT")
                .value_parser(clap::value_parser!(usize))
                .help("Completion attempts before falling back"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(u64))
                .help("Overall generation deadline in seconds"),
        )
        .arg(
            Arg::new("variant")
                .short('v')
                .long("variant")
                .value_name("NAME")
                .help("Budget variant to plan for, e.g. \"Smart Saver\""),
        )
        .arg(
            Arg::new("all-variants")
                .long("all-variants")
                .action(ArgAction::SetTrue)
                .conflicts_with("variant")
                .help("Generate one plan per variant of the budget level"),
        )
        .arg(
            Arg::new("json-mode")
                .long("json-mode")
                .action(ArgAction::SetTrue)
                .help("Request a JSON object response format from the provider"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .action(ArgAction::SetTrue)
                .help("Skip the model and print the default itinerary"),
        )
}

fn resolve_config(matches: &ArgMatches) -> anyhow::Result<PlannerConfig> {
    let mut config = PlannerConfig::from_env()?;

    if let Some(api_key) = matches.get_one::<String>("api-key") {
        config = config.with_api_key(api_key.clone());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model(model.clone());
    }
    if let Some(attempts) = matches.get_one::<usize>("attempts") {
        config = config.with_max_attempts(*attempts);
    }
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        config = config.with_total_timeout(Duration::from_secs(*seconds));
    }
    if matches.get_flag("json-mode") {
        config = config.with_json_mode(true);
    }

    Ok(config)
}

/// CLI entry point for the trip-planner binary
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = command().get_matches();

    let path = matches
        .get_one::<String>("request")
        .context("request path is required")?;
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let request: TripRequest =
        serde_json::from_str(&raw).with_context(|| format!("{path} is not a valid trip request"))?;
    request.validate()?;

    let variant = matches.get_one::<String>("variant").map(String::as_str);

    if matches.get_flag("offline") {
        let plan = synthesize_fallback(&request);
        let name = select_variant(request.budget, variant).name;
        info!(variant = name, days = plan.day_count(), "printing offline itinerary");
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let config = resolve_config(&matches)?;
    info!(model = %config.model, base_url = %config.base_url, "planning \"{}\"", request.title);
    let planner = Planner::from_config(config)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing with the default itinerary");
            ctrl_c.cancel();
        }
    });

    if matches.get_flag("all-variants") {
        let variants: PlanVariants = planner.generate_all_variants(&request, &cancel).await?;
        println!("{}", serde_json::to_string_pretty(&variants)?);
        return Ok(());
    }

    match planner.generate_with_cancel(&request, variant, &cancel).await {
        Ok(result) => {
            if result.is_fallback() {
                warn!("model output was unusable, returning the default itinerary");
            }
            eprintln!("{}", result.replay());
            println!("{}", serde_json::to_string_pretty(&result.plan)?);
            Ok(())
        }
        Err(e) => {
            error!("Itinerary generation failed: {}", e);
            Err(e.into())
        }
    }
}
