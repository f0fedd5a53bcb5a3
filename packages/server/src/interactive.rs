//! Guided server start-up.
//!
//! Fills in a [`ServerConfig`] from terminal prompts, seeded with whatever
//! the environment already provides, then serves it.

use dialoguer::{Confirm, Input};
use site_planner_setback_models::NullRolePolicy;

use crate::{ServerConfig, options_for, serve};

/// Prompts for the listen address, port, and classification strictness,
/// then starts the server once the summary is confirmed.
///
/// A prompt that cannot be answered (no terminal attached) keeps the value
/// read from the environment.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    let seed = ServerConfig::from_env();

    println!("Site planner API");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Listen on address")
        .default(seed.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| seed.bind_addr.clone());

    let port: String = Input::new()
        .with_prompt("Listen on port")
        .default(seed.port.to_string())
        .validate_with(|input: &String| validate_port(input))
        .interact_text()
        .unwrap_or_else(|_| seed.port.to_string());

    let seeded_strict = seed.options.null_role_policy == NullRolePolicy::Reject;
    let strict = Confirm::new()
        .with_prompt("Treat unclassified edges as an error instead of a side?")
        .default(seeded_strict)
        .interact()
        .unwrap_or(seeded_strict);

    let config = ServerConfig {
        bind_addr,
        port: port.trim().parse().unwrap_or(seed.port),
        options: options_for(strict),
    };

    let go = Confirm::new()
        .with_prompt(summary(&config))
        .default(true)
        .interact()
        .unwrap_or(true);
    if !go {
        println!("Not started.");
        return Ok(());
    }

    serve(config).await
}

fn validate_port(input: &str) -> Result<(), &'static str> {
    match input.trim().parse::<u16>() {
        Ok(0) => Err("port 0 would pick a random port"),
        Ok(_) => Ok(()),
        Err(_) => Err("expected a number from 1 to 65535"),
    }
}

fn summary(config: &ServerConfig) -> String {
    let mode = match config.options.null_role_policy {
        NullRolePolicy::Reject => "strict",
        NullRolePolicy::DefaultToSide => "lenient",
    };
    format!(
        "Serve on http://{}:{}/api ({mode} classification)?",
        config.bind_addr, config.port
    )
}
