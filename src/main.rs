//! Registry validation binary.
//!
//! Loads the configured known-issue registry and reports how a failure
//! description would be classified.

mod cli;

use std::{error::Error, process::ExitCode};

use clap::Parser;
use tracing::error;
use vividus_status::{
    assertion::{AssertionError, SoftAssertionError},
    config::SoftAssertConfig,
    event::AssertionFailedEvent,
    formatter::AssertionFormatter,
    session::{SessionId, TestInfo},
    status::Status,
};

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "known issue registry check failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => SoftAssertConfig::from_path(path)?,
        None => SoftAssertConfig::default(),
    };
    if let Some(registry) = &cli.registry {
        config = config.with_known_issues_path(registry);
    }
    for (name, value) in &cli.properties {
        config = config.with_property(name, value);
    }

    let checker = config.known_issue_checker()?;
    println!("{} known issue(s) loaded", checker.registry().len());

    let Some(failure) = &cli.failure else {
        return Ok(());
    };
    let mut info = TestInfo::default();
    info.set_story(cli.story.clone());
    info.set_scenario(cli.scenario.clone());
    info.set_step(cli.step.clone());

    let issue = checker.known_issue(failure, &info);
    if let Some(issue) = &issue {
        println!("{}", AssertionFormatter.message(failure, issue));
    } else {
        println!("no known issue matches");
    }
    let event = AssertionFailedEvent::new(
        SessionId::next(),
        SoftAssertionError::new(AssertionError::new(failure.as_str()), issue),
    );
    println!("status: {}", Status::from_event(&event));
    Ok(())
}
