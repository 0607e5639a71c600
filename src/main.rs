//! pushstream demo
//!
//! Runs the demonstration scenarios against the library:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │   Sources    │───▶│  Operators   │───▶│   Recorder   │
//! │ array/future │    │ map/merge    │    │  (+ logs)    │
//! │ stream/event │    │              │    │              │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use futures::stream;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pushstream::{Error, EventBus, Notification, Observable, Recorder};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Scenario selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Array,
    Promise,
    Generator,
    Merge,
    Event,
    All,
}

/// pushstream - run the Observable demonstration scenarios
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to run
    #[arg(long, value_enum, env = "PUSHSTREAM_SCENARIO", default_value = "all")]
    scenario: Scenario,

    /// Delay before the promise scenario resolves, in milliseconds
    #[arg(long, env = "PUSHSTREAM_PROMISE_DELAY_MS", default_value = "1000")]
    promise_delay_ms: u64,

    /// Interval between generator values, in milliseconds
    #[arg(long, env = "PUSHSTREAM_GENERATOR_INTERVAL_MS", default_value = "500")]
    generator_interval_ms: u64,

    /// How long to keep async scenarios subscribed, in milliseconds
    #[arg(long, env = "PUSHSTREAM_RUN_FOR_MS", default_value = "5000")]
    run_for_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Configuration
// =============================================================================

/// Validated demo settings.
#[derive(Debug, Clone)]
struct DemoConfig {
    scenario: Scenario,
    promise_delay: Duration,
    generator_interval: Duration,
    run_for: Duration,
    json_summary: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::All,
            promise_delay: Duration::from_millis(1000),
            generator_interval: Duration::from_millis(500),
            run_for: Duration::from_millis(5000),
            json_summary: false,
        }
    }
}

impl<'a> TryFrom<&'a Args> for DemoConfig {
    type Error = Error;

    fn try_from(args: &'a Args) -> Result<Self, Self::Error> {
        if args.generator_interval_ms == 0 {
            return Err(Error::Config(
                "generator interval must be greater than zero".to_string(),
            ));
        }
        if args.run_for_ms == 0 {
            return Err(Error::Config(
                "run duration must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            scenario: args.scenario,
            promise_delay: Duration::from_millis(args.promise_delay_ms),
            generator_interval: Duration::from_millis(args.generator_interval_ms),
            run_for: Duration::from_millis(args.run_for_ms),
            json_summary: args.log_json,
        })
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = DemoConfig::try_from(&args).context("invalid arguments")?;

    info!("Starting pushstream demo");
    info!("  Scenario: {:?}", config.scenario);
    info!("  Promise delay: {:?}", config.promise_delay);
    info!("  Generator interval: {:?}", config.generator_interval);
    info!("  Run for: {:?}", config.run_for);

    let run_all = config.scenario == Scenario::All;

    if run_all || config.scenario == Scenario::Array {
        run_array(&config)?;
    }
    if run_all || config.scenario == Scenario::Merge {
        run_merge(&config)?;
    }
    if run_all || config.scenario == Scenario::Event {
        run_event(&config)?;
    }
    if run_all || config.scenario == Scenario::Promise {
        run_promise(&config).await?;
    }
    if run_all || config.scenario == Scenario::Generator {
        run_generator(&config).await?;
    }

    info!("Demo complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

// =============================================================================
// Scenarios
// =============================================================================

fn summarize<T>(name: &str, config: &DemoConfig, recorder: &Recorder<T>) -> anyhow::Result<()>
where
    T: Clone + Send + std::fmt::Debug + serde::Serialize + 'static,
{
    if config.json_summary {
        let notifications: Vec<Notification<T>> = recorder.notifications();
        let json = serde_json::to_string(&notifications)
            .with_context(|| format!("failed to serialize {name} summary"))?;
        info!(scenario = name, notifications = %json, "Scenario finished");
    } else {
        info!(
            scenario = name,
            values = ?recorder.values(),
            errors = recorder.errors().len(),
            completions = recorder.completions(),
            "Scenario finished"
        );
    }
    Ok(())
}

fn run_array(config: &DemoConfig) -> anyhow::Result<()> {
    let recorder = Recorder::new();
    Observable::from_vec(vec![1, 2, 3, 4])
        .map(|v| v * v)
        .subscribe(recorder.observer());
    summarize("array", config, &recorder)
}

fn run_merge(config: &DemoConfig) -> anyhow::Result<()> {
    let recorder = Recorder::new();
    Observable::from_vec(vec!["a", "b"])
        .merge_map(|prefix| Observable::from_iterable(1..=3).map(move |i| format!("{prefix}{i}")))
        .subscribe(recorder.observer());
    summarize("merge", config, &recorder)
}

fn run_event(config: &DemoConfig) -> anyhow::Result<()> {
    let bus = Arc::new(EventBus::<String>::new());
    let recorder = Recorder::new();
    let sub = Observable::from_event(Arc::clone(&bus), "click").subscribe(recorder.observer());

    bus.emit("click", "button-1".to_string());
    bus.emit("click", "button-2".to_string());
    sub.unsubscribe();
    bus.emit("click", "after-teardown".to_string());

    summarize("event", config, &recorder)
}

async fn run_promise(config: &DemoConfig) -> anyhow::Result<()> {
    let delay = config.promise_delay;
    let recorder = Recorder::new();
    let sub = Observable::from_future(async move {
        tokio::time::sleep(delay).await;
        Ok(22)
    })
    .subscribe(recorder.observer());

    if tokio::time::timeout(config.run_for, recorder.wait_for_complete())
        .await
        .is_err()
    {
        info!("Promise did not resolve within the run window");
    }
    sub.unsubscribe();
    summarize("promise", config, &recorder)
}

async fn run_generator(config: &DemoConfig) -> anyhow::Result<()> {
    let interval = config.generator_interval;
    let recorder = Recorder::new();
    let sub = Observable::from_stream(move || {
        stream::unfold(0u64, move |i| async move {
            tokio::time::sleep(interval).await;
            Some((Ok(i), i + 1))
        })
    })
    .subscribe(recorder.observer());

    tokio::time::sleep(config.run_for).await;
    sub.unsubscribe();
    summarize("generator", config, &recorder)
}
