//! Call Simulator Entry Point

use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use call_sim_agent::{CallController, CallHandle, CallSession, ControllerConfig};
use call_sim_config::{load_settings, Settings};
use call_sim_core::{Error, Result, Scenario, SystemClock};
use call_sim_pipeline::{ConsoleBackend, Speaker};

mod commands;
mod render;

use commands::{Command, HELP};

/// Scripted voice-call simulator
#[derive(Parser, Debug)]
#[command(name = "call-sim", version, about)]
struct Args {
    /// Config environment (loads config/{env}.yaml)
    #[arg(long, env = "CALL_SIM_ENV")]
    env: Option<String>,

    /// Customer name
    #[arg(long)]
    customer: Option<String>,

    /// Company name
    #[arg(long)]
    company: Option<String>,

    /// Call goal
    #[arg(long)]
    goal: Option<String>,

    /// Type customer replies instead of auto-pilot
    #[arg(long)]
    manual: bool,

    /// Speak agent lines
    #[arg(long)]
    voice: bool,

    /// Seed for conversational pacing
    #[arg(long)]
    seed: Option<u64>,

    /// Launch the call immediately
    #[arg(long)]
    start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(args.env.as_deref())?;
    apply_overrides(&mut settings, &args);

    init_tracing(&settings);
    tracing::info!("Starting call simulator v{}", env!("CARGO_PKG_VERSION"));

    let session = CallSession::new(settings.scenario.clone(), settings.pacing.clone())
        .with_auto_pilot(settings.session.auto_pilot)
        .with_voice(settings.session.voice_enabled);

    let speaker = Speaker::new(Arc::new(ConsoleBackend::new(settings.speech.words_per_minute)));
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (handle, task) = CallController::spawn(
        session,
        Arc::new(speaker),
        Arc::new(SystemClock),
        rng,
        ControllerConfig {
            event_capacity: settings.session.event_capacity,
            ..Default::default()
        },
    );

    let mut events = handle.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = render::render_event(&event) {
                        println!("{}", line);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("event printer lagged by {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!("{}", render::render_status(&handle.snapshot()));
    println!("{}", HELP);

    if args.start {
        handle.start()?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !dispatch(&handle, Command::parse(&line))? {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    handle.shutdown();
    task.await
        .map_err(|e| Error::Other(format!("controller task failed: {}", e)))?;
    printer.abort();

    tracing::info!("Call simulator stopped");
    Ok(())
}

/// Apply one command; returns false to quit
fn dispatch(handle: &CallHandle, command: Command) -> Result<bool> {
    match command {
        Command::Start => handle.start()?,
        Command::WrapUp => handle.wrap_up()?,
        Command::HangUp => handle.hang_up()?,
        Command::Reset => handle.reset()?,
        Command::ToggleVoice => {
            let enabled = !handle.snapshot().voice_enabled;
            handle.set_voice(enabled)?;
            println!("* voice {}", if enabled { "on" } else { "off" });
        }
        Command::ToggleAutoPilot => {
            let enabled = !handle.snapshot().auto_pilot;
            handle.set_auto_pilot(enabled)?;
            println!("* auto-pilot {}", if enabled { "on" } else { "off" });
        }
        Command::SetCustomer(name) => edit_scenario(handle, |s| s.customer_name = name)?,
        Command::SetCompany(name) => edit_scenario(handle, |s| s.company_name = name)?,
        Command::SetGoal(goal) => edit_scenario(handle, |s| s.goal = goal)?,
        Command::Status => println!("{}", render::render_status(&handle.snapshot())),
        Command::Highlights => println!("{}", render::render_highlights(&handle.snapshot())),
        Command::Export => {
            let json = serde_json::to_string_pretty(&handle.snapshot().transcript)?;
            println!("{}", json);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
        Command::Reply(text) => {
            let snapshot = handle.snapshot();
            if snapshot.awaiting_response {
                handle.reply(text)?;
            } else {
                println!("* not waiting for a reply (auto-pilot {})", if snapshot.auto_pilot { "on" } else { "off" });
            }
        }
        Command::Empty => {}
        Command::Unknown(line) => println!("* unknown command: {} (try /help)", line),
    }
    Ok(true)
}

fn edit_scenario(
    handle: &CallHandle,
    edit: impl FnOnce(&mut Scenario),
) -> Result<()> {
    let mut scenario = handle.snapshot().scenario;
    edit(&mut scenario);
    println!(
        "* next call: {} at {} ({})",
        scenario.customer_name, scenario.company_name, scenario.goal
    );
    handle.update_scenario(scenario)?;
    Ok(())
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(customer) = &args.customer {
        settings.scenario.customer_name = customer.clone();
    }
    if let Some(company) = &args.company {
        settings.scenario.company_name = company.clone();
    }
    if let Some(goal) = &args.goal {
        settings.scenario.goal = goal.clone();
    }
    if args.manual {
        settings.session.auto_pilot = false;
    }
    if args.voice {
        settings.session.voice_enabled = true;
    }
}

/// Initialize tracing on stderr so it does not interleave with the transcript
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("call_sim={},call_sim::speech=info", level).into()
    });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_sim_config::PacingConfig;
    use call_sim_pipeline::RecordingSpeech;

    fn spawn() -> (CallHandle, tokio::task::JoinHandle<()>) {
        CallController::spawn(
            CallSession::new(Scenario::default(), PacingConfig::default()),
            Arc::new(RecordingSpeech::new()),
            Arc::new(SystemClock),
            StdRng::seed_from_u64(1),
            ControllerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_dispatch_quit_and_status() {
        let (handle, _task) = spawn();
        assert!(dispatch(&handle, Command::Status).unwrap());
        assert!(dispatch(&handle, Command::Export).unwrap());
        assert!(!dispatch(&handle, Command::Quit).unwrap());
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_is_session_error() {
        let (handle, task) = spawn();
        handle.shutdown();
        task.await.unwrap();

        let err = dispatch(&handle, Command::Start).unwrap_err();
        assert!(matches!(err, Error::Session(_)));

        let err = dispatch(&handle, Command::SetCustomer("Sam".into())).unwrap_err();
        assert!(matches!(err, Error::Session(_)));
    }
}
