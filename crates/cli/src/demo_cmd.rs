use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use savor_api::StorefrontClient;
use savor_engine::{DemoAuthenticator, DemoHost, DemoSession, EventSink, load_script_file, storefront_fixture};
use savor_store::{AuthStore, InMemoryAuthStore};
use savor_types::{DemoRole, DemoRunEvent, NotificationLevel, RunnerStatus, SPEED_PRESETS, script_for};
use savor_util::{UserPreferences, mask_token};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::parse_role;

pub async fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => list(),
        Some(("show", sub)) => show(sub),
        Some(("run", sub)) => play(sub).await,
        Some(("speed", sub)) => save_speed(sub),
        Some(("role", sub)) => save_role(sub),
        other => bail!("unsupported demo command: {:?}", other.map(|(name, _)| name)),
    }
}

fn preferences() -> UserPreferences {
    UserPreferences::new().unwrap_or_else(|error| {
        warn!(%error, "preferences unavailable; using defaults");
        UserPreferences::ephemeral()
    })
}

fn list() -> Result<()> {
    for role in [DemoRole::User, DemoRole::Admin] {
        let script = script_for(role);
        println!(
            "{:<6} {:<11} {:>2} steps, {:.1}s of scripted delays",
            role.as_str(),
            role.title(),
            script.len(),
            script.authored_delay_ms() as f64 / 1000.0
        );
    }
    Ok(())
}

fn show(matches: &ArgMatches) -> Result<()> {
    let role = parse_role(matches)?.unwrap_or_default();
    print!("{}", serde_yaml::to_string(&script_for(role))?);
    Ok(())
}

async fn play(matches: &ArgMatches) -> Result<()> {
    let preferences = preferences();
    let role = parse_role(matches)?.or_else(|| preferences.demo_role()).unwrap_or_default();
    let speed = matches
        .get_one::<f64>("speed")
        .copied()
        .or_else(|| preferences.demo_speed())
        .unwrap_or(1.0);
    let script = match matches.get_one::<PathBuf>("file") {
        Some(path) => load_script_file(path)?,
        None => script_for(role),
    };

    let page = Arc::new(storefront_fixture());
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let sink = Arc::new(EventSink::new(event_tx));
    let host = DemoHost::new(page.clone(), page.clone(), sink.clone(), sink);
    let auth = Arc::new(InMemoryAuthStore::new());
    let authenticator: Option<Arc<dyn DemoAuthenticator>> = if matches.get_flag("api") {
        let client = StorefrontClient::new_from_env()?.with_token_source(auth.clone());
        Some(Arc::new(client))
    } else {
        None
    };

    let session = DemoSession::new(host, auth.clone(), authenticator);
    session.change_speed(speed)?;
    let total = script.len();
    println!("Playing '{}' ({total} steps) at {speed}x. Press Ctrl-C to stop.", script.name);

    let mut cycle = session.start_with_script(role, script).await?;
    if let Some(token) = auth.snapshot().token {
        println!("Signed in as the {role} demo account (token {})", mask_token(&token));
    }

    loop {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event, total),
            result = &mut cycle => {
                result.context("demo playback task failed")?;
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupt received; stopping demo");
                session.stop_demo();
            }
        }
    }
    while let Ok(event) = events.try_recv() {
        print_event(&event, total);
    }

    let status = session.runner().map(|runner| runner.status()).unwrap_or_default();
    println!("Final route: {}", page.current_route());
    match status {
        RunnerStatus::Completed | RunnerStatus::Stopped => Ok(()),
        other => {
            let step = session.current_step().map(|current| current.index + 1).unwrap_or_default();
            bail!("demo {other} at step {step} of {total}")
        }
    }
}

fn print_event(event: &DemoRunEvent, total: usize) {
    match event {
        DemoRunEvent::StepStarted { index, label, .. } => println!("[{:>2}/{total}] {label}", index + 1),
        DemoRunEvent::Notified { notification } => match notification.level {
            NotificationLevel::Success => println!("        ok: {}", notification.message),
            NotificationLevel::Error => eprintln!("        error: {}", notification.message),
        },
        DemoRunEvent::Completed { .. } => println!("Demo complete"),
        DemoRunEvent::Stopped { .. } => println!("Demo stopped"),
    }
}

fn save_speed(matches: &ArgMatches) -> Result<()> {
    let speed = matches.get_one::<f64>("speed").copied().context("speed is required")?;
    let preferences = UserPreferences::new()?;
    preferences.set_demo_speed(speed)?;
    println!("Saved demo speed {speed}x to {}", preferences.path().display());
    if !SPEED_PRESETS.contains(&speed) {
        println!("Note: the playback controls offer {SPEED_PRESETS:?}");
    }
    Ok(())
}

fn save_role(matches: &ArgMatches) -> Result<()> {
    let role = parse_role(matches)?;
    let preferences = UserPreferences::new()?;
    preferences.set_demo_role(role)?;
    println!("Saved demo role {} to {}", role.unwrap_or_default(), preferences.path().display());
    Ok(())
}
