//! Terminal front end for Chronicles of the Echoes.
//!
//! A thin presentation shell over the client runtime. It loads the game
//! from the server, redraws the screen whenever the store's snapshot is
//! replaced, and turns typed commands into dispatched intents.
//!
//! # Architecture
//!
//! ```text
//! stdin --> Command --> Dispatcher (one task per intent) --> StateStore
//!                                                               |
//!                                         renderer task <-------+
//! ```
//!
//! Intents run concurrently: typing a second command while the first is in
//! flight sends both, and the screen shows whichever answer lands last.

mod command;
mod render;

use std::io::Write as _;

use anyhow::Context as _;
use echoes_client::{
    ClientConfig, DispatchOutcome, Dispatcher, GameClient, LoadStatus, RESET_PROMPT, StateStore,
    StoreView, Telemetry,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::command::{Command, CommandError, HELP, is_yes};
use crate::render::Screen;

type Input = Lines<BufReader<Stdin>>;

/// Application entry point.
///
/// Loads configuration, wires logging and telemetry, bootstraps the
/// snapshot, then reads commands until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if configuration is invalid or stdin fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let http = config.http_client()?;
    let client = GameClient::with_http(http.clone(), config.api_url.clone());

    let telemetry = if config.telemetry_enabled {
        Telemetry::start(http, client.endpoint("/log"))
    } else {
        Telemetry::disabled()
    };

    // Logs go to stderr so they never interleave with the screen.
    let json_logs = std::env::var("ECHOES_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
        }))
        .with(telemetry.layer())
        .init();
    telemetry.install_panic_hook()?;

    info!(
        api_url = config.api_url,
        request_timeout_ms = config.request_timeout.as_millis(),
        telemetry_enabled = config.telemetry_enabled,
        "echoes-terminal starting"
    );

    let store = StateStore::new();
    let renderer = telemetry.supervise("renderer", render_loop(store.subscribe()));
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if bootstrap(&store, &client, &mut input).await? {
        println!("{HELP}");
        let dispatcher = Dispatcher::new(client, store);
        command_loop(&dispatcher, &mut input).await?;
    }

    renderer.abort();
    info!("echoes-terminal stopped");
    Ok(())
}

/// Load the first snapshot, offering a retry after each failure.
///
/// Returns `false` if the user gave up.
async fn bootstrap(
    store: &StateStore,
    client: &GameClient,
    input: &mut Input,
) -> anyhow::Result<bool> {
    loop {
        if store.load(client).await.is_ok() {
            return Ok(true);
        }
        match input.next_line().await.context("failed to read stdin")? {
            Some(line) if matches!(line.parse::<Command>(), Ok(Command::Quit)) => return Ok(false),
            Some(_) => {}
            None => return Ok(false),
        }
    }
}

/// Read commands until `quit` or end of input.
async fn command_loop(dispatcher: &Dispatcher, input: &mut Input) -> anyhow::Result<()> {
    while let Some(line) = input.next_line().await.context("failed to read stdin")? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let d = dispatcher.clone();
        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Reset => {
                println!("{RESET_PROMPT} [y/N]");
                let confirmed = input
                    .next_line()
                    .await
                    .context("failed to read confirmation")?
                    .is_some_and(|a| is_yes(&a));
                spawn_intent("reset", async move { d.reset(move |_: &str| confirmed).await });
            }
            Command::Choose(index) => spawn_intent("choose", async move { d.choose(index).await }),
            Command::Allocate(stat) => {
                spawn_intent("allocate", async move { d.allocate(stat).await });
            }
            Command::Combat(action) => spawn_intent("combat", async move { d.combat(action).await }),
            Command::Equip(index) => spawn_intent("equip", async move { d.equip(index).await }),
            Command::DebugCombat => spawn_intent("debug", async move { d.debug_combat().await }),
        }
    }
    Ok(())
}

/// Run one intent on its own task. Failures were already reported by the
/// dispatcher; the outcome is only traced.
fn spawn_intent<F>(intent: &'static str, future: F)
where
    F: Future<Output = DispatchOutcome> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = future.await;
        debug!(intent, ?outcome, "intent settled");
    });
}

/// Redraw on every store transition until the store is dropped.
async fn render_loop(mut views: watch::Receiver<StoreView>) -> std::io::Result<()> {
    loop {
        let (screen, prompt) = {
            let view = views.borrow_and_update();
            (Screen(&view).to_string(), view.status == LoadStatus::Ready)
        };
        draw(&screen, prompt)?;
        if views.changed().await.is_err() {
            return Ok(());
        }
    }
}

fn draw(screen: &str, prompt: bool) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out)?;
    out.write_all(screen.as_bytes())?;
    if prompt {
        out.write_all(b"> ")?;
    }
    out.flush()
}
