mod app;
mod config;
mod logging;
mod ui;

use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::*;
use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use naive::dom::Node;
use naive::router::{History, MemoryHistory, Router};
use naive::{RouteRequest, Runtime, Store};
use ratatui::prelude::*;
use serde_json::Value;
use std::io;
use std::rc::Rc;
use tokio::sync::mpsc;
use tracing::{info, warn};

// Components, the store and the router are single-threaded.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Load config
    let cfg = config::load_config()?;
    let log_path = logging::init(&cfg.logging)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, cfg, log_path).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
    log_path: Option<std::path::PathBuf>,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    // Runtime wiring
    let store = Rc::new(Store::new());
    store.initialise(cfg.store.initial.clone())?;
    let alert = Rc::new(ShellAlert::default());
    let runtime = Runtime::builder(cfg.build_loader()?)
        .store(store.clone())
        .alert(alert.clone())
        .build();

    let mount = Node::element("div").with_attr("id", &cfg.runtime.mount);
    let history = Rc::new(
        MemoryHistory::new(&cfg.runtime.start_url)
            .with_context(|| format!("Invalid start url '{}'", cfg.runtime.start_url))?,
    );

    let mut state = AppState::new(cfg.clone(), mount.clone(), store, alert);
    state.system_message("naive component shell. /help lists commands.");
    if let Some(path) = log_path {
        state.system_message(format!("Logging to {}", path.display()));
    }

    let router = Router::new(
        runtime,
        mount,
        cfg.route_table(),
        cfg.router.clone(),
        history.clone(),
    )
    .await?;
    refresh_location(&mut state, &router, &history);
    state.navigation_message(format!("Opened {}", state.location));

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if term_tx.send(AppEvent::Terminal(event)).is_err() {
                break;
            }
        }
    });

    // Spawn tick task (20 FPS = 50ms)
    let tick_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(50));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    // Initial render
    terminal.draw(|f| ui::render(f, &state))?;

    // Main event loop
    loop {
        let event = event_rx.recv().await;
        let Some(event) = event else { break };

        let actions = handler::handle_event(&mut state, event);

        for action in actions {
            perform(&mut state, &router, &history, action).await;
        }

        if state.should_quit {
            router.unload();
            break;
        }

        // Conditional render (only if dirty)
        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }
    }

    Ok(())
}

async fn perform(state: &mut AppState, router: &Router, history: &MemoryHistory, action: Action) {
    let outcome = match action {
        Action::Navigate { route, query } => {
            // An empty route falls back to the default route
            let mut request = RouteRequest::from(Some(route.as_str()).filter(|r| !r.is_empty()));
            if let Some(query) = query {
                request = request.with_query(&query);
            }
            router.to(request, Value::Null).await.map(Some)
        }
        Action::Home => router.home().await.map(Some),
        Action::Back => match history.back() {
            Some(pop) => router.handle_navigation(pop.state).await.map(Some),
            None => {
                state.flash("No earlier entry");
                Ok(None)
            }
        },
        Action::Forward => match history.forward() {
            Some(pop) => router.handle_navigation(pop.state).await.map(Some),
            None => {
                state.flash("No later entry");
                Ok(None)
            }
        },
        Action::Reload => router.handle_navigation(history.current()).await.map(Some),
        Action::Restrict => {
            router.restrict();
            state.system_message("Restricted components dropped.");
            Ok(None)
        }
        Action::Preload { names } => {
            router.preload(&names).await;
            let cached = names
                .iter()
                .filter(|name| router.doorman().runtime().registry().contains(name))
                .count();
            state.flash(format!("Preloaded {cached}/{} components", names.len()));
            Ok(None)
        }
        Action::SetState { key, value } => {
            let result = state.store.set(&key, value);
            if result.is_ok() {
                state.system_message(format!("{key} updated"));
            }
            result.map(|_| None)
        }
        Action::UnsetState { key } => {
            state.store.remove(&key);
            state.system_message(format!("{key} removed"));
            Ok(None)
        }
        Action::AnswerAlert { confirmed } => {
            if let Some(view) = state.alert.take() {
                match view.action {
                    Some(action) if confirmed => action.press(),
                    _ => view.close.press(),
                }
            }
            Ok(None)
        }
        Action::Quit => {
            state.should_quit = true;
            Ok(None)
        }
    };

    match outcome {
        Ok(Some(interface)) => {
            refresh_location(state, router, history);
            info!(location = %state.location, "page loaded");
            let mut line = format!("Loaded {}", state.location);
            if !interface.is_null() {
                line.push_str(&format!("  {interface}"));
            }
            state.navigation_message(line);
        }
        Ok(None) => refresh_location(state, router, history),
        Err(e) => {
            warn!(error = %e, "action failed");
            refresh_location(state, router, history);
            state.error_message(e.to_string());
        }
    }
    state.dirty = true;
}

fn refresh_location(state: &mut AppState, router: &Router, history: &MemoryHistory) {
    state.location = history.location().to_string();
    state.component = router.doorman().current();
    state.can_go_back = history.can_go_back();
    state.can_go_forward = history.can_go_forward();
}
