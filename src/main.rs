//! Terminal debug inspector over a live, ticking demo world.
//!
//! Every frame walks each component of the world through the inspector and
//! paints the recorded rows.  Folding, stepping and typed edits feed back
//! into the live objects on the next frame.

use std::fs::File;
use std::io::{self, stderr, Stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use debug_inspector::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState},
};
use debug_inspector::config::AppConfig;
use debug_inspector::ui::{
    layout::AppLayout, popup::HelpPopup, theme::Theme, widget::InspectorWidget,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Collapsible, editable debug views over a live object graph")]
struct Cli {
    /// Simulation step length in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Key foldout state by member name instead of draw order.
    #[arg(long)]
    structural_keys: bool,

    /// Forget foldout state of components not drawn for this many frames
    /// (0 keeps it forever).
    #[arg(long, value_name = "FRAMES")]
    evict_after: Option<u64>,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Start with the world paused; debug views stay hidden until played.
    #[arg(long)]
    paused: bool,

    /// Save the effective configuration (file plus flags) and exit.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// Command-line flags win over the config file.
    fn apply(&self, config: &mut AppConfig) {
        if self.structural_keys {
            config.structural_keys = true;
        }
        if let Some(frames) = self.evict_after {
            config.evict_after = (frames > 0).then_some(frames);
        }
    }
}

fn init_logging(log: Option<&PathBuf>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // stderr is also the drawing surface; only noisy under RUST_LOG
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());

    let block = Block::default()
        .title(" Inspector ")
        .title_style(Theme::title_style())
        .title_bottom(Line::from(format!(" {} ", state.status_summary())).right_aligned())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    state.list_area = block.inner(layout.inspector_area);

    let widget = InspectorWidget::new(state.surface.rows()).block(block);
    frame.render_stateful_widget(widget, layout.inspector_area, &mut state.view);

    let [badge_area, status_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(10), Constraint::Min(1)])
        .areas(layout.status_area);

    let badge = if state.host.playing {
        Paragraph::new(" PLAYING ").style(Theme::status_bar_style())
    } else {
        Paragraph::new(" PAUSED ").style(Theme::paused_style())
    };
    frame.render_widget(badge, badge_area);

    let status = match &state.editor {
        Some(editor) => Paragraph::new(Line::from(vec![
            Span::raw(format!(" {}: ", editor.label)),
            Span::styled(format!("{}▏", editor.buffer), Theme::editor_style()),
        ])),
        None => {
            let hint = state.config.status_bar_hint();
            Paragraph::new(format!(" {}", state.status_message.as_deref().unwrap_or(&hint)))
        }
    };
    frame.render_widget(status.style(Theme::status_bar_style()), status_area);

    if state.active_view == ActiveView::Help {
        frame.render_widget(HelpPopup { config: &state.config }, frame.area());
    }
}

// ───────────────────────────────────────── main ─────────────

async fn run(terminal: &mut Terminal<CrosstermBackend<Stderr>>, state: &mut AppState, tick: Duration) -> Result<()> {
    let mut events = spawn_event_reader(tick);

    loop {
        state.inspect();
        terminal.draw(|frame| draw(frame, state))?;

        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Key(k) => handler::handle_key(state, k),
            AppEvent::Mouse(m) => handler::handle_mouse(state, m),
            AppEvent::Resize(_, _) => {}
            AppEvent::Tick => state.tick(),
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_ref())?;

    let mut config = AppConfig::load();
    cli.apply(&mut config);
    if cli.write_config {
        let path = config.save()?;
        println!("wrote {}", path.display());
        return Ok(());
    }
    let settings = config.session_settings();
    info!(?settings, paused = cli.paused, "starting inspector");

    let mut state = AppState::new(config, settings, !cli.paused);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stderr()))?;

    let result = run(&mut terminal, &mut state, Duration::from_millis(cli.tick_ms.max(1))).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    info!(ticks = state.world.ticks(), "inspector closed");
    result
}
