//! Terminal event abstraction.
//!
//! Input is read on a blocking thread and simulation ticks come from a
//! tokio interval; both feed one channel so the main loop can `select!` on it.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;
use tracing::warn;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// One simulation step elapsed.
    Tick,
}

/// How long the reader blocks in `poll` before checking whether the
/// receiver is gone.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spawn the input reader and the tick timer.  Ticks fire at a steady
/// `tick_rate` regardless of how much input arrives.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
        if input_tx.is_closed() {
            break;
        }
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => {
                warn!(%err, "terminal poll failed");
                break;
            }
        }
        let app_event = match event::read() {
            // Windows reports key releases too
            Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => AppEvent::Key(k),
            Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
            Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
            Ok(_) => continue,
            Err(err) => {
                warn!(%err, "terminal read failed");
                break;
            }
        };
        if input_tx.send(app_event).is_err() {
            break;
        }
    });

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_rate);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    rx
}
