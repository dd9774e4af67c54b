//! The input loop: terminal events in, actions out.
//!
//! Any `Stream` of crossterm events drives the loop, so tests can script a
//! session while the binary feeds it crossterm's `EventStream`.

pub mod action;
pub mod keymap;

pub use action::Action;
pub use keymap::{KeyCombo, Keymap};

use crate::hub::{DrawRequest, StatusMessage};
use crate::session::{Session, EXIT_CANCELLED};
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use futures::{Stream, StreamExt};
use std::io;
use std::sync::Arc;

/// What the loop should do after handling an event.
enum HandlerOutcome {
    Continue,
    Stop,
}

async fn handle_key(session: &Session, keymap: &Keymap, key: KeyEvent) -> HandlerOutcome {
    if key.kind == KeyEventKind::Release {
        return HandlerOutcome::Continue;
    }
    let Some(action) = keymap.resolve(&key) else {
        log::trace!("unbound key {:?}", key);
        return HandlerOutcome::Continue;
    };

    log::trace!("action {action}");
    match action.execute(session).await {
        Ok(()) => HandlerOutcome::Continue,
        Err(err) if err.is_stopped() => HandlerOutcome::Stop,
        Err(err) => {
            log::warn!("{action} failed: {err}");
            session
                .hub()
                .try_send_status(StatusMessage::new(format!("{action} failed: {err}")));
            HandlerOutcome::Continue
        }
    }
}

async fn handle_event(
    session: &Session,
    keymap: &Keymap,
    event: Option<io::Result<Event>>,
) -> HandlerOutcome {
    match event {
        Some(Ok(Event::Key(key))) => handle_key(session, keymap, key).await,
        Some(Ok(Event::Resize(cols, rows))) => {
            log::debug!("terminal resized to {cols}x{rows}");
            match session.hub().send_draw(DrawRequest::Redraw).await {
                Ok(()) => HandlerOutcome::Continue,
                Err(_) => HandlerOutcome::Stop,
            }
        }
        Some(Ok(_)) => HandlerOutcome::Continue,
        Some(Err(err)) => {
            log::warn!("terminal event error: {err}");
            session
                .hub()
                .try_send_status(StatusMessage::new(format!("input error: {err}")));
            HandlerOutcome::Continue
        }
        None => {
            // Nothing can confirm a selection any more
            log::info!("terminal event stream ended");
            session.exit_with(EXIT_CANCELLED);
            HandlerOutcome::Stop
        }
    }
}

/// Run the input loop until the session stops or the event stream ends.
pub async fn input_loop<S>(session: Arc<Session>, keymap: Keymap, mut events: S)
where
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    let stop = session.hub().stop_token();
    loop {
        let outcome = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            event = events.next() => handle_event(&session, &keymap, event).await,
        };
        if matches!(outcome, HandlerOutcome::Stop) {
            break;
        }
    }
    log::debug!("input loop exited");
}
