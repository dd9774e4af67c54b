//! The view loop: owns the displayed result and paging state, and draws.
//!
//! Results, paging requests and status messages arrive on separate hub
//! channels. The loop applies each one to the session's [`Display`], which only
//! this task writes, then renders a fresh [`Screen`] through a [`UIRenderer`].

pub mod layout;
pub mod pager;
pub mod renderer;
pub mod screen;
pub mod terminal;
pub mod theme;

pub use layout::{layout_by_name, BottomUp, ScreenLayout, TopDown, BOTTOM_UP, TOP_DOWN};
pub use pager::Pager;
pub use renderer::UIRenderer;
pub use screen::{Row, Screen};
pub use terminal::TerminalUI;
pub use theme::ColorTheme;

use crate::hub::{DrawRequest, PagingRequest, ResultSet, StatusMessage};
use crate::session::{Display, Session};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::time::{sleep_until, Instant};

/// Receiving ends the view loop consumes.
pub struct ViewChannels {
    pub draws: Receiver<DrawRequest>,
    pub paging: Receiver<PagingRequest>,
    pub statuses: Receiver<StatusMessage>,
}

impl ViewChannels {
    /// Take the view's receivers from the session hub.
    pub fn take(session: &Session) -> crate::error::Result<Self> {
        let hub = session.hub();
        Ok(Self {
            draws: hub.take_draw_receiver()?,
            paging: hub.take_paging_receiver()?,
            statuses: hub.take_status_receiver()?,
        })
    }
}

struct ViewWorker {
    session: Arc<Session>,
    renderer: Box<dyn UIRenderer>,
    /// Cursor position to apply to the first result, then forgotten.
    initial_cursor: Option<usize>,
    status_deadline: Option<Instant>,
}

impl ViewWorker {
    fn apply_results(&mut self, results: ResultSet) {
        let initial_cursor = self.initial_cursor.take();
        let fresh = self.session.with_display(|display| {
            let total = results.matches.len();
            let fresh = !display.result.refreshes(&results);
            display.result = results;
            if let Some(position) = initial_cursor {
                display.pager.set_cursor(position, total);
            } else if fresh {
                display.pager.reset();
            } else {
                display.pager.clamp(total);
            }
            fresh
        });
        // Range positions refer to the result they were opened on
        if fresh {
            self.session.with_selection(|selection| selection.cancel_range());
        }
    }

    fn apply_paging(&mut self, request: PagingRequest) -> bool {
        self.session.with_display(|display| {
            let total = display.result.matches.len();
            display.pager.apply(request, total)
        })
    }

    fn apply_status(&mut self, message: StatusMessage) {
        self.status_deadline = message.clear_after.map(|after| Instant::now() + after);
        self.session
            .with_display(|display| display.status = Some(message.text));
    }

    fn clear_status(&mut self) {
        self.status_deadline = None;
        self.session.with_display(|display| display.status = None);
    }

    fn render(&mut self) {
        match self.renderer.page_capacity() {
            Ok(per_page) => self.session.with_display(|display: &mut Display| {
                let total = display.result.matches.len();
                display.pager.set_per_page(per_page, total);
            }),
            Err(err) => log::warn!("cannot read terminal size: {err}"),
        }

        let screen = Screen::compose(&self.session);
        if let Err(err) = self.renderer.render(&screen) {
            log::warn!("render failed: {err}");
        }
    }
}

/// Run the view loop until the session stops. The renderer must already be
/// initialized; it is cleaned up on exit.
pub async fn view_loop(
    session: Arc<Session>,
    renderer: Box<dyn UIRenderer>,
    mut channels: ViewChannels,
    initial_cursor: Option<usize>,
) {
    let stop = session.hub().stop_token();
    let mut worker = ViewWorker {
        session,
        renderer,
        initial_cursor,
        status_deadline: None,
    };
    worker.render();

    loop {
        let deadline = worker.status_deadline;
        let redraw = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            Some(request) = channels.draws.recv() => {
                if let DrawRequest::Results(results) = request {
                    worker.apply_results(results);
                }
                true
            }
            Some(request) = channels.paging.recv() => worker.apply_paging(request),
            Some(message) = channels.statuses.recv() => {
                worker.apply_status(message);
                true
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                worker.clear_status();
                true
            }
            else => break,
        };

        if redraw {
            worker.render();
        }
    }

    if let Err(err) = worker.renderer.cleanup() {
        log::warn!("terminal cleanup failed: {err}");
    }
    log::debug!("view loop exited");
}
