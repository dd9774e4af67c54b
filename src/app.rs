//! Application orchestration layer
//!
//! Builds the session from resolved settings, then wires the ingestion, filter,
//! view, input and signal loops together and waits for all of them to finish.
//! Every startup failure surfaces here, before any loop runs.

pub mod signals;

use crate::buffer::{MemoryBuffer, Record};
use crate::config::Settings;
use crate::error::{LinepickError, Result};
use crate::filter::filter_loop;
use crate::ingest::{ingest_loop, IngestOptions, IngestSignals};
use crate::input::{input_loop, Keymap};
use crate::matcher::{CustomMatcher, MatcherSet};
use crate::session::{Session, EXIT_CANCELLED};
use crate::view::{layout_by_name, view_loop, UIRenderer, ViewChannels};
use crossterm::event::Event;
use futures::Stream;
use std::io;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// How a run ended.
#[derive(Debug)]
pub struct Outcome {
    pub exit_status: i32,
    /// Confirmed records in output order; empty unless the run was confirmed.
    pub records: Vec<Arc<Record>>,
}

impl Outcome {
    fn from_session(session: &Session) -> Self {
        Self {
            exit_status: session.exit_status().unwrap_or(EXIT_CANCELLED),
            records: session.take_result(),
        }
    }
}

/// Application orchestrator
pub struct Application {
    session: Arc<Session>,
    keymap: Keymap,
    ingest: IngestOptions,
    initial_index: usize,
    select_one: bool,
}

impl Application {
    /// Validate the settings and build the session.
    pub fn new(settings: &Settings) -> Result<Self> {
        // Only validated here; the caller builds the renderer that uses it
        layout_by_name(settings.layout())?;
        let keymap = Keymap::with_overrides(settings.keymap())?;

        let mut matchers = MatcherSet::new();
        for (name, args) in &settings.file.custom_matcher {
            matchers.register_custom(CustomMatcher::new(name.clone(), args.clone())?)?;
        }
        if let Some(name) = settings.initial_matcher() {
            matchers.set_current(name)?;
        }

        let buffer = Arc::new(MemoryBuffer::new(settings.options.null_separator));
        let session = Arc::new(Session::new(buffer, matchers, settings.prompt()));
        session.edit_query(|query| query.set(settings.query()));

        Ok(Self {
            session,
            keymap,
            ingest: IngestOptions {
                max_records: settings.options.buffer_size,
            },
            initial_index: settings.options.initial_index,
            select_one: settings.options.select_one,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Run one interactive session over `input`.
    ///
    /// The renderer is initialized once there is something to show. A
    /// single-line input handled by `--select-1` that is complete by then never
    /// touches the terminal; otherwise the UI runs while the input is still
    /// being read, and the session finishes if it ends with exactly one line.
    pub async fn run<R, E>(
        self,
        input: R,
        mut renderer: Box<dyn UIRenderer>,
        events: E,
    ) -> Result<Outcome>
    where
        R: AsyncRead + Unpin + Send + 'static,
        E: Stream<Item = io::Result<Event>> + Unpin + Send + 'static,
    {
        let session = self.session;
        let hub = session.hub();
        let queries = hub.take_query_receiver()?;
        let view_channels = ViewChannels::take(&session)?;

        let ingest_signals = IngestSignals::new();
        session.spawn(ingest_loop(
            Arc::clone(&session),
            input,
            ingest_signals.clone(),
            self.ingest,
        ));

        tokio::select! {
            _ = ingest_signals.ready() => {}
            _ = hub.stopped() => {}
        }

        if self.select_one {
            // Input that is already complete never needs the terminal
            if session.buffer().is_done() && select_single(&session) {
                session.join().await;
                return Ok(Outcome::from_session(&session));
            }
            session.spawn(select_one_loop(Arc::clone(&session)));
        }

        if let Err(err) = renderer.initialize() {
            session.exit_with(EXIT_CANCELLED);
            session.join().await;
            return Err(LinepickError::ui(format!("terminal setup failed: {err}")));
        }

        let initial_cursor = (self.initial_index > 0).then_some(self.initial_index);
        session.spawn(view_loop(
            Arc::clone(&session),
            renderer,
            view_channels,
            initial_cursor,
        ));
        session.spawn(filter_loop(Arc::clone(&session), queries));
        session.spawn(input_loop(Arc::clone(&session), self.keymap, events));
        session.spawn(signals::signal_loop(Arc::clone(&session)));

        if let Err(err) = session.submit_query().await {
            log::debug!("initial query not submitted: {err}");
        }

        session.join().await;
        log::debug!("all loops joined");
        Ok(Outcome::from_session(&session))
    }
}

/// Finish with the only record when the buffer holds exactly one.
fn select_single(session: &Session) -> bool {
    if session.buffer().len() != 1 {
        return false;
    }
    match session.buffer().record_at(0) {
        Ok(record) => {
            log::debug!("single input line selected without prompting");
            session.finish(vec![record]);
            true
        }
        Err(err) => {
            log::warn!("single record unavailable: {err}");
            false
        }
    }
}

/// Wait for the input to end, then apply `--select-1`.
async fn select_one_loop(session: Arc<Session>) {
    tokio::select! {
        _ = session.buffer().wait_done() => {}
        _ = session.hub().stopped() => return,
    }
    select_single(&session);
}
