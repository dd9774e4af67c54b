//! The filter loop: turns submitted queries into admitted results.
//!
//! Queries arrive tagged with a sequence number. The loop coalesces whatever is
//! queued down to the newest query and runs each pass on the blocking pool, so
//! a long pass never stalls the runtime. Passes may finish out of order; only a
//! result that still answers the latest query, and is newer than the last
//! applied one, reaches the view.
//!
//! While input streams in, the same query is re-submitted over and over. Such a
//! refresh does not abandon the pass already running for that query; it waits
//! and runs once that pass is done, so a pass slower than the refresh interval
//! still gets its result on screen.

use crate::buffer::Match;
use crate::error::{LinepickError, Result};
use crate::hub::{DrawRequest, QueryEvent, QuerySeq, ResultSet, StatusMessage};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::task::{JoinError, JoinSet};

/// Admission check for finished passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultGate {
    applied: QuerySeq,
}

impl ResultGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `seq` if it still answers the latest query and is newer than
    /// anything already applied.
    pub fn admit(&mut self, seq: QuerySeq, current: bool) -> bool {
        if current && seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    pub fn applied(&self) -> QuerySeq {
        self.applied
    }
}

/// What a finished pass hands back to the loop.
#[derive(Debug)]
struct PassOutcome {
    seq: QuerySeq,
    query: String,
    matcher: String,
    /// `Ok(None)` when the pass noticed it was superseded and gave up.
    result: Result<Option<Vec<Match>>>,
}

/// What the loop should do after handling an event.
enum HandlerOutcome {
    Continue,
    Stop,
}

/// The query and matcher of the newest pass still running.
#[derive(Debug)]
struct RunningPass {
    seq: QuerySeq,
    text: String,
    matcher: String,
}

struct FilterWorker {
    session: Arc<Session>,
    gate: ResultGate,
    passes: JoinSet<PassOutcome>,
    running: Option<RunningPass>,
    /// A refresh of the running query, started once that pass finishes.
    deferred: Option<QueryEvent>,
}

impl FilterWorker {
    fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            gate: ResultGate::new(),
            passes: JoinSet::new(),
            running: None,
            deferred: None,
        }
    }

    /// Start a pass for `event`, or defer it when it only repeats the running one.
    fn accept(&mut self, event: QueryEvent) {
        let matcher = self.session.current_matcher();
        let repeats_running = self
            .running
            .as_ref()
            .is_some_and(|running| running.text == event.text && running.matcher == matcher.name());
        if repeats_running {
            log::debug!("deferring refresh #{} until the running pass ends", event.seq);
            self.deferred = Some(event);
        } else {
            self.deferred = None;
            self.start_pass(event);
        }
    }

    /// Bookkeeping after pass `seq` left the join set (`None` if it panicked).
    fn pass_ended(&mut self, seq: Option<QuerySeq>) {
        let ended = self
            .running
            .as_ref()
            .is_some_and(|running| Some(running.seq) == seq);
        if ended || self.passes.is_empty() {
            self.running = None;
        }
        if self.running.is_none() {
            if let Some(event) = self.deferred.take() {
                self.start_pass(event);
            }
        }
    }

    fn start_pass(&mut self, event: QueryEvent) {
        let session = Arc::clone(&self.session);
        let records = session.buffer().snapshot();
        let matcher = session.current_matcher();
        log::debug!(
            "filter pass #{} over {} records with {}",
            event.seq,
            records.len(),
            matcher.name()
        );

        self.running = Some(RunningPass {
            seq: event.seq,
            text: event.text.clone(),
            matcher: matcher.name().to_string(),
        });

        self.passes.spawn_blocking(move || {
            let superseded = || {
                session.hub().is_stopped()
                    || !session.pass_is_current(event.seq, &event.text, matcher.name())
            };
            let result = matcher.filter_cancellable(&records, &event.text, &superseded);
            PassOutcome {
                seq: event.seq,
                query: event.text,
                matcher: matcher.name().to_string(),
                result,
            }
        });
    }

    async fn finish_pass(
        &mut self,
        joined: std::result::Result<PassOutcome, JoinError>,
    ) -> HandlerOutcome {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("filter pass failed to complete: {err}");
                return HandlerOutcome::Continue;
            }
        };

        let hub = self.session.hub();
        let (matches, failure) = match outcome.result {
            Ok(Some(matches)) => (matches, None),
            Ok(None) => {
                log::debug!("filter pass #{} abandoned", outcome.seq);
                return HandlerOutcome::Continue;
            }
            Err(err) => (Vec::new(), Some(err)),
        };

        let current = self
            .session
            .pass_is_current(outcome.seq, &outcome.query, &outcome.matcher);
        if !self.gate.admit(outcome.seq, current) {
            log::debug!("discarding stale result #{}", outcome.seq);
            return HandlerOutcome::Continue;
        }

        if let Some(err) = failure {
            log::info!("query '{}' failed: {err}", outcome.query);
            if let Err(err) = hub.send_status(StatusMessage::new(err.to_string())).await {
                return stop_on(err);
            }
        }

        let results = ResultSet::new(outcome.query, outcome.matcher, matches);
        match hub.send_draw(DrawRequest::Results(results)).await {
            Ok(()) => HandlerOutcome::Continue,
            Err(err) => stop_on(err),
        }
    }
}

fn stop_on(err: LinepickError) -> HandlerOutcome {
    if !err.is_stopped() {
        log::warn!("filter loop cannot deliver results: {err}");
    }
    HandlerOutcome::Stop
}

/// Keep only the newest of the queries already waiting in the channel.
fn coalesce(mut event: QueryEvent, queries: &mut Receiver<QueryEvent>) -> QueryEvent {
    while let Ok(newer) = queries.try_recv() {
        event = newer;
    }
    event
}

/// Run the filter loop until the session stops or the query channel closes.
pub async fn filter_loop(session: Arc<Session>, mut queries: Receiver<QueryEvent>) {
    let stop = session.hub().stop_token();
    let mut worker = FilterWorker::new(session);

    loop {
        let outcome = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            Some(joined) = worker.passes.join_next(), if !worker.passes.is_empty() => {
                let seq = joined.as_ref().ok().map(|outcome| outcome.seq);
                let outcome = worker.finish_pass(joined).await;
                worker.pass_ended(seq);
                outcome
            }
            received = queries.recv() => match received {
                Some(event) => {
                    let event = coalesce(event, &mut queries);
                    worker.accept(event);
                    HandlerOutcome::Continue
                }
                None => HandlerOutcome::Stop,
            },
        };

        if matches!(outcome, HandlerOutcome::Stop) {
            break;
        }
    }

    // Passes poll the stop flag, so this returns promptly
    worker.passes.abort_all();
    log::debug!("filter loop exited");
}
