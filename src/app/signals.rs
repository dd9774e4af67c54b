//! Terminating signals end the session like a cancel.

use crate::session::{Session, EXIT_CANCELLED};
use std::sync::Arc;

/// Wait for SIGINT, SIGTERM or SIGQUIT (Ctrl-C elsewhere) and cancel the session.
#[cfg(unix)]
pub async fn signal_loop(session: Arc<Session>) {
    use tokio::signal::unix::{signal, SignalKind};

    let streams = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::quit()),
    );
    let (Ok(mut interrupt), Ok(mut terminate), Ok(mut quit)) = streams else {
        log::warn!("cannot install signal handlers");
        return;
    };

    let name = tokio::select! {
        _ = session.hub().stopped() => return,
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    log::info!("received {name}, cancelling");
    session.exit_with(EXIT_CANCELLED);
}

#[cfg(not(unix))]
pub async fn signal_loop(session: Arc<Session>) {
    tokio::select! {
        _ = session.hub().stopped() => return,
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                log::warn!("cannot listen for Ctrl-C: {err}");
                return;
            }
        }
    }
    log::info!("received Ctrl-C, cancelling");
    session.exit_with(EXIT_CANCELLED);
}
