//! Named actions and what they do to a session.

use crate::error::{LinepickError, Result};
use crate::hub::{PagingRequest, StatusMessage};
use crate::session::{QueryState, Session, EXIT_CANCELLED};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How long transient notices stay on the status line.
const NOTICE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ForwardChar,
    BackwardChar,
    BeginningOfLine,
    EndOfLine,
    DeleteBackwardChar,
    DeleteForwardChar,
    KillEndOfLine,
    KillBeginningOfLine,
    DeleteAll,
    SelectNextLine,
    SelectPreviousLine,
    SelectNextPage,
    SelectPreviousPage,
    ToggleSelection,
    ToggleSelectionAndSelectNext,
    SelectAll,
    SelectNone,
    ToggleRangeMode,
    CancelRangeMode,
    RotateMatcher,
    RefreshScreen,
    Finish,
    Cancel,
    /// Insert a character at the caret. Not bindable by name.
    InsertChar(char),
}

const NAMED: &[(&str, Action)] = &[
    ("ForwardChar", Action::ForwardChar),
    ("BackwardChar", Action::BackwardChar),
    ("BeginningOfLine", Action::BeginningOfLine),
    ("EndOfLine", Action::EndOfLine),
    ("DeleteBackwardChar", Action::DeleteBackwardChar),
    ("DeleteForwardChar", Action::DeleteForwardChar),
    ("KillEndOfLine", Action::KillEndOfLine),
    ("KillBeginningOfLine", Action::KillBeginningOfLine),
    ("DeleteAll", Action::DeleteAll),
    ("SelectNextLine", Action::SelectNextLine),
    ("SelectPreviousLine", Action::SelectPreviousLine),
    ("SelectNextPage", Action::SelectNextPage),
    ("SelectPreviousPage", Action::SelectPreviousPage),
    ("ToggleSelection", Action::ToggleSelection),
    ("ToggleSelectionAndSelectNext", Action::ToggleSelectionAndSelectNext),
    ("SelectAll", Action::SelectAll),
    ("SelectNone", Action::SelectNone),
    ("ToggleRangeMode", Action::ToggleRangeMode),
    ("CancelRangeMode", Action::CancelRangeMode),
    ("RotateMatcher", Action::RotateMatcher),
    ("RefreshScreen", Action::RefreshScreen),
    ("Finish", Action::Finish),
    ("Cancel", Action::Cancel),
];

impl FromStr for Action {
    type Err = LinepickError;

    fn from_str(s: &str) -> Result<Self> {
        NAMED
            .iter()
            .find(|(name, _)| *name == s)
            .map(|&(_, action)| action)
            .ok_or_else(|| LinepickError::config(format!("unknown action '{s}'")))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Action::InsertChar(c) = self {
            return write!(f, "InsertChar({c})");
        }
        let name = NAMED
            .iter()
            .find(|(_, action)| action == self)
            .map_or("?", |(name, _)| name);
        f.write_str(name)
    }
}

impl Action {
    /// Apply the action to `session`.
    ///
    /// Errors are hub send failures; `Stopped` means the session is over.
    pub async fn execute(self, session: &Session) -> Result<()> {
        let hub = session.hub();
        match self {
            Action::InsertChar(c) => edit(session, |q| {
                q.insert(c);
                true
            })
            .await,
            Action::ForwardChar => move_caret(session, QueryState::forward),
            Action::BackwardChar => move_caret(session, QueryState::backward),
            Action::BeginningOfLine => move_caret(session, QueryState::home),
            Action::EndOfLine => move_caret(session, QueryState::end),
            Action::DeleteBackwardChar => edit(session, QueryState::delete_backward).await,
            Action::DeleteForwardChar => edit(session, QueryState::delete_forward).await,
            Action::KillEndOfLine => edit(session, QueryState::kill_to_end).await,
            Action::KillBeginningOfLine => edit(session, QueryState::kill_to_start).await,
            Action::DeleteAll => edit(session, QueryState::clear).await,

            Action::SelectNextLine => hub.send_paging(PagingRequest::NextLine).await,
            Action::SelectPreviousLine => hub.send_paging(PagingRequest::PrevLine).await,
            Action::SelectNextPage => hub.send_paging(PagingRequest::NextPage).await,
            Action::SelectPreviousPage => hub.send_paging(PagingRequest::PrevPage).await,

            Action::ToggleSelection => toggle_under_cursor(session).await,
            Action::ToggleSelectionAndSelectNext => {
                toggle_under_cursor(session).await?;
                hub.send_paging(PagingRequest::NextLine).await
            }
            Action::SelectAll => {
                let matches = session.display_snapshot().result.matches;
                session.with_selection(|s| s.select_all(matches.iter().map(|m| m.index())));
                hub.request_redraw();
                Ok(())
            }
            Action::SelectNone => {
                session.with_selection(|s| s.clear());
                hub.request_redraw();
                Ok(())
            }
            Action::ToggleRangeMode => {
                if session.selection_snapshot().is_range_open() {
                    let added = session.commit_range();
                    log::debug!("range committed, {added} new marks");
                } else if let Some((cursor, _)) = session.cursor_target() {
                    session.with_selection(|s| s.start_range(cursor));
                }
                hub.request_redraw();
                Ok(())
            }
            Action::CancelRangeMode => {
                session.with_selection(|s| s.cancel_range());
                hub.request_redraw();
                Ok(())
            }

            Action::RotateMatcher => {
                let matcher = session.rotate_matcher();
                log::debug!("matcher rotated to {}", matcher.name());
                hub.send_status(StatusMessage::timed(
                    format!("matcher: {}", matcher.name()),
                    NOTICE_TIMEOUT,
                ))
                .await?;
                session.submit_query().await.map(|_| ())
            }
            Action::RefreshScreen => {
                hub.request_redraw();
                Ok(())
            }

            Action::Finish => {
                if session.selection_snapshot().is_range_open() {
                    session.commit_range();
                }
                let records = session.confirmed_records();
                log::debug!("finishing with {} records", records.len());
                session.finish(records);
                Ok(())
            }
            Action::Cancel => {
                session.exit_with(EXIT_CANCELLED);
                Ok(())
            }
        }
    }
}

/// Change the query and, when the text changed, submit it.
async fn edit(session: &Session, change: impl FnOnce(&mut QueryState) -> bool) -> Result<()> {
    let changed = session.edit_query(change);
    session.hub().request_redraw();
    if changed {
        session.submit_query().await?;
    }
    Ok(())
}

fn move_caret(session: &Session, movement: fn(&mut QueryState)) -> Result<()> {
    session.edit_query(movement);
    session.hub().request_redraw();
    Ok(())
}

async fn toggle_under_cursor(session: &Session) -> Result<()> {
    let Some((_, line)) = session.cursor_target() else {
        return Ok(());
    };
    if !session.with_selection(|s| s.toggle(line.index())) {
        session
            .hub()
            .send_status(StatusMessage::timed(
                "range selection is active; commit or cancel it first",
                NOTICE_TIMEOUT,
            ))
            .await?;
    }
    session.hub().request_redraw();
    Ok(())
}
