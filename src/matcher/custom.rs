//! Matchers backed by an external command.
//!
//! The command receives the candidates' display texts on stdin, one per line, and
//! prints the lines it keeps. Any argument equal to `$QUERY` is replaced with the
//! query text. Printed lines are mapped back to records by display text, so the
//! command's output order becomes the result order.

use crate::buffer::{Match, Record};
use crate::error::{LinepickError, Result};
use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Placeholder argument replaced by the query text.
pub const QUERY_PLACEHOLDER: &str = "$QUERY";

/// How long the registration smoke test may run before the command is rejected.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);
const VERIFY_POLL: Duration = Duration::from_millis(10);
/// How often a running command is checked for exit or supersession.
const RUN_POLL: Duration = Duration::from_millis(5);

/// A named external filter command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMatcher {
    name: String,
    args: Vec<String>,
}

impl CustomMatcher {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Result<Self> {
        let name = name.into();
        if args.is_empty() || args[0].trim().is_empty() {
            return Err(LinepickError::matcher(format!(
                "custom matcher '{name}' has no command"
            )));
        }
        Ok(Self { name, args })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Smoke-test the command with an empty query and no input.
    ///
    /// The command has to start and exit on its own; its exit code is not
    /// interpreted because many filters report "nothing matched" as failure.
    pub fn verify(&self) -> Result<()> {
        let mut child = self
            .command("")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| self.failure(format!("cannot start: {err}")))?;

        let deadline = Instant::now() + VERIFY_TIMEOUT;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.code().is_some() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(self.failure(format!("terminated abnormally ({status})")))
                }
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.failure("did not exit on empty input"));
                }
                Ok(None) => thread::sleep(VERIFY_POLL),
                Err(err) => return Err(self.failure(format!("wait failed: {err}"))),
            }
        }
    }

    /// Run the command over `records` and map its output back to matches.
    pub fn run(&self, records: &[Arc<Record>], query: &str) -> Result<Vec<Match>> {
        Ok(self
            .run_cancellable(records, query, &|| false)?
            .unwrap_or_default())
    }

    /// Like [`CustomMatcher::run`], but kills the command and returns `Ok(None)`
    /// once `superseded` reports true.
    pub fn run_cancellable(
        &self,
        records: &[Arc<Record>],
        query: &str,
        superseded: &dyn Fn() -> bool,
    ) -> Result<Option<Vec<Match>>> {
        let mut child = self
            .command(query)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| self.failure(format!("cannot start: {err}")))?;

        let mut input = Vec::new();
        for record in records {
            input.extend_from_slice(record.display().as_bytes());
            input.push(b'\n');
        }
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.failure("stdin unavailable"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.failure("stdout unavailable"))?;

        // Pipes are pumped from their own threads so a chatty command cannot deadlock us
        let feeder = thread::spawn(move || {
            // A command may exit without reading everything; that is not an error
            let _ = stdin.write_all(&input);
        });
        let collector = thread::spawn(move || {
            let mut output = Vec::new();
            stdout.read_to_end(&mut output).map(|_| output)
        });

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if superseded() => {
                    log::debug!("killing superseded custom matcher '{}'", self.name);
                    let _ = child.kill();
                    let _ = child.wait();
                    // Grandchildren may still hold the pipes; the threads end when they do
                    return Ok(None);
                }
                Ok(None) => thread::sleep(RUN_POLL),
                Err(err) => return Err(self.failure(format!("wait failed: {err}"))),
            }
        };
        let _ = feeder.join();
        let stdout = collector
            .join()
            .map_err(|_| self.failure("output reader panicked"))?
            .map_err(|err| self.failure(format!("cannot read output: {err}")))?;

        if status.code().is_none() {
            return Err(self.failure(format!("terminated abnormally ({status})")));
        }

        let mut by_text: HashMap<&str, VecDeque<&Arc<Record>>> = HashMap::new();
        for record in records {
            by_text.entry(record.display()).or_default().push_back(record);
        }

        let stdout = String::from_utf8_lossy(&stdout);
        let matches = stdout
            .lines()
            .filter_map(|line| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                by_text.get_mut(line)?.pop_front()
            })
            .map(|record| Match::plain(Arc::clone(record)))
            .collect();
        Ok(Some(matches))
    }

    fn command(&self, query: &str) -> Command {
        let mut command = Command::new(&self.args[0]);
        command.args(self.args[1..].iter().map(|arg| {
            if arg == QUERY_PLACEHOLDER {
                query
            } else {
                arg.as_str()
            }
        }));
        command
    }

    fn failure(&self, message: impl std::fmt::Display) -> LinepickError {
        LinepickError::matcher(format!("custom matcher '{}' {}", self.name, message))
    }
}
