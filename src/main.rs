//! linepick - Interactive Line Filter
//!
//! Pipe lines in, pick some, get them back on stdout.

use anyhow::{bail, Context, Result};
use crossterm::event::EventStream;
use linepick::config::{command, Options, Settings};
use linepick::view::{layout_by_name, TerminalUI};
use linepick::{Application, Outcome};
use std::io::{BufWriter, IsTerminal, Write};
use tokio::io::AsyncRead;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let options = Options::from_matches(&command().get_matches());
    options.validate()?;
    let settings = Settings::resolve(options).context("failed to load settings")?;

    let input: Box<dyn AsyncRead + Unpin + Send> = match &settings.options.file {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?,
        ),
        None if std::io::stdin().is_terminal() => {
            bail!("no input: pass a FILE or pipe lines on stdin")
        }
        None => Box::new(tokio::io::stdin()),
    };

    let app = Application::new(&settings)?;
    let renderer = Box::new(TerminalUI::new(layout_by_name(settings.layout())?));
    let outcome = app.run(input, renderer, EventStream::new()).await?;

    print_outcome(&outcome)?;
    // A stdin read may still be parked on the blocking pool; don't wait for it
    std::process::exit(outcome.exit_status);
}

/// Print each confirmed record's output part, newline-terminated.
fn print_outcome(outcome: &Outcome) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in &outcome.records {
        let output = record.output();
        out.write_all(output)?;
        if !output.ends_with(b"\n") {
            out.write_all(b"\n")?;
        }
    }
    out.flush().context("failed to write results")?;
    Ok(())
}
