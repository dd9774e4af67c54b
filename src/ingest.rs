//! Reading records from the input stream into the buffer.
//!
//! Ingestion runs as its own task. It appends one record per line, fires the
//! `ready` signal once there is something to show (or nothing ever will be), and
//! keeps the visible result in step with the growing buffer by re-submitting the
//! current query at most once per [`REFRESH_INTERVAL`].

use crate::hub::StatusMessage;
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Minimum time between query re-submissions while records stream in.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Signals shared between the ingestion task and whoever waits on it.
#[derive(Debug, Clone, Default)]
pub struct IngestSignals {
    ready: CancellationToken,
    end: CancellationToken,
}

impl IngestSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once the first record is in, the input proved empty, or
    /// ingestion was cut short.
    pub async fn ready(&self) {
        self.ready.cancelled().await;
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_cancelled()
    }

    /// Stop reading after the current record, as if the stream had ended.
    pub fn end(&self) {
        self.end.cancel();
    }
}

/// Options that shape how lines become records.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Buffer size above which an "overflowing" status is shown; 0 disables it.
    pub max_records: usize,
}

/// Read `reader` to completion into the session's buffer.
pub async fn ingest_loop<R>(
    session: Arc<Session>,
    reader: R,
    signals: IngestSignals,
    options: IngestOptions,
) where
    R: AsyncRead + Unpin,
{
    let hub = session.hub();
    let buffer = session.buffer();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut last_refresh = Instant::now();
    let mut overflow_reported = false;

    loop {
        line.clear();
        let read = tokio::select! {
            biased;
            _ = hub.stopped() => break,
            _ = signals.end.cancelled() => {
                log::debug!("ingestion ended by request");
                break;
            }
            read = reader.read_until(b'\n', &mut line) => read,
        };

        match read {
            Ok(0) => break,
            Ok(_) => {
                trim_line_ending(&mut line);
                if let Err(err) = buffer.append(std::mem::take(&mut line)) {
                    log::warn!("dropping input line: {err}");
                    break;
                }
                signals.ready.cancel();

                if !overflow_reported
                    && options.max_records > 0
                    && buffer.len() > options.max_records
                {
                    // Retried on the next line while the status channel is full
                    overflow_reported = hub.try_send_status(StatusMessage::new(format!(
                        "buffer overflowing: more than {} lines",
                        options.max_records
                    )));
                    if overflow_reported {
                        log::info!("buffer exceeded {} records", options.max_records);
                    }
                }

                if last_refresh.elapsed() >= REFRESH_INTERVAL {
                    last_refresh = Instant::now();
                    // A full channel already holds a newer query
                    let _ = hub.try_send_query(session.query_text());
                }
            }
            Err(err) => {
                log::warn!("input read failed: {err}");
                hub.try_send_status(StatusMessage::new(format!("read error: {err}")));
                break;
            }
        }
    }

    buffer.mark_done();
    signals.ready.cancel();
    log::debug!("ingestion complete: {} records", buffer.len());

    if !hub.is_stopped() {
        if let Err(err) = session.submit_query().await {
            log::debug!("final refresh not delivered: {err}");
        }
    }
}

fn trim_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::error::LinepickError;
    use crate::matcher::MatcherSet;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;
    use tokio::time::timeout;

    fn fresh_session(max: usize) -> (Arc<Session>, IngestOptions) {
        let session = Session::new(Arc::new(MemoryBuffer::new(false)), MatcherSet::new(), ">");
        (Arc::new(session), IngestOptions { max_records: max })
    }

    fn displays(session: &Session) -> Vec<String> {
        session
            .buffer()
            .snapshot()
            .iter()
            .map(|r| r.display().to_string())
            .collect()
    }

    #[test]
    fn line_endings_are_trimmed() {
        let mut lf = b"one\n".to_vec();
        trim_line_ending(&mut lf);
        assert_eq!(lf, b"one");

        let mut crlf = b"two\r\n".to_vec();
        trim_line_ending(&mut crlf);
        assert_eq!(crlf, b"two");

        let mut bare = b"three\r".to_vec();
        trim_line_ending(&mut bare);
        assert_eq!(bare, b"three\r");
    }

    #[tokio::test]
    async fn reads_every_line_and_signals_done() {
        let (session, options) = fresh_session(0);
        let _queries = session.hub().take_query_receiver().unwrap();
        let signals = IngestSignals::new();

        let input: &[u8] = b"alpha\r\nbeta\n\x1b[31mgamma\x1b[0m";
        ingest_loop(Arc::clone(&session), input, signals.clone(), options).await;

        assert!(signals.is_ready());
        assert!(session.buffer().is_done());
        assert_eq!(displays(&session), vec!["alpha", "beta", "gamma"]);
        assert_eq!(session.buffer().record_at(2).unwrap().raw(), b"\x1b[31mgamma\x1b[0m");
    }

    #[tokio::test]
    async fn empty_input_is_ready_and_done() {
        let (session, options) = fresh_session(0);
        let mut queries = session.hub().take_query_receiver().unwrap();
        let signals = IngestSignals::new();

        ingest_loop(Arc::clone(&session), &b""[..], signals.clone(), options).await;

        assert!(signals.is_ready());
        assert!(session.buffer().is_empty());
        // Completion re-submits the query once
        assert_eq!(queries.recv().await.unwrap().text, "");
    }

    #[tokio::test]
    async fn overflow_warns_once_and_keeps_reading() {
        let (session, options) = fresh_session(2);
        let _queries = session.hub().take_query_receiver().unwrap();
        let mut statuses = session.hub().take_status_receiver().unwrap();

        let input: &[u8] = b"1\n2\n3\n4\n5\n";
        ingest_loop(Arc::clone(&session), input, IngestSignals::new(), options).await;

        assert_eq!(session.buffer().len(), 5);
        let status = statuses.recv().await.unwrap();
        assert!(status.text.contains("overflowing"));
        assert!(statuses.try_recv().is_err());
    }

    #[tokio::test]
    async fn overflow_notice_survives_a_full_status_channel() {
        use crate::hub::CHANNEL_CAPACITY;
        use tokio::io::AsyncWriteExt;

        let (session, options) = fresh_session(2);
        let _queries = session.hub().take_query_receiver().unwrap();
        let mut statuses = session.hub().take_status_receiver().unwrap();
        for i in 0..CHANNEL_CAPACITY {
            assert!(session.hub().try_send_status(StatusMessage::new(format!("busy {i}"))));
        }

        let (mut writer, reader) = tokio::io::duplex(256);
        let task = tokio::spawn(ingest_loop(
            Arc::clone(&session),
            reader,
            IngestSignals::new(),
            options,
        ));
        writer.write_all(b"1\n2\n3\n").await.unwrap();
        timeout(Duration::from_secs(1), async {
            while session.buffer().len() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("lines were not read");

        for _ in 0..CHANNEL_CAPACITY {
            assert!(statuses.recv().await.unwrap().text.starts_with("busy"));
        }
        writer.write_all(b"4\n").await.unwrap();
        let status = timeout(Duration::from_secs(1), statuses.recv())
            .await
            .expect("overflow notice was lost")
            .unwrap();
        assert!(status.text.contains("overflowing"));

        drop(writer);
        timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert!(statuses.try_recv().is_err());
    }

    /// Yields one line, then never produces more data.
    struct Stalled {
        sent: bool,
    }

    impl AsyncRead for Stalled {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                return Poll::Pending;
            }
            self.sent = true;
            buf.put_slice(b"first\n");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn end_marker_and_stop_interrupt_a_stalled_stream() {
        let (session, options) = fresh_session(0);
        let _queries = session.hub().take_query_receiver().unwrap();
        let signals = IngestSignals::new();
        let task = tokio::spawn(ingest_loop(
            Arc::clone(&session),
            Stalled { sent: false },
            signals.clone(),
            options,
        ));

        timeout(Duration::from_secs(1), signals.ready())
            .await
            .expect("first record never signalled ready");
        assert!(!session.buffer().is_done());

        signals.end();
        timeout(Duration::from_secs(1), task)
            .await
            .expect("ingestion ignored the end marker")
            .unwrap();
        assert!(session.buffer().is_done());
        assert_eq!(session.buffer().len(), 1);

        // A stopped session releases a stalled reader the same way
        let (stopped, options) = fresh_session(0);
        let task = tokio::spawn(ingest_loop(
            Arc::clone(&stopped),
            Stalled { sent: true },
            IngestSignals::new(),
            options,
        ));
        stopped.hub().stop();
        timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert!(stopped.buffer().is_done());
    }

    struct Failing;

    impl AsyncRead for Failing {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "device gone")))
        }
    }

    #[tokio::test]
    async fn read_error_becomes_a_status_message() {
        let (session, options) = fresh_session(0);
        let _queries = session.hub().take_query_receiver().unwrap();
        let mut statuses = session.hub().take_status_receiver().unwrap();
        let signals = IngestSignals::new();

        ingest_loop(Arc::clone(&session), Failing, signals.clone(), options).await;

        assert!(signals.is_ready());
        assert!(session.buffer().is_done());
        assert!(statuses.recv().await.unwrap().text.contains("device gone"));
        assert!(matches!(
            session.buffer().record_at(0),
            Err(LinepickError::EmptyBuffer)
        ));
    }
}
