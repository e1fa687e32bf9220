//! Background parsing of descriptor records with bounded hand-off.

use std::{
    io::BufRead,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, SyncSender, sync_channel},
    },
    thread::{self, JoinHandle},
};

use tracing::instrument;

use super::{FieldAccumulator, ParseError, next_line, trim_line_ending};
use crate::domain::{Config, Record, RecordsIndex};

/// Expected size of a full descriptor file, used to pre-size collections.
const EXPECTED_RECORDS: usize = 50_000;

/// A flag shared between a [`RecordStream`] and its worker.
///
/// The worker checks the flag before reading each line and stops with
/// [`ParseError::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any
    /// clone of this token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Parses a descriptor record file.
///
/// Parsing happens on a dedicated worker thread. Finished records are passed
/// to the consumer through a bounded queue (see
/// [`Config::channel_capacity`]), so the worker never runs more than one
/// queue's worth ahead of the consumer.
#[derive(Debug)]
pub struct RecordParser<R> {
    reader: R,
    config: Config,
}

impl<R> RecordParser<R>
where
    R: BufRead + Send + 'static,
{
    /// Creates a parser over `reader` with the default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, Config::default())
    }

    /// Creates a parser over `reader`.
    pub const fn with_config(reader: R, config: Config) -> Self {
        Self { reader, config }
    }

    /// Starts the worker and returns the stream of records it produces.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Spawn`] if the worker thread cannot be started.
    #[instrument(level = "debug", skip(self), fields(capacity = self.config.channel_capacity()))]
    pub fn stream(self) -> Result<RecordStream, ParseError> {
        let Self { reader, config } = self;

        let (tx, rx) = sync_channel(config.channel_capacity());
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let worker = thread::Builder::new()
            .name("mesh-records".into())
            .spawn(move || produce(reader, &tx, &worker_cancel, config.progress_interval))
            .map_err(ParseError::Spawn)?;

        Ok(RecordStream {
            rx: Some(rx),
            worker: Some(worker),
            cancel,
        })
    }

    /// Parses the whole input.
    ///
    /// Returns the records in the order they appear, along with the index
    /// from tree number to record.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker cannot be started or the input cannot be
    /// read. No records are returned in that case.
    pub fn parse_all(self) -> Result<(Vec<Arc<Record>>, RecordsIndex), ParseError> {
        let mut stream = self.stream()?;

        let mut records = Vec::with_capacity(EXPECTED_RECORDS);
        records.extend(stream.by_ref());

        let index = stream.finish()?;
        Ok((records, index))
    }
}

/// The consumer end of a running [`RecordParser`].
///
/// Iterating yields records in input order as the worker finishes them.
/// Iteration ends once the worker stops, whether it reached the end of the
/// input, failed or was cancelled; [`finish`](Self::finish) tells which.
///
/// Dropping the stream cancels the worker.
#[derive(Debug)]
pub struct RecordStream {
    rx: Option<Receiver<Arc<Record>>>,
    worker: Option<JoinHandle<Result<RecordsIndex, ParseError>>>,
    cancel: CancellationToken,
}

impl RecordStream {
    /// Blocks until the next record is available.
    ///
    /// Returns `None` once the worker has stopped and the queue is drained.
    #[must_use]
    pub fn recv(&self) -> Option<Arc<Record>> {
        self.rx.as_ref()?.recv().ok()
    }

    /// Asks the worker to stop at the next line boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this stream's worker, usable from other threads.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the worker and returns its outcome.
    ///
    /// On success this is the complete index from tree number to record.
    /// Records still waiting in the queue are discarded. If the worker had not
    /// yet queued every record it stops with [`ParseError::Cancelled`], so call
    /// this after draining the stream to get the index.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the worker, or
    /// [`ParseError::WorkerPanicked`].
    pub fn finish(mut self) -> Result<RecordsIndex, ParseError> {
        // Disconnect first so a worker blocked on a full queue wakes up.
        drop(self.rx.take());

        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| ParseError::WorkerPanicked)?,
            None => Err(ParseError::WorkerPanicked),
        }
    }
}

impl Iterator for RecordStream {
    type Item = Arc<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Drop for RecordStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The worker loop.
///
/// The index is only returned, never shared, so the consumer cannot observe it
/// before the worker is done with it.
fn produce<R: BufRead>(
    mut reader: R,
    tx: &SyncSender<Arc<Record>>,
    cancel: &CancellationToken,
    progress_interval: u64,
) -> Result<RecordsIndex, ParseError> {
    let mut accumulator = FieldAccumulator::new();
    let mut index = RecordsIndex::with_capacity(EXPECTED_RECORDS);
    let mut delivered = 0usize;
    let mut buf = Vec::new();

    loop {
        let line_number = accumulator.line_number();
        if cancel.is_cancelled() {
            tracing::debug!(line = line_number, "record parsing cancelled");
            return Err(ParseError::Cancelled { line: line_number });
        }

        let Some(line) = next_line(&mut reader, &mut buf, line_number + 1)? else {
            break;
        };

        if let Some(record) = accumulator.push_line(trim_line_ending(&line)) {
            deliver(record, &mut index, tx, accumulator.line_number())?;
            delivered += 1;
        }

        let line_number = accumulator.line_number();
        if progress_interval > 0 && line_number as u64 % progress_interval == 0 {
            tracing::debug!(line = line_number, records = delivered, "parsing records");
        }
    }

    if let Some(record) = accumulator.finish() {
        deliver(record, &mut index, tx, accumulator.line_number())?;
        delivered += 1;
    }

    tracing::debug!(
        lines = accumulator.line_number(),
        records = delivered,
        tree_numbers = index.len(),
        "record parsing finished"
    );
    Ok(index)
}

fn deliver(
    record: Record,
    index: &mut RecordsIndex,
    tx: &SyncSender<Arc<Record>>,
    line: usize,
) -> Result<(), ParseError> {
    let record = Arc::new(record);
    index.register(&record);
    tx.send(record).map_err(|_| {
        tracing::debug!(line, "record consumer went away");
        ParseError::Cancelled { line }
    })
}
