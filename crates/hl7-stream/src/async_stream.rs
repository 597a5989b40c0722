// Dweve HL7 - Streaming HL7 v2 Message Parser
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Async parse stream backed by a Tokio task.
//!
//! Mirrors [`ParseStream`](crate::ParseStream) for callers already inside a
//! Tokio runtime. The producer is a spawned task that hands events over a
//! capacity-1 channel and races every send against a [`CancellationSignal`],
//! so a cancelled producer exits even while it is blocked on a full channel.
//!
//! # Examples
//!
//! ```rust,no_run
//! # async fn example() {
//! use hl7_stream::{AsyncParseStream, ParseEvent};
//!
//! let mut stream = AsyncParseStream::start("MSH|^~\\&|A\rPID|1\r");
//! while let Some(event) = stream.next_event().await {
//!     if let ParseEvent::SegmentCompleted { tag, .. } = event {
//!         println!("{}", tag);
//!     }
//! }
//! # }
//! ```

use crate::stream::StreamState;
use hl7_core::{Message, ParseError, ParseEvent, ParseOptions, ParseResult, Tokenizer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// One-shot cancellation flag that async code can wait on.
#[derive(Debug, Default)]
pub struct CancellationSignal {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake every waiter. Raising twice is harmless.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.notify.notify_waiters();
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once the signal has been raised.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent `cancel`
            // cannot slip between the check and the wait.
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Handle to a parse running on a Tokio task.
#[derive(Debug)]
pub struct AsyncParseStream {
    receiver: mpsc::Receiver<ParseEvent>,
    task: Option<JoinHandle<()>>,
    signal: Arc<CancellationSignal>,
    timeout: Option<Duration>,
    started: Instant,
    state: StreamState,
}

impl AsyncParseStream {
    /// Spawn a parse with default options.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(input: impl Into<Vec<u8>>) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    /// Spawn a parse with explicit options.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn with_options(input: impl Into<Vec<u8>>, options: ParseOptions) -> Self {
        let input = input.into();
        let started = Instant::now();
        let signal = Arc::new(CancellationSignal::new());
        let (sender, receiver) = mpsc::channel(1);

        debug!(len = input.len(), ?options, "starting async parse stream");

        let task = tokio::spawn(produce(
            input,
            options.clone(),
            started,
            Arc::clone(&signal),
            sender,
        ));

        Self {
            receiver,
            task: Some(task),
            signal,
            timeout: options.timeout,
            started,
            state: StreamState::Open,
        }
    }

    /// Receive the next event, or `None` once the stream is closed.
    pub async fn next_event(&mut self) -> Option<ParseEvent> {
        match self.state {
            StreamState::Open => {}
            StreamState::CancelPending => {
                self.state = StreamState::Closed;
                return Some(ParseEvent::failed(ParseError::Cancelled));
            }
            StreamState::Closed => return None,
        }

        let received = match self.deadline() {
            Some((deadline, limit)) => {
                if Instant::now() >= deadline {
                    return Some(self.fail(limit));
                }
                match tokio::time::timeout_at(deadline, self.receiver.recv()).await {
                    Ok(received) => received,
                    Err(_) => return Some(self.fail(limit)),
                }
            }
            None => self.receiver.recv().await,
        };

        match received {
            Some(event) => {
                if event.is_terminal() {
                    self.state = StreamState::Closed;
                }
                Some(event)
            }
            None => {
                // The task only drops its sender early if it panicked.
                self.state = StreamState::Closed;
                Some(ParseEvent::failed(ParseError::ProducerUnavailable {
                    reason: "parse task exited without a terminal event".to_string(),
                }))
            }
        }
    }

    /// Signal the producer to stop.
    ///
    /// The next `next_event` yields `ParseFailed { Cancelled }`, then the
    /// stream is closed. Await [`join`](Self::join) to wait for the task.
    pub fn cancel(&mut self) {
        if self.state != StreamState::Open {
            return;
        }
        debug!("async parse stream cancelled");
        self.signal.cancel();
        self.receiver.close();
        self.state = StreamState::CancelPending;
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }

    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }

    /// True once the producer task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the producer task to exit.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                warn!(%error, "parse task failed");
            }
        }
    }

    /// Drain the stream and return the outcome.
    pub async fn wait(mut self) -> ParseResult<Message> {
        while let Some(event) = self.next_event().await {
            if let Some(outcome) = event.into_result() {
                return outcome;
            }
        }
        Err(ParseError::Cancelled)
    }

    fn deadline(&self) -> Option<(Instant, Duration)> {
        let limit = self.timeout?;
        Some((self.started.checked_add(limit)?, limit))
    }

    fn fail(&mut self, limit: Duration) -> ParseEvent {
        let elapsed = self.started.elapsed();
        debug!(?elapsed, ?limit, "async parse stream deadline elapsed");
        self.signal.cancel();
        self.receiver.close();
        self.state = StreamState::Closed;
        ParseEvent::failed(ParseError::Timeout { elapsed, limit })
    }
}

impl Drop for AsyncParseStream {
    fn drop(&mut self) {
        self.signal.cancel();
    }
}

async fn produce(
    input: Vec<u8>,
    options: ParseOptions,
    started: Instant,
    signal: Arc<CancellationSignal>,
    sender: mpsc::Sender<ParseEvent>,
) {
    for event in Tokenizer::with_policy(input, options.escape) {
        if signal.is_cancelled() {
            debug!("producer stopped by cancellation");
            return;
        }

        let event = match options.timeout {
            Some(limit) if started.elapsed() > limit => {
                let elapsed = started.elapsed();
                debug!(?elapsed, ?limit, "producer deadline elapsed");
                ParseEvent::failed(ParseError::Timeout { elapsed, limit })
            }
            _ => event,
        };

        let terminal = event.is_terminal();
        if let ParseEvent::SegmentCompleted { tag, .. } = &event {
            trace!(%tag, "handing off segment");
        }

        tokio::select! {
            biased;
            _ = signal.cancelled() => {
                debug!("producer stopped by cancellation");
                return;
            }
            sent = sender.send(event) => {
                if sent.is_err() {
                    debug!("consumer went away");
                    return;
                }
            }
        }

        if terminal {
            return;
        }
    }
}

/// Parse a complete message on a Tokio task.
pub async fn parse_async(input: impl Into<Vec<u8>>, options: ParseOptions) -> ParseResult<Message> {
    AsyncParseStream::with_options(input, options).wait().await
}
