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

//! Thread-backed parse stream.
//!
//! The tokenizer runs on its own thread and hands each event over a
//! zero-capacity channel, so the producer blocks after every event until the
//! consumer takes it. At most one event is in flight at any time.
//!
//! # Termination
//!
//! A stream always ends in exactly one of three ways:
//!
//! - the tokenizer emits `ParseFinished` or `ParseFailed`
//! - the deadline elapses, surfaced as `ParseFailed { Timeout }`
//! - [`ParseStream::cancel`] is called, surfaced as `ParseFailed { Cancelled }`
//! - the producer thread cannot be spawned or dies, surfaced as
//!   `ParseFailed { ProducerUnavailable }`
//!
//! After the terminal event the iterator returns `None` forever and the
//! producer thread has been joined.

use hl7_core::{Message, ParseError, ParseEvent, ParseOptions, ParseResult, Tokenizer};
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamState {
    Open,
    /// Cancelled by the consumer; the `Cancelled` event is still owed.
    CancelPending,
    Closed,
}

/// Handle to a parse running on a background thread.
///
/// # Examples
///
/// ```rust
/// use hl7_stream::{ParseEvent, ParseStream};
///
/// let stream = ParseStream::start("MSH|^~\\&|A\rPID|1\r");
/// let events: Vec<ParseEvent> = stream.collect();
///
/// assert_eq!(events.len(), 3);
/// assert!(matches!(events[2], ParseEvent::ParseFinished { .. }));
/// ```
#[derive(Debug)]
pub struct ParseStream {
    receiver: Option<Receiver<ParseEvent>>,
    worker: Option<JoinHandle<()>>,
    /// Why the producer thread could not be spawned.
    spawn_error: Option<String>,
    cancelled: Arc<AtomicBool>,
    timeout: Option<Duration>,
    started: Instant,
    state: StreamState,
}

impl ParseStream {
    /// Start parsing with default options. Returns immediately.
    pub fn start(input: impl Into<Vec<u8>>) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    /// Start parsing with explicit options. Returns immediately.
    ///
    /// The deadline in `options.timeout` is measured from this call.
    pub fn with_options(input: impl Into<Vec<u8>>, options: ParseOptions) -> Self {
        let input = input.into();
        let started = Instant::now();
        let cancelled = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::sync_channel(0);

        debug!(len = input.len(), ?options, "starting parse stream");

        let producer = Producer {
            input,
            options: options.clone(),
            started,
            cancelled: Arc::clone(&cancelled),
            sender,
        };
        let worker = thread::Builder::new()
            .name("hl7-parse".to_string())
            .spawn(move || producer.run());

        let (worker, spawn_error) = match worker {
            Ok(handle) => (Some(handle), None),
            Err(error) => {
                // Dropping the producer closes the channel; the first read
                // reports the spawn error.
                warn!(%error, "failed to spawn parse thread");
                (None, Some(error.to_string()))
            }
        };

        Self {
            receiver: Some(receiver),
            worker,
            spawn_error,
            cancelled,
            timeout: options.timeout,
            started,
            state: StreamState::Open,
        }
    }

    /// Ask the producer to stop and close the stream.
    ///
    /// The next call to `next()` yields `ParseFailed { Cancelled }`, after
    /// which the stream is closed. Once this returns the producer thread has
    /// exited. Cancelling a closed stream does nothing.
    pub fn cancel(&mut self) {
        if self.state != StreamState::Open {
            return;
        }
        debug!("parse stream cancelled");
        self.shutdown();
        self.state = StreamState::CancelPending;
    }

    /// True once the producer has been told to stop, by `cancel` or by an
    /// elapsed deadline.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// True once the terminal event has been delivered.
    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }

    /// Drain the stream and return the outcome.
    ///
    /// A stream whose terminal event was already taken by `next()` reports
    /// `Cancelled`.
    pub fn wait(mut self) -> ParseResult<Message> {
        while let Some(event) = self.next() {
            if let Some(outcome) = event.into_result() {
                return outcome;
            }
        }
        Err(ParseError::Cancelled)
    }

    fn remaining(&self) -> Result<Option<Duration>, ParseError> {
        let Some(limit) = self.timeout else {
            return Ok(None);
        };
        let elapsed = self.started.elapsed();
        if elapsed > limit {
            return Err(ParseError::Timeout { elapsed, limit });
        }
        Ok(Some(limit - elapsed))
    }

    fn receive(&mut self) -> Option<ParseEvent> {
        let remaining = match self.remaining() {
            Ok(remaining) => remaining,
            Err(error) => return Some(self.fail(error)),
        };

        let receiver = self.receiver.as_ref()?;
        let received = match remaining {
            Some(wait) => receiver.recv_timeout(wait),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(event) => {
                if event.is_terminal() {
                    self.close();
                }
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) => {
                let limit = self.timeout.unwrap_or_default();
                let elapsed = self.started.elapsed();
                Some(self.fail(ParseError::Timeout { elapsed, limit }))
            }
            Err(RecvTimeoutError::Disconnected) => {
                let reason = self
                    .spawn_error
                    .take()
                    .unwrap_or_else(|| "producer exited without a terminal event".to_string());
                Some(self.fail(ParseError::ProducerUnavailable { reason }))
            }
        }
    }

    fn fail(&mut self, error: ParseError) -> ParseEvent {
        debug!(%error, "parse stream failed on the consumer side");
        self.shutdown();
        self.state = StreamState::Closed;
        ParseEvent::failed(error)
    }

    fn close(&mut self) {
        self.state = StreamState::Closed;
        self.receiver = None;
        self.join();
    }

    /// Signal the producer, unblock any pending hand-off and wait for it.
    fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.receiver = None;
        self.join();
    }

    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("parse thread panicked");
            }
        }
    }
}

impl Iterator for ParseStream {
    type Item = ParseEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            StreamState::Open => self.receive(),
            StreamState::CancelPending => {
                self.state = StreamState::Closed;
                Some(ParseEvent::failed(ParseError::Cancelled))
            }
            StreamState::Closed => None,
        }
    }
}

impl FusedIterator for ParseStream {}

impl Drop for ParseStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Producer half: owns the input and drives the tokenizer.
struct Producer {
    input: Vec<u8>,
    options: ParseOptions,
    started: Instant,
    cancelled: Arc<AtomicBool>,
    sender: SyncSender<ParseEvent>,
}

impl Producer {
    fn run(self) {
        for event in Tokenizer::with_policy(&self.input, self.options.escape) {
            if self.cancelled.load(Ordering::Acquire) {
                debug!("producer stopped by cancellation");
                return;
            }

            if let Some(limit) = self.options.timeout {
                let elapsed = self.started.elapsed();
                if elapsed > limit {
                    debug!(?elapsed, ?limit, "producer deadline elapsed");
                    let _ = self.sender.send(ParseEvent::failed(ParseError::Timeout { elapsed, limit }));
                    return;
                }
            }

            let terminal = event.is_terminal();
            if let ParseEvent::SegmentCompleted { tag, .. } = &event {
                trace!(%tag, "handing off segment");
            }
            if self.sender.send(event).is_err() {
                debug!("consumer went away");
                return;
            }
            if terminal {
                return;
            }
        }
    }
}

/// Start a streamed parse with default options.
pub fn parse_stream(input: impl Into<Vec<u8>>) -> ParseStream {
    ParseStream::start(input)
}

/// Start a streamed parse with explicit options.
pub fn parse_stream_with_options(input: impl Into<Vec<u8>>, options: ParseOptions) -> ParseStream {
    ParseStream::with_options(input, options)
}

/// Parse a complete message by draining a [`ParseStream`].
///
/// # Examples
///
/// ```rust
/// let message = hl7_stream::parse("MSH|^~\\&|A\rPID|1||12345^^^MRN\r").unwrap();
/// assert_eq!(message.len(), 2);
/// ```
pub fn parse(input: impl Into<Vec<u8>>) -> ParseResult<Message> {
    parse_with_options(input, ParseOptions::default())
}

/// Parse a complete message with explicit options.
pub fn parse_with_options(input: impl Into<Vec<u8>>, options: ParseOptions) -> ParseResult<Message> {
    ParseStream::with_options(input, options).wait()
}
