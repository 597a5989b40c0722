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

//! Streaming HL7 Parser
//!
//! Runs the `hl7-core` tokenizer concurrently with the caller and delivers
//! its events one at a time, in document order.
//!
//! # Features
//!
//! - **Backpressure**: the producer waits for the consumer after every event
//! - **Cancellation**: stop a parse mid-message without leaking the producer
//! - **Timeout Protection**: bound the time spent on untrusted input
//! - **Async Support**: Tokio task instead of a thread (feature `async`)
//!
//! # Sync API (default)
//!
//! ```rust
//! use hl7_stream::{parse_stream, ParseEvent};
//!
//! let mut stream = parse_stream("MSH|^~\\&|A\rPID|1\rOBX|1\r");
//! for event in stream.by_ref() {
//!     match event {
//!         ParseEvent::SegmentCompleted { tag, .. } => println!("segment {}", tag),
//!         ParseEvent::ParseFinished { message } => println!("{} segments", message.len()),
//!         ParseEvent::ParseFailed { error } => eprintln!("error: {}", error),
//!     }
//! }
//! assert!(stream.is_closed());
//! ```
//!
//! Most callers only want the finished tree:
//!
//! ```rust
//! let message = hl7_stream::parse("MSH|^~\\&|A\rPID|1\r").unwrap();
//! assert_eq!(message.len(), 2);
//! ```
//!
//! # Timeout Protection for Untrusted Input
//!
//! ```rust
//! use hl7_stream::{parse_with_options, ParseOptions};
//! use std::time::Duration;
//!
//! let options = ParseOptions::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build();
//! let message = parse_with_options("MSH|^~\\&|A\r", options).unwrap();
//! assert_eq!(message.len(), 1);
//! ```

mod stream;

#[cfg(feature = "async")]
mod async_stream;

pub use stream::{
    parse, parse_stream, parse_stream_with_options, parse_with_options, ParseStream,
};

#[cfg(feature = "async")]
pub use async_stream::{parse_async, AsyncParseStream, CancellationSignal};

// Re-export the types that flow through a stream
pub use hl7_core::{EscapePolicy, Message, ParseError, ParseErrorKind, ParseEvent, ParseOptions, ParseResult};
