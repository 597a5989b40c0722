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

//! # HL7 - Streaming HL7 v2 Message Parser
//!
//! Parses pipe-delimited HL7 v2 messages into a positional tree
//! (message, segment, field, repetition, component, subcomponent), either
//! all at once or as a stream of per-segment events.
//!
//! ## Quick Start
//!
//! ```rust
//! use hl7::parse;
//!
//! let message = parse("MSH|^~\\&|SENDER|RECEIVER\rPID|1||12345^^^MRN\r").unwrap();
//!
//! let pid = message.segments_named("PID").next().unwrap();
//! assert_eq!(pid.len(), 4);
//! assert!(pid.get(2).unwrap().is_empty());
//! assert_eq!(message.value(1, 3, 0, 3, 0), Some(&b"MRN"[..]));
//! ```
//!
//! ## Features
//!
//! - **Positional fidelity**: empty fields and components keep their slot
//! - **Self-describing delimiters**: read from each message's header
//! - **Escape-aware scanning**: escaped delimiters never split structure
//! - **Streaming**: segments are delivered as they complete, with backpressure
//! - **Cancellation and deadlines**: stop a parse without leaking its producer
//!
//! ## Modules
//!
//! - [`core`]: tokenizer, delimiters and message tree
//! - [`stream`]: thread-backed (and, with `async`, Tokio-backed) streams
//!
//! ### Optional features
//!
//! - `serde`: `Serialize`/`Deserialize` for the message tree
//! - `json`: [`to_json`] and [`to_json_pretty`]
//! - `async`: `AsyncParseStream` on Tokio

pub use hl7_core::{
    decode_escapes, resolve_delimiters, Delimiters, EscapePolicy, ParseError, ParseErrorKind,
    ParseEvent, ParseOptions, ParseOptionsBuilder, ParseResult,
};

// Message tree
pub use hl7_core::{Component, Field, Level, Message, Repetition, Segment, Subcomponent};

pub use hl7_stream::{parse_stream, parse_stream_with_options, parse_with_options, ParseStream};

#[cfg(feature = "async")]
pub use hl7_stream::{parse_async, AsyncParseStream, CancellationSignal};

pub mod core {
    //! Tokenizer, delimiters and message tree
    pub use hl7_core::{
        tokenize, ByteClass, Tokenizer, TokenizerState, HEADER_LEN, HEADER_TAG, LINE_FEED,
        SEGMENT_TERMINATOR,
    };
}

pub mod stream {
    //! Concurrent parse streams
    pub use hl7_stream::{
        parse, parse_stream, parse_stream_with_options, parse_with_options, ParseStream,
    };

    #[cfg(feature = "async")]
    pub use hl7_stream::{parse_async, AsyncParseStream, CancellationSignal};
}

// Convenience functions at crate root

/// Parse a complete HL7 message.
///
/// Runs a [`ParseStream`] to completion; this is the usual entry point.
///
/// # Examples
///
/// ```rust
/// use hl7::{parse, ParseErrorKind};
///
/// let err = parse("XXX|^~\\&|...\r").unwrap_err();
/// assert_eq!(err.kind(), ParseErrorKind::MissingHeaderTag);
/// ```
#[inline]
pub fn parse(input: impl Into<Vec<u8>>) -> ParseResult<Message> {
    hl7_stream::parse(input)
}

/// Parse on the calling thread, without a producer thread.
///
/// Produces the same tree as [`parse`]; deadlines in `options` are ignored.
pub fn parse_inline(input: &[u8], options: &ParseOptions) -> ParseResult<Message> {
    hl7_core::tokenize(input, options.escape)
}

/// Check that input has a valid header.
///
/// Returns `Ok(())` if valid, `Err` with details if invalid. The body is
/// never rejected, so only the header is inspected.
pub fn validate(input: &[u8]) -> ParseResult<()> {
    hl7_core::tokenize(input, EscapePolicy::Preserve).map(|_| ())
}

/// Serialize a message tree to compact JSON (requires `json` feature).
///
/// Every level becomes a nested array and subcomponents become strings.
#[cfg(feature = "json")]
pub fn to_json(message: &Message) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// Serialize a message tree to indented JSON (requires `json` feature).
#[cfg(feature = "json")]
pub fn to_json_pretty(message: &Message) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(message)
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
