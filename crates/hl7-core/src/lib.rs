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

//! Core tokenizer and data model for HL7 v2 messages.
//!
//! This crate turns the raw bytes of a single pipe-delimited HL7 v2 message
//! into a positional [`Message`] tree, emitting a [`ParseEvent`] for every
//! segment as it completes.
//!
//! # Pipeline
//!
//! - [`resolve_delimiters`] reads the five control characters from the header
//! - [`Tokenizer`] classifies body bytes and commits elements bottom-up
//! - [`decode_escapes`] optionally replaces escape sequences in data
//!
//! Threads, cancellation and deadlines live in `hl7-stream`; this crate is
//! synchronous and allocation is limited to the tree itself.
//!
//! # Example
//!
//! ```rust
//! use hl7_core::{tokenize, EscapePolicy};
//!
//! let input = "MSH|^~\\&|SENDER|RECEIVER\rPID|1||12345^^^MRN\r";
//! let message = tokenize(input, EscapePolicy::Preserve).unwrap();
//!
//! assert_eq!(message.len(), 2);
//! assert_eq!(message.value(1, 3, 0, 3, 0), Some(&b"MRN"[..]));
//! ```

mod delimiters;
mod error;
mod escape;
mod event;
mod model;
mod options;
mod tokenizer;

pub use delimiters::{
    resolve_delimiters, ByteClass, Delimiters, HEADER_LEN, HEADER_TAG, LINE_FEED,
    SEGMENT_TERMINATOR,
};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use escape::{decode_escapes, EscapePolicy};
pub use event::ParseEvent;
pub use model::{Component, Field, Level, Message, Repetition, Segment, Subcomponent};
pub use options::{ParseOptions, ParseOptionsBuilder};
pub use tokenizer::{tokenize, Tokenizer, TokenizerState};
