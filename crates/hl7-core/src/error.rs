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

//! Error types for HL7 parsing.
//!
//! Every failure is detected either while the header is set up or by the
//! stream wrapper (cancellation, deadline). The body scan itself never fails:
//! unexpected content surfaces as shorter field or component sequences.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The kind of error that occurred, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Input shorter than the fixed header block.
    HeaderTooShort,
    /// Input does not start with the header segment tag.
    MissingHeaderTag,
    /// Byte 8 is not the declared field delimiter.
    HeaderDelimiterMismatch,
    /// The consumer requested early termination.
    Cancelled,
    /// The configured deadline elapsed.
    Timeout,
    /// The producer could not be started or exited without a result.
    ProducerUnavailable,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderTooShort => write!(f, "HeaderTooShort"),
            Self::MissingHeaderTag => write!(f, "MissingHeaderTag"),
            Self::HeaderDelimiterMismatch => write!(f, "HeaderDelimiterMismatch"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Timeout => write!(f, "Timeout"),
            Self::ProducerUnavailable => write!(f, "ProducerUnavailable"),
        }
    }
}

/// An error that terminated a parse.
///
/// # Examples
///
/// ```rust
/// use hl7_core::{resolve_delimiters, ParseError, ParseErrorKind};
///
/// let err = resolve_delimiters(b"MSH|").unwrap_err();
/// assert_eq!(err, ParseError::HeaderTooShort { len: 4 });
/// assert_eq!(err.kind(), ParseErrorKind::HeaderTooShort);
/// assert!(err.to_string().contains("4 bytes"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input shorter than the 8-byte header block.
    #[error("message too short: {len} bytes, the header block needs 8")]
    HeaderTooShort { len: usize },

    /// The first three bytes are not `MSH`.
    #[error("missing header: expected segment tag \"MSH\", found {found:?}")]
    MissingHeaderTag { found: String },

    /// The byte following the encoding characters is not the field delimiter.
    #[error("invalid header: expected field delimiter {expected:?} at offset 8, found {found:?}")]
    HeaderDelimiterMismatch { expected: char, found: char },

    /// The stream was cancelled before the parse finished.
    #[error("parse cancelled")]
    Cancelled,

    /// The deadline elapsed before the parse finished.
    #[error("parse timeout: elapsed {elapsed:?} exceeded limit {limit:?}")]
    Timeout { elapsed: Duration, limit: Duration },

    /// The parse producer never ran, or stopped before its terminal event.
    #[error("parse producer unavailable: {reason}")]
    ProducerUnavailable { reason: String },
}

impl ParseError {
    /// Get the kind of this error.
    #[inline]
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::HeaderTooShort { .. } => ParseErrorKind::HeaderTooShort,
            Self::MissingHeaderTag { .. } => ParseErrorKind::MissingHeaderTag,
            Self::HeaderDelimiterMismatch { .. } => ParseErrorKind::HeaderDelimiterMismatch,
            Self::Cancelled => ParseErrorKind::Cancelled,
            Self::Timeout { .. } => ParseErrorKind::Timeout,
            Self::ProducerUnavailable { .. } => ParseErrorKind::ProducerUnavailable,
        }
    }

    /// True for errors caused by a malformed header rather than by the stream.
    #[inline]
    pub fn is_header_error(&self) -> bool {
        matches!(
            self.kind(),
            ParseErrorKind::HeaderTooShort
                | ParseErrorKind::MissingHeaderTag
                | ParseErrorKind::HeaderDelimiterMismatch
        )
    }
}

/// Result type for HL7 parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
