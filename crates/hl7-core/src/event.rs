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

//! Parse progress events.
//!
//! # Event Flow
//!
//! For `MSH|^~\&|A\rPID|1\r` a parse yields:
//!
//! ```text
//! SegmentCompleted { tag: "MSH", .. }
//! SegmentCompleted { tag: "PID", .. }
//! ParseFinished { message }
//! ```
//!
//! Exactly one terminal event (`ParseFinished` or `ParseFailed`) ends every
//! parse that is not cancelled.

use crate::error::{ParseError, ParseResult};
use crate::model::{Message, Segment};
use std::sync::Arc;

/// Event emitted while parsing a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A segment was committed to the message.
    SegmentCompleted {
        /// Segment tag as text.
        tag: String,
        /// The completed segment, shared with the message under construction
        /// until the event is dropped.
        segment: Arc<Segment>,
    },

    /// The whole message was parsed.
    ParseFinished {
        /// The completed message tree.
        message: Message,
    },

    /// Parsing stopped.
    ParseFailed {
        /// Why parsing stopped.
        error: ParseError,
    },
}

impl ParseEvent {
    pub(crate) fn segment(segment: Arc<Segment>) -> Self {
        Self::SegmentCompleted {
            tag: segment.name().into_owned(),
            segment,
        }
    }

    /// Wrap an error as a terminal event.
    pub fn failed(error: ParseError) -> Self {
        Self::ParseFailed { error }
    }

    /// Check if this event ends the stream.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::SegmentCompleted { .. })
    }

    /// Get the segment if this is a segment event.
    #[inline]
    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Self::SegmentCompleted { segment, .. } => Some(segment.as_ref()),
            _ => None,
        }
    }

    /// Convert a terminal event into the parse outcome.
    ///
    /// Returns `None` for segment events.
    pub fn into_result(self) -> Option<ParseResult<Message>> {
        match self {
            Self::SegmentCompleted { .. } => None,
            Self::ParseFinished { message } => Some(Ok(message)),
            Self::ParseFailed { error } => Some(Err(error)),
        }
    }
}
