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

//! Delimiter discovery from the message header.
//!
//! An HL7 v2 message declares its own control characters in the first eight
//! bytes of the header segment:
//!
//! ```text
//! MSH|^~\&|...
//! ^^^^^^^^^
//! 0..3  segment tag
//! 3     field delimiter
//! 4     component delimiter
//! 5     repeat delimiter
//! 6     escape character
//! 7     subcomponent delimiter
//! ```

use crate::error::{ParseError, ParseResult};
use crate::model::Level;

/// Tag every message must start with.
pub const HEADER_TAG: &[u8; 3] = b"MSH";

/// Length of the fixed header block (tag plus five control characters).
pub const HEADER_LEN: usize = 8;

/// Segment terminator.
pub const SEGMENT_TERMINATOR: u8 = b'\r';

/// Tolerated alternative segment terminator.
pub const LINE_FEED: u8 = b'\n';

/// The five control characters of a message, resolved once per parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiters {
    /// Separates fields within a segment (conventionally `|`).
    pub field: u8,
    /// Separates components within a repetition (conventionally `^`).
    pub component: u8,
    /// Separates repetitions within a field (conventionally `~`).
    pub repeat: u8,
    /// Opens and closes escape sequences (conventionally `\`).
    pub escape: u8,
    /// Separates subcomponents within a component (conventionally `&`).
    pub subcomponent: u8,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: b'|',
            component: b'^',
            repeat: b'~',
            escape: b'\\',
            subcomponent: b'&',
        }
    }
}

/// How the tokenizer treats a single input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// Carriage return or line feed.
    Terminator,
    /// Structural delimiter closing an element at the given level.
    Delimiter(Level),
    /// Escape character.
    Escape,
    /// Anything else.
    Data,
}

impl Delimiters {
    /// The four encoding characters in header order (component, repeat,
    /// escape, subcomponent).
    pub fn encoding_characters(&self) -> [u8; 4] {
        [self.component, self.repeat, self.escape, self.subcomponent]
    }

    /// Classify a byte.
    ///
    /// Priority follows the header layout: terminators win over the field
    /// delimiter, which wins over repeat, component, subcomponent and escape,
    /// so a header that reuses a byte for two roles still scans deterministically.
    #[inline]
    pub fn classify(&self, byte: u8) -> ByteClass {
        if byte == SEGMENT_TERMINATOR || byte == LINE_FEED {
            ByteClass::Terminator
        } else if byte == self.field {
            ByteClass::Delimiter(Level::Field)
        } else if byte == self.repeat {
            ByteClass::Delimiter(Level::Repetition)
        } else if byte == self.component {
            ByteClass::Delimiter(Level::Component)
        } else if byte == self.subcomponent {
            ByteClass::Delimiter(Level::Subcomponent)
        } else if byte == self.escape {
            ByteClass::Escape
        } else {
            ByteClass::Data
        }
    }
}

/// Read the delimiters from the fixed header offsets.
///
/// # Errors
///
/// - [`ParseError::HeaderTooShort`] if the input is shorter than 8 bytes
/// - [`ParseError::MissingHeaderTag`] if it does not start with `MSH`
///
/// # Examples
///
/// ```rust
/// use hl7_core::resolve_delimiters;
///
/// let delims = resolve_delimiters(b"MSH|^~\\&|SENDER").unwrap();
/// assert_eq!(delims.field, b'|');
/// assert_eq!(delims.subcomponent, b'&');
/// ```
pub fn resolve_delimiters(input: &[u8]) -> ParseResult<Delimiters> {
    if input.len() < HEADER_LEN {
        return Err(ParseError::HeaderTooShort { len: input.len() });
    }

    if !input.starts_with(HEADER_TAG) {
        return Err(ParseError::MissingHeaderTag {
            found: String::from_utf8_lossy(&input[..HEADER_TAG.len()]).into_owned(),
        });
    }

    Ok(Delimiters {
        field: input[3],
        component: input[4],
        repeat: input[5],
        escape: input[6],
        subcomponent: input[7],
    })
}
