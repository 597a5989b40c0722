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

//! Escape sequence handling.
//!
//! The tokenizer never splits structure inside an escape run, whichever
//! policy is selected. The policy only decides what ends up in the
//! [`Subcomponent`](crate::Subcomponent) bytes.
//!
//! # Decoded sequences
//!
//! | Sequence  | Decodes to                 |
//! |-----------|----------------------------|
//! | `\F\`     | field delimiter            |
//! | `\S\`     | component delimiter        |
//! | `\T\`     | subcomponent delimiter     |
//! | `\R\`     | repeat delimiter           |
//! | `\E\`     | escape character           |
//! | `\Xhh..\` | the hex-encoded bytes      |
//!
//! Anything else (formatting commands such as `\.br\`, character set
//! switches, malformed hex) is kept verbatim.

use crate::delimiters::Delimiters;
use memchr::memchr;
use std::borrow::Cow;

/// What to store for escape sequences found in data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapePolicy {
    /// Keep escape sequences as literal bytes.
    #[default]
    Preserve,
    /// Replace known escape sequences with the bytes they represent.
    Decode,
}

/// Decode the escape sequences of one subcomponent.
///
/// Returns the input unchanged (borrowed) when it contains no escape byte.
///
/// # Examples
///
/// ```rust
/// use hl7_core::{decode_escapes, Delimiters};
///
/// let delims = Delimiters::default();
/// assert_eq!(&*decode_escapes(b"A\\F\\B", &delims), b"A|B");
/// assert_eq!(&*decode_escapes(b"\\X0D0A\\", &delims), b"\r\n");
/// assert_eq!(&*decode_escapes(b"line\\.br\\", &delims), b"line\\.br\\");
/// ```
pub fn decode_escapes<'a>(data: &'a [u8], delimiters: &Delimiters) -> Cow<'a, [u8]> {
    let escape = delimiters.escape;
    let Some(first) = memchr(escape, data) else {
        return Cow::Borrowed(data);
    };

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..first]);
    let mut pos = first;

    while pos < data.len() {
        if data[pos] != escape {
            let next = memchr(escape, &data[pos..]).map_or(data.len(), |i| pos + i);
            out.extend_from_slice(&data[pos..next]);
            pos = next;
            continue;
        }

        // Unterminated run: keep the remainder as is.
        let Some(len) = memchr(escape, &data[pos + 1..]) else {
            out.extend_from_slice(&data[pos..]);
            break;
        };
        let close = pos + 1 + len;
        let body = &data[pos + 1..close];

        match decode_sequence(body, delimiters) {
            Some(decoded) => out.extend_from_slice(&decoded),
            None => out.extend_from_slice(&data[pos..=close]),
        }
        pos = close + 1;
    }

    Cow::Owned(out)
}

fn decode_sequence(body: &[u8], delimiters: &Delimiters) -> Option<Vec<u8>> {
    match body {
        b"F" => Some(vec![delimiters.field]),
        b"S" => Some(vec![delimiters.component]),
        b"T" => Some(vec![delimiters.subcomponent]),
        b"R" => Some(vec![delimiters.repeat]),
        b"E" => Some(vec![delimiters.escape]),
        [b'X', hex @ ..] => decode_hex(hex),
        _ => None,
    }
}

fn decode_hex(hex: &[u8]) -> Option<Vec<u8>> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }
    hex.chunks_exact(2)
        .map(|pair| Some((hex_value(pair[0])? << 4) | hex_value(pair[1])?))
        .collect()
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
