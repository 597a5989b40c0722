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

//! Hierarchical tokenizer.
//!
//! The tokenizer resolves the delimiters from the header, then classifies
//! every following byte and commits elements bottom-up through five levels
//! (subcomponent, component, repetition, field, segment).
//!
//! # Commit Cascade
//!
//! Committing a level first commits every level below it *unforced* (only if
//! something is open there), then moves the element at that level into its
//! parent. A *forced* commit materializes an empty element when nothing is
//! open. Each delimiter forces a commit at its own level and re-opens that
//! level, so the element after the delimiter exists even if it stays empty.
//! That makes cardinality a function of delimiter count:
//!
//! ```text
//! PID|1||12345^^^MRN
//!    ^ ^^     ^^^
//!    | ||     ||+- component 3 "MRN"
//!    | ||     |+-- empty component 2
//!    | ||     +--- empty component 1
//!    | |+--------- field 3
//!    | +---------- empty field 2 (zero repetitions)
//!    +------------ field 1 "1"
//! ```
//!
//! # Terminators
//!
//! CR and LF both end a segment unless the previous byte was already a
//! terminator, so CR, LF, CRLF and LFCR line endings produce the same tree
//! and blank lines never produce phantom segments.
//!
//! # Header
//!
//! The byte after the encoding characters must be the field delimiter. Input
//! that ends right after the encoding characters is a header-only message;
//! any other byte there, a terminator included, is
//! [`ParseError::HeaderDelimiterMismatch`].
//!
//! # Escapes
//!
//! An escape byte opens a run that the next escape byte closes. Delimiters
//! inside the run are data. A terminator inside the run closes it and still
//! ends the segment.

use crate::delimiters::{resolve_delimiters, ByteClass, Delimiters, HEADER_LEN, HEADER_TAG};
use crate::error::{ParseError, ParseResult};
use crate::escape::{decode_escapes, EscapePolicy};
use crate::event::ParseEvent;
use crate::model::{Component, Field, Level, Message, Repetition, Segment, Subcomponent};
use std::borrow::Cow;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Where the tokenizer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    /// Nothing consumed yet.
    Start,
    /// Resolving delimiters and materializing the header fields.
    ParsingHeader,
    /// Classifying body bytes.
    ScanningBody,
    /// `ParseFinished` has been emitted.
    Done,
    /// `ParseFailed` has been emitted.
    Failed,
}

/// An open element at one level.
#[derive(Debug)]
enum Partial {
    Data(Vec<u8>),
    Component(Component),
    Repetition(Repetition),
    Field(Field),
    Segment(Segment),
}

impl Partial {
    fn empty(level: Level) -> Self {
        match level {
            Level::Subcomponent => Self::Data(Vec::new()),
            Level::Component => Self::Component(Component::default()),
            Level::Repetition => Self::Repetition(Repetition::default()),
            Level::Field => Self::Field(Field::default()),
            Level::Segment => Self::Segment(Segment::default()),
        }
    }

    fn level(&self) -> Level {
        match self {
            Self::Data(_) => Level::Subcomponent,
            Self::Component(_) => Level::Component,
            Self::Repetition(_) => Level::Repetition,
            Self::Field(_) => Level::Field,
            Self::Segment(_) => Level::Segment,
        }
    }

    /// Move a completed child one level down into this element.
    fn adopt(&mut self, child: Partial) {
        match (self, child) {
            (Self::Component(parent), Self::Data(bytes)) => parent.push(Subcomponent::from(bytes)),
            (Self::Repetition(parent), Self::Component(child)) => parent.push(child),
            (Self::Field(parent), Self::Repetition(child)) => parent.push(child),
            (Self::Segment(parent), Self::Field(child)) => parent.push(child),
            // Slots are indexed by level, so a parent always sits one level above its child.
            (parent, child) => unreachable!("a {} cannot hold a {}", parent.level(), child.level()),
        }
    }

    fn into_segment(self) -> Option<Segment> {
        match self {
            Self::Segment(segment) => Some(segment),
            _ => None,
        }
    }
}

/// Open elements indexed by [`Level::index`].
#[derive(Debug, Default)]
struct LevelStack {
    slots: [Option<Partial>; Level::COUNT],
}

impl LevelStack {
    fn push_byte(&mut self, byte: u8) {
        let slot = &mut self.slots[Level::Subcomponent.index()];
        match slot.get_or_insert_with(|| Partial::empty(Level::Subcomponent)) {
            Partial::Data(buf) => buf.push(byte),
            other => unreachable!("subcomponent slot holds a {}", other.level()),
        }
    }

    fn open(&mut self, level: Level) {
        self.slots[level.index()].get_or_insert_with(|| Partial::empty(level));
    }

    fn replace(&mut self, partial: Partial) {
        let index = partial.level().index();
        self.slots[index] = Some(partial);
    }

    fn has_open(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Commit `level`, cascading unforced commits below it.
    ///
    /// Returns the segment when `level` is [`Level::Segment`] and something
    /// was committed.
    fn commit(&mut self, level: Level, force: bool, decode: Option<&Delimiters>) -> Option<Segment> {
        if let Some(below) = level.below() {
            self.commit(below, false, decode);
        }

        let partial = match self.slots[level.index()].take() {
            Some(partial) => partial,
            None if force => Partial::empty(level),
            None => return None,
        };

        let partial = match (partial, decode) {
            (Partial::Data(bytes), Some(delimiters)) => Partial::Data(decoded(bytes, delimiters)),
            (partial, _) => partial,
        };

        match level.above() {
            Some(parent) => {
                self.slots[parent.index()]
                    .get_or_insert_with(|| Partial::empty(parent))
                    .adopt(partial);
                None
            }
            None => partial.into_segment(),
        }
    }
}

fn decoded(bytes: Vec<u8>, delimiters: &Delimiters) -> Vec<u8> {
    let owned = match decode_escapes(&bytes, delimiters) {
        Cow::Owned(out) => Some(out),
        Cow::Borrowed(_) => None,
    };
    owned.unwrap_or(bytes)
}

/// Stateful HL7 tokenizer.
///
/// Yields [`ParseEvent`]s in document order: one `SegmentCompleted` per
/// segment, then exactly one `ParseFinished` or `ParseFailed`, then `None`.
///
/// # Examples
///
/// ```rust
/// use hl7_core::{ParseEvent, Tokenizer};
///
/// let input = "MSH|^~\\&|SENDER|RECEIVER\rPID|1||12345^^^MRN\r";
/// let tags: Vec<String> = Tokenizer::new(input)
///     .filter_map(|event| match event {
///         ParseEvent::SegmentCompleted { tag, .. } => Some(tag),
///         _ => None,
///     })
///     .collect();
///
/// assert_eq!(tags, vec!["MSH", "PID"]);
/// ```
#[derive(Debug)]
pub struct Tokenizer<B> {
    input: B,
    pos: usize,
    state: TokenizerState,
    delimiters: Option<Delimiters>,
    policy: EscapePolicy,
    stack: LevelStack,
    /// Committed segments, shared with the `SegmentCompleted` events.
    segments: Vec<Arc<Segment>>,
    separator_seen: bool,
    in_escape: bool,
}

impl<B: AsRef<[u8]>> Tokenizer<B> {
    /// Create a tokenizer that preserves escape sequences.
    pub fn new(input: B) -> Self {
        Self::with_policy(input, EscapePolicy::default())
    }

    /// Create a tokenizer with an explicit escape policy.
    pub fn with_policy(input: B, policy: EscapePolicy) -> Self {
        Self {
            input,
            pos: 0,
            state: TokenizerState::Start,
            delimiters: None,
            policy,
            stack: LevelStack::default(),
            segments: Vec::new(),
            separator_seen: false,
            in_escape: false,
        }
    }

    #[inline]
    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Delimiters, once the header has been resolved.
    #[inline]
    pub fn delimiters(&self) -> Option<Delimiters> {
        self.delimiters
    }

    /// Number of input bytes consumed so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn step(&mut self) -> Option<ParseEvent> {
        match self.state {
            TokenizerState::Start | TokenizerState::ParsingHeader => {
                if let Err(error) = self.begin() {
                    return Some(ParseEvent::failed(error));
                }
                self.step()
            }
            TokenizerState::ScanningBody => match self.scan_segment() {
                Some(segment) => Some(ParseEvent::segment(segment)),
                None => Some(ParseEvent::ParseFinished {
                    message: self.finish(),
                }),
            },
            TokenizerState::Done | TokenizerState::Failed => None,
        }
    }

    fn begin(&mut self) -> ParseResult<()> {
        debug!(len = self.input.as_ref().len(), "parse started");
        self.state = TokenizerState::ParsingHeader;
        if let Err(error) = self.setup() {
            warn!(%error, "header rejected");
            self.state = TokenizerState::Failed;
            return Err(error);
        }
        self.state = TokenizerState::ScanningBody;
        Ok(())
    }

    /// Hand the committed segments over as a message.
    ///
    /// A segment whose event is still held elsewhere is copied; every other
    /// segment is moved.
    fn finish(&mut self) -> Message {
        self.state = TokenizerState::Done;
        debug!(segments = self.segments.len(), "parse finished");
        std::mem::take(&mut self.segments)
            .into_iter()
            .map(|segment| {
                Arc::try_unwrap(segment).unwrap_or_else(|shared| Segment::clone(&shared))
            })
            .collect()
    }

    /// Resolve delimiters and open the header segment with its three
    /// special-cased fields: the tag, the field delimiter and the encoding
    /// characters.
    fn setup(&mut self) -> ParseResult<()> {
        let input = self.input.as_ref();
        let delimiters = resolve_delimiters(input)?;

        let header = Segment::new(vec![
            Field::from_bytes(&input[..HEADER_TAG.len()]),
            Field::from_bytes([delimiters.field]),
            Field::from_bytes(&input[HEADER_TAG.len() + 1..HEADER_LEN]),
        ]);

        self.stack.replace(Partial::Segment(header));
        self.pos = HEADER_LEN;

        match input.get(HEADER_LEN) {
            None => {}
            Some(&found) if found == delimiters.field => {
                // The delimiter after the encoding characters opens field 3.
                self.stack.open(Level::Field);
                self.pos += 1;
            }
            Some(&found) => {
                return Err(ParseError::HeaderDelimiterMismatch {
                    expected: char::from(delimiters.field),
                    found: char::from(found),
                });
            }
        }

        debug!(?delimiters, "delimiters resolved");
        self.delimiters = Some(delimiters);
        Ok(())
    }

    /// Scan until the next segment completes or the input ends.
    fn scan_segment(&mut self) -> Option<Arc<Segment>> {
        let delimiters = self.delimiters?;

        loop {
            let byte = match self.input.as_ref().get(self.pos) {
                Some(&byte) => byte,
                None => break,
            };
            self.pos += 1;

            if let Some(segment) = self.consume(byte, &delimiters) {
                return Some(segment);
            }
        }

        // Trailing content without a terminator.
        if self.stack.has_open() {
            return self.commit(Level::Segment, true, &delimiters);
        }
        None
    }

    fn consume(&mut self, byte: u8, delimiters: &Delimiters) -> Option<Arc<Segment>> {
        match delimiters.classify(byte) {
            ByteClass::Terminator => {
                self.in_escape = false;
                let boundary = !self.separator_seen;
                self.separator_seen = true;
                if boundary {
                    return self.commit(Level::Segment, true, delimiters);
                }
            }
            ByteClass::Delimiter(level) if !self.in_escape => {
                self.separator_seen = false;
                self.commit(level, true, delimiters);
                self.stack.open(level);
            }
            ByteClass::Escape => {
                self.separator_seen = false;
                self.in_escape = !self.in_escape;
                self.stack.push_byte(byte);
            }
            ByteClass::Delimiter(_) | ByteClass::Data => {
                self.separator_seen = false;
                self.stack.push_byte(byte);
            }
        }
        None
    }

    fn commit(&mut self, level: Level, force: bool, delimiters: &Delimiters) -> Option<Arc<Segment>> {
        let decode = (self.policy == EscapePolicy::Decode).then_some(delimiters);
        let segment = Arc::new(self.stack.commit(level, force, decode)?);

        trace!(tag = %segment.name(), fields = segment.len(), offset = self.pos, "segment committed");
        self.segments.push(Arc::clone(&segment));
        Some(segment)
    }

    /// Scan the whole input without producing events.
    fn run(mut self) -> ParseResult<Message> {
        self.begin()?;
        while self.scan_segment().is_some() {}
        Ok(self.finish())
    }
}

/// Tokenize a complete message on the calling thread.
///
/// Builds the same tree as draining a [`Tokenizer`] to its
/// `ParseFinished` event.
///
/// # Errors
///
/// Returns the header error that would end the event sequence.
///
/// # Examples
///
/// ```rust
/// use hl7_core::{tokenize, EscapePolicy};
///
/// let message = tokenize("MSH|^~\\&|A\rPID|1||x^y\r", EscapePolicy::Preserve).unwrap();
/// assert_eq!(message.len(), 2);
/// ```
pub fn tokenize<B: AsRef<[u8]>>(input: B, policy: EscapePolicy) -> ParseResult<Message> {
    Tokenizer::with_policy(input, policy).run()
}

impl<B: AsRef<[u8]>> Iterator for Tokenizer<B> {
    type Item = ParseEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}

impl<B: AsRef<[u8]>> FusedIterator for Tokenizer<B> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn parse(input: &str) -> Message {
        tokenize(input, EscapePolicy::Preserve).unwrap()
    }

    fn parse_decoded(input: &str) -> Message {
        tokenize(input, EscapePolicy::Decode).unwrap()
    }

    fn parse_err(input: &[u8]) -> ParseError {
        tokenize(input, EscapePolicy::Preserve).unwrap_err()
    }

    /// Text of every field, using the first subcomponent of the first component.
    fn field_texts(segment: &Segment) -> Vec<String> {
        segment
            .iter()
            .map(|f| String::from_utf8_lossy(f.first_bytes().unwrap_or_default()).into_owned())
            .collect()
    }

    fn component_texts(field: &Field) -> Vec<String> {
        field
            .get(0)
            .map(|rep| {
                rep.iter()
                    .map(|c| String::from_utf8_lossy(c.first_bytes().unwrap_or_default()).into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    // ==================== Positional structure ====================

    #[test]
    fn test_empty_field_preservation() {
        let message = parse("MSH|^~\\&|SENDER|RECEIVER\rPID|1||12345^^^MRN\r");
        assert_eq!(message.len(), 2);

        let msh = message.get(0).unwrap();
        assert_eq!(msh.tag(), b"MSH");
        assert_eq!(
            field_texts(msh),
            vec!["MSH", "|", "^~\\&", "SENDER", "RECEIVER"]
        );

        let pid = message.get(1).unwrap();
        assert_eq!(pid.tag(), b"PID");
        assert_eq!(pid.len(), 4);
        assert!(pid.get(2).unwrap().is_empty());
        assert_eq!(
            component_texts(pid.get(3).unwrap()),
            vec!["12345", "", "", "MRN"]
        );
    }

    #[test]
    fn test_header_fields_are_single_values() {
        let message = parse("MSH|^~\\&|A\r");
        let msh = message.get(0).unwrap();
        let encoding = msh.get(2).unwrap();
        assert_eq!(encoding.len(), 1);
        assert_eq!(encoding.get(0).unwrap().len(), 1);
        assert_eq!(encoding.first_bytes(), Some(&b"^~\\&"[..]));
    }

    #[test]
    fn test_trailing_field_delimiter_opens_empty_field() {
        let message = parse("MSH|^~\\&|A\rPID|1|\r");
        let pid = message.get(1).unwrap();
        assert_eq!(pid.len(), 3);
        assert!(pid.get(2).unwrap().is_empty());
    }

    #[test]
    fn test_consecutive_field_delimiters() {
        let message = parse("MSH|^~\\&|A\rZZZ||||\r");
        let zzz = message.get(1).unwrap();
        assert_eq!(zzz.len(), 5);
        assert!(zzz.iter().skip(1).all(Field::is_empty));
    }

    #[test]
    fn test_repetitions() {
        let message = parse("MSH|^~\\&|A\rPID|1|A~B~~C\r");
        let field = message.get(1).unwrap().get(2).unwrap();
        assert_eq!(field.len(), 4);
        assert!(field.get(2).unwrap().is_empty());
        assert_eq!(field.get(3).unwrap().get(0).unwrap().first_bytes(), Some(&b"C"[..]));
    }

    #[test]
    fn test_trailing_repeat_delimiter() {
        let message = parse("MSH|^~\\&|A\rPID|A~\r");
        let field = message.get(1).unwrap().get(1).unwrap();
        assert_eq!(field.len(), 2);
        assert!(field.get(1).unwrap().is_empty());
    }

    #[test]
    fn test_subcomponents() {
        let message = parse("MSH|^~\\&|A\rPID|1|X&Y&&Z^Q\r");
        let rep = message.get(1).unwrap().get(2).unwrap().get(0).unwrap();
        assert_eq!(rep.len(), 2);
        let comp = rep.get(0).unwrap();
        let subs: Vec<String> = comp.iter().map(|s| s.to_string()).collect();
        assert_eq!(subs, vec!["X", "Y", "", "Z"]);
    }

    #[test]
    fn test_leading_component_delimiter() {
        let message = parse("MSH|^~\\&|A\rPID|^X\r");
        let rep = message.get(1).unwrap().get(1).unwrap().get(0).unwrap();
        assert_eq!(rep.len(), 2);
        assert!(rep.get(0).unwrap().is_empty());
    }

    #[test]
    fn test_custom_delimiters() {
        let message = parse("MSH#!@$%#APP#A!B@C%D\r");
        let msh = message.get(0).unwrap();
        assert_eq!(field_texts(msh)[..3], ["MSH", "#", "!@$%"]);
        let field = msh.get(4).unwrap();
        assert_eq!(field.len(), 2);
        assert_eq!(field.get(0).unwrap().len(), 2);
        assert_eq!(field.get(1).unwrap().get(0).unwrap().len(), 2);
    }

    // ==================== Terminators ====================

    #[test]
    fn test_terminator_styles_agree() {
        let cr = parse("MSH|^~\\&|A\rPID|1\rOBX|2\r");
        let crlf = parse("MSH|^~\\&|A\r\nPID|1\r\nOBX|2\r\n");
        let lf = parse("MSH|^~\\&|A\nPID|1\nOBX|2\n");
        assert_eq!(cr.len(), 3);
        assert_eq!(cr, crlf);
        assert_eq!(cr, lf);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let message = parse("MSH|^~\\&|A\r\r\n\r\nPID|1\r\r");
        assert_eq!(message.len(), 2);
    }

    #[test]
    fn test_trailing_data_without_terminator() {
        let message = parse("MSH|^~\\&|A\rPID|1|LAST");
        assert_eq!(message.len(), 2);
        assert_eq!(field_texts(message.get(1).unwrap()), vec!["PID", "1", "LAST"]);
    }

    #[test]
    fn test_trailing_delimiter_without_terminator() {
        let message = parse("MSH|^~\\&|A\rPID|");
        assert_eq!(message.get(1).unwrap().len(), 2);
    }

    #[test]
    fn test_header_only_message() {
        let message = parse("MSH|^~\\&");
        assert_eq!(message.len(), 1);
        assert_eq!(message.get(0).unwrap().len(), 3);
    }

    #[test]
    fn test_header_with_empty_field_three() {
        let message = parse("MSH|^~\\&|\r");
        let msh = message.get(0).unwrap();
        assert_eq!(msh.len(), 4);
        assert!(msh.get(3).unwrap().is_empty());
    }

    // ==================== Escapes ====================

    #[test]
    fn test_escape_preserved_and_not_split() {
        let message = parse("MSH|^~\\&|A\rNTE|1|a\\F\\b\\S\\c\r");
        let field = message.get(1).unwrap().get(2).unwrap();
        assert_eq!(field.len(), 1);
        assert_eq!(field.get(0).unwrap().len(), 1);
        assert_eq!(field.first_bytes(), Some(&b"a\\F\\b\\S\\c"[..]));
    }

    #[test]
    fn test_delimiter_inside_escape_run_is_data() {
        let message = parse("MSH|^~\\&|A\rNTE|\\^|~\\x|next\r");
        let nte = message.get(1).unwrap();
        assert_eq!(nte.len(), 3);
        assert_eq!(nte.get(1).unwrap().first_bytes(), Some(&b"\\^|~\\x"[..]));
    }

    #[test]
    fn test_escape_decoded() {
        let message = parse_decoded("MSH|^~\\&|A\rNTE|1|a\\F\\b\\T\\c\r");
        let field = message.get(1).unwrap().get(2).unwrap();
        assert_eq!(field.first_bytes(), Some(&b"a|b&c"[..]));
        assert_eq!(field.get(0).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_does_not_touch_header() {
        let message = parse_decoded("MSH|^~\\&|A\r");
        assert_eq!(message.get(0).unwrap().get(2).unwrap().first_bytes(), Some(&b"^~\\&"[..]));
    }

    #[test]
    fn test_unterminated_escape_closed_by_terminator() {
        let message = parse("MSH|^~\\&|A\rNTE|\\open\rPID|1|2\r");
        assert_eq!(message.len(), 3);
        assert_eq!(message.get(2).unwrap().len(), 3);
    }

    // ==================== Events and states ====================

    #[test]
    fn test_event_order() {
        let events: Vec<ParseEvent> = Tokenizer::new("MSH|^~\\&|A\rPID|1\rOBX|1\r").collect();
        assert_eq!(events.len(), 4);
        let tags: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                ParseEvent::SegmentCompleted { tag, .. } => Some(tag.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tags, vec!["MSH", "PID", "OBX"]);
        match events.last() {
            Some(ParseEvent::ParseFinished { message }) => assert_eq!(message.len(), 3),
            other => panic!("Expected ParseFinished, got {:?}", other),
        }
    }

    #[test]
    fn test_segment_event_matches_message() {
        let mut tokenizer = Tokenizer::new("MSH|^~\\&|A\rPID|1\r");
        let first = tokenizer.next().unwrap();
        let second = tokenizer.next().unwrap();
        let finished = tokenizer.next().unwrap();
        let message = finished.into_result().unwrap().unwrap();
        assert_eq!(first.as_segment(), message.get(0));
        assert_eq!(second.as_segment(), message.get(1));
    }

    #[test]
    fn test_state_transitions() {
        let mut tokenizer = Tokenizer::new("MSH|^~\\&|A\r");
        assert_eq!(tokenizer.state(), TokenizerState::Start);
        assert!(tokenizer.delimiters().is_none());

        tokenizer.next();
        assert_eq!(tokenizer.state(), TokenizerState::ScanningBody);
        assert_eq!(tokenizer.delimiters(), Some(Delimiters::default()));

        tokenizer.next();
        assert_eq!(tokenizer.state(), TokenizerState::Done);
        assert!(tokenizer.next().is_none());
        assert_eq!(tokenizer.offset(), 11);
    }

    #[test]
    fn test_failed_state_is_terminal() {
        let mut tokenizer = Tokenizer::new("");
        assert!(matches!(
            tokenizer.next(),
            Some(ParseEvent::ParseFailed { .. })
        ));
        assert_eq!(tokenizer.state(), TokenizerState::Failed);
        assert!(tokenizer.next().is_none());
    }

    // ==================== Header errors ====================

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_err(b"").kind(), ParseErrorKind::HeaderTooShort);
    }

    #[test]
    fn test_missing_header_tag() {
        assert_eq!(
            parse_err(b"XXX|^~\\&|...\r").kind(),
            ParseErrorKind::MissingHeaderTag
        );
    }

    #[test]
    fn test_header_delimiter_mismatch() {
        let err = parse_err(b"MSH|^~\\&X...");
        assert_eq!(
            err,
            ParseError::HeaderDelimiterMismatch {
                expected: '|',
                found: 'X'
            }
        );
    }

    #[test]
    fn test_terminator_after_encoding_characters_rejected() {
        for input in [&b"MSH|^~\\&\rPID|1\r"[..], b"MSH|^~\\&\nPID|1\n"] {
            let err = parse_err(input);
            assert_eq!(err.kind(), ParseErrorKind::HeaderDelimiterMismatch);
        }
        assert_eq!(
            parse_err(b"MSH|^~\\&\r"),
            ParseError::HeaderDelimiterMismatch {
                expected: '|',
                found: '\r'
            }
        );

        let events: Vec<ParseEvent> = Tokenizer::new("MSH|^~\\&\rPID|1\r").collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ParseEvent::ParseFailed { .. }));
    }

    #[test]
    fn test_failure_emits_no_segments() {
        let events: Vec<ParseEvent> = Tokenizer::new(&b"MSH|^~\\&X|A\rPID|1\r"[..]).collect();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_terminal());
    }

    #[test]
    fn test_tokenize_matches_drained_events() {
        let input = "MSH|^~\\&|A\rPID|1||x^y\rOBX|1\r";
        let drained = Tokenizer::new(input)
            .find_map(|event| event.into_result())
            .unwrap()
            .unwrap();
        assert_eq!(tokenize(input, EscapePolicy::Preserve).unwrap(), drained);
    }

    #[test]
    fn test_drained_tokenizer_stays_finished() {
        let mut tokenizer = Tokenizer::new("MSH|^~\\&|A\r");
        while tokenizer.next().is_some() {}
        assert_eq!(tokenizer.state(), TokenizerState::Done);
        assert!(tokenizer.next().is_none());
        assert!(tokenize("MSH|^~\\&|A\r", EscapePolicy::Preserve).is_ok());
    }

    #[test]
    fn test_released_segments_move_into_message() {
        let fields_ptr = |segment: &Segment| segment.as_slice().as_ptr() as usize;

        let mut tokenizer = Tokenizer::new("MSH|^~\\&|A\rPID|1\r");
        let released = tokenizer.next().unwrap();
        let released_ptr = released.as_segment().map(fields_ptr);
        drop(released);

        let held = tokenizer.next().unwrap();
        let message = tokenizer.next().unwrap().into_result().unwrap().unwrap();

        assert_eq!(message.get(0).map(fields_ptr), released_ptr);
        assert_eq!(held.as_segment(), message.get(1));
        assert_ne!(held.as_segment().map(fields_ptr), message.get(1).map(fields_ptr));
    }

    #[test]
    fn test_idempotent() {
        let input = "MSH|^~\\&|A|B\rPID|1||x^y~z\rOBX|1|ST|||\r";
        assert_eq!(parse(input), parse(input));
    }
}
