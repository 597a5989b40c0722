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

//! Property-based tests for the tokenizer.

use hl7_core::{tokenize, Component, EscapePolicy, Field, Message, ParseEvent, Repetition, Tokenizer};
use proptest::prelude::*;

const HEADER: &str = "MSH|^~\\&|APP";

fn parse(input: &str) -> Message {
    tokenize(input, EscapePolicy::Preserve).unwrap()
}

fn segment_tag() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9]{2}".prop_filter("header tag", |tag| tag != "MSH")
}

fn field_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ^~&]{0,12}"
}

fn segment_line() -> impl Strategy<Value = (String, Vec<String>)> {
    (segment_tag(), prop::collection::vec(field_text(), 0..8))
}

fn render((tag, fields): &(String, Vec<String>)) -> String {
    let mut line = tag.clone();
    for field in fields {
        line.push('|');
        line.push_str(field);
    }
    line
}

/// Element count for text split on `sep`: zero for empty text, else one more
/// than the number of separators.
fn expected_len(text: &str, sep: char) -> usize {
    if text.is_empty() {
        0
    } else {
        1 + text.matches(sep).count()
    }
}

fn check_component(component: &Component, text: &str) -> Result<(), TestCaseError> {
    prop_assert_eq!(component.len(), expected_len(text, '&'));
    for (sub, part) in component.iter().zip(text.split('&')) {
        prop_assert_eq!(sub.as_bytes(), part.as_bytes());
    }
    Ok(())
}

fn check_repetition(repetition: &Repetition, text: &str) -> Result<(), TestCaseError> {
    prop_assert_eq!(repetition.len(), expected_len(text, '^'));
    for (component, part) in repetition.iter().zip(text.split('^')) {
        check_component(component, part)?;
    }
    Ok(())
}

fn check_field(field: &Field, text: &str) -> Result<(), TestCaseError> {
    prop_assert_eq!(field.len(), expected_len(text, '~'));
    for (repetition, part) in field.iter().zip(text.split('~')) {
        check_repetition(repetition, part)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: every level's child count follows from its delimiter count.
    #[test]
    fn prop_positions_follow_delimiters(line in segment_line()) {
        let input = format!("{}\r{}\r", HEADER, render(&line));
        let message = parse(&input);
        prop_assert_eq!(message.len(), 2);

        let segment = message.get(1).unwrap();
        let (tag, fields) = &line;
        prop_assert_eq!(segment.tag(), tag.as_bytes());
        prop_assert_eq!(segment.len(), 1 + fields.len());

        for (field, text) in segment.iter().skip(1).zip(fields) {
            check_field(field, text)?;
        }
    }

    /// Property: CR, CRLF and LF terminators build the same tree.
    #[test]
    fn prop_terminator_styles_agree(lines in prop::collection::vec(segment_line(), 0..10)) {
        let body: Vec<String> = lines.iter().map(render).collect();
        let build = |terminator: &str| {
            let mut input = format!("{}{}", HEADER, terminator);
            for line in &body {
                input.push_str(line);
                input.push_str(terminator);
            }
            parse(&input)
        };

        let cr = build("\r");
        prop_assert_eq!(cr.len(), 1 + lines.len());
        prop_assert_eq!(&cr, &build("\r\n"));
        prop_assert_eq!(&cr, &build("\n"));
    }

    /// Property: parsing the same input twice yields equal trees.
    #[test]
    fn prop_idempotent(lines in prop::collection::vec(segment_line(), 0..6)) {
        let mut input = String::from(HEADER);
        for line in &lines {
            input.push('\r');
            input.push_str(&render(line));
        }
        prop_assert_eq!(parse(&input), parse(&input));
    }

    /// Property: any body after a valid header parses to completion.
    #[test]
    fn prop_arbitrary_body_finishes(body in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut input = HEADER.as_bytes().to_vec();
        input.extend_from_slice(&body);
        prop_assert!(tokenize(&input, EscapePolicy::Preserve).is_ok());
    }

    /// Property: arbitrary input ends in exactly one terminal event.
    #[test]
    fn prop_single_terminal_event(input in prop::collection::vec(any::<u8>(), 0..64)) {
        let events: Vec<ParseEvent> = Tokenizer::new(&input).collect();
        let terminal = events.iter().filter(|e| e.is_terminal()).count();
        prop_assert_eq!(terminal, 1);
        prop_assert!(events.last().map_or(false, ParseEvent::is_terminal));
        if let Some(ParseEvent::ParseFailed { error }) = events.last() {
            prop_assert!(error.is_header_error());
            prop_assert_eq!(events.len(), 1);
        }
    }

    /// Property: segment events carry exactly the segments of the final tree.
    #[test]
    fn prop_events_match_tree(lines in prop::collection::vec(segment_line(), 0..6)) {
        let mut input = String::from(HEADER);
        for line in &lines {
            input.push('\n');
            input.push_str(&render(line));
        }

        let mut streamed = Vec::new();
        let mut finished = None;
        for event in Tokenizer::new(&input) {
            match event {
                ParseEvent::SegmentCompleted { segment, .. } => streamed.push((*segment).clone()),
                ParseEvent::ParseFinished { message } => finished = Some(message),
                ParseEvent::ParseFailed { error } => prop_assert!(false, "unexpected failure: {}", error),
            }
        }
        prop_assert_eq!(finished, Some(Message::new(streamed)));
    }
}
