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

//! End-to-end tokenizer tests over realistic messages.

use hl7_core::{tokenize, EscapePolicy, Message, ParseError, ParseErrorKind, ParseEvent, Tokenizer};

const ADT_A01: &str = concat!(
    "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|GHH LAB|GHH|198808181126|SECURITY|ADT^A01^ADT_A01|MSG00001|P|2.5\r",
    "EVN|A01|198808181123\r",
    "PID|1||PATID1234^5^M11^ADT1^MR^GOOD HEALTH HOSPITAL~123456789^^^USSSA^SS||EVERYMAN^ADAM^A^III||19610615|M\r",
    "NK1|1|NUCLEAR^NELDA^W|SPO^SPOUSE\r",
    "PV1|1|I|2000^2012^01||||004777^ATTEND^AARON^A|||SUR||||ADM|A0\r",
);

fn parse(input: &str) -> Message {
    tokenize(input, EscapePolicy::Preserve).unwrap()
}

fn text(message: &Message, seg: usize, field: usize, rep: usize, comp: usize, sub: usize) -> String {
    message
        .value(seg, field, rep, comp, sub)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}

// ==================== ADT message tests ====================

#[test]
fn test_adt_segment_order() {
    let message = parse(ADT_A01);
    let tags: Vec<String> = message.iter().map(|s| s.name().into_owned()).collect();
    assert_eq!(tags, vec!["MSH", "EVN", "PID", "NK1", "PV1"]);
}

#[test]
fn test_adt_header_fields() {
    let message = parse(ADT_A01);
    let msh = message.header().unwrap();
    assert_eq!(msh.len(), 13);
    assert_eq!(text(&message, 0, 1, 0, 0, 0), "|");
    assert_eq!(text(&message, 0, 2, 0, 0, 0), "^~\\&");
    assert_eq!(text(&message, 0, 3, 0, 0, 0), "ADT1");
    assert_eq!(text(&message, 0, 8, 0, 0, 0), "SECURITY");
    assert_eq!(text(&message, 0, 9, 0, 1, 0), "A01");
    assert_eq!(text(&message, 0, 12, 0, 0, 0), "2.5");
}

#[test]
fn test_adt_patient_identifiers() {
    let message = parse(ADT_A01);
    let pid = message.segments_named("PID").next().unwrap();

    let identifiers = pid.get(3).unwrap();
    assert_eq!(identifiers.len(), 2);
    assert_eq!(identifiers.get(0).unwrap().len(), 6);
    assert_eq!(identifiers.get(1).unwrap().len(), 5);

    assert_eq!(text(&message, 2, 3, 0, 0, 0), "PATID1234");
    assert_eq!(text(&message, 2, 3, 1, 0, 0), "123456789");
    assert_eq!(text(&message, 2, 3, 1, 4, 0), "SS");
    assert!(message.value(2, 3, 1, 1, 0).is_none());
    assert!(pid.get(2).unwrap().is_empty());
    assert!(pid.get(4).unwrap().is_empty());
}

#[test]
fn test_adt_empty_fields_counted() {
    let message = parse(ADT_A01);
    let pv1 = message.segments_named("PV1").next().unwrap();
    assert_eq!(pv1.len(), 16);
    for index in [4, 5, 6, 8, 9, 11, 12, 13] {
        assert!(pv1.get(index).unwrap().is_empty(), "PV1-{} should be empty", index);
    }
    assert_eq!(text(&message, 4, 7, 0, 2, 0), "AARON");
}

// ==================== Subcomponent tests ====================

#[test]
fn test_subcomponents_in_observation() {
    let message = parse("MSH|^~\\&|LAB\rOBX|1|NM|GLU||105|mg/dL&milligrams per deciliter&UCUM|70-99\r");
    let units = message.get(1).unwrap().get(6).unwrap();
    let component = units.get(0).unwrap().get(0).unwrap();
    assert_eq!(component.len(), 3);
    assert_eq!(text(&message, 1, 6, 0, 0, 1), "milligrams per deciliter");
    assert_eq!(text(&message, 1, 6, 0, 0, 2), "UCUM");
}

// ==================== Escape tests ====================

#[test]
fn test_escaped_delimiters_keep_structure() {
    let input = "MSH|^~\\&|LAB\rNTE|1||Hemoglobin \\T\\ Hematocrit \\F\\ normal\\.br\\\r";
    let preserved = parse(input);
    let decoded = tokenize(input, EscapePolicy::Decode).unwrap();

    for message in [&preserved, &decoded] {
        let nte = message.get(1).unwrap();
        assert_eq!(nte.len(), 4);
        assert_eq!(nte.get(3).unwrap().get(0).unwrap().len(), 1);
    }

    assert_eq!(
        text(&preserved, 1, 3, 0, 0, 0),
        "Hemoglobin \\T\\ Hematocrit \\F\\ normal\\.br\\"
    );
    assert_eq!(
        text(&decoded, 1, 3, 0, 0, 0),
        "Hemoglobin & Hematocrit | normal\\.br\\"
    );
}

// ==================== Line ending tests ====================

#[test]
fn test_windows_line_endings() {
    let crlf = ADT_A01.replace('\r', "\r\n");
    assert_eq!(parse(&crlf), parse(ADT_A01));
}

#[test]
fn test_unix_line_endings() {
    let lf = ADT_A01.replace('\r', "\n");
    assert_eq!(parse(&lf), parse(ADT_A01));
}

#[test]
fn test_missing_final_terminator() {
    let trimmed = ADT_A01.trim_end_matches('\r');
    assert_eq!(parse(trimmed), parse(ADT_A01));
}

// ==================== Streaming event tests ====================

#[test]
fn test_events_arrive_in_document_order() {
    let tags: Vec<String> = Tokenizer::new(ADT_A01)
        .filter_map(|event| match event {
            ParseEvent::SegmentCompleted { tag, .. } => Some(tag),
            _ => None,
        })
        .collect();
    assert_eq!(tags, vec!["MSH", "EVN", "PID", "NK1", "PV1"]);
}

#[test]
fn test_byte_input_with_invalid_utf8() {
    let mut input = b"MSH|^~\\&|LAB\rNTE|1|".to_vec();
    input.extend_from_slice(&[0xC3, 0x28, b'x']);
    input.push(b'\r');

    let message = tokenize(&input, EscapePolicy::Preserve).unwrap();
    assert_eq!(message.value(1, 2, 0, 0, 0), Some(&[0xC3, 0x28, b'x'][..]));
}

// ==================== Error tests ====================

#[test]
fn test_error_inputs() {
    let cases: [(&[u8], ParseErrorKind); 4] = [
        (b"", ParseErrorKind::HeaderTooShort),
        (b"MSH|^~", ParseErrorKind::HeaderTooShort),
        (b"PID|^~\\&|1\r", ParseErrorKind::MissingHeaderTag),
        (b"MSH|^~\\&^X\r", ParseErrorKind::HeaderDelimiterMismatch),
    ];

    for (input, kind) in cases {
        let err = tokenize(input, EscapePolicy::Preserve).unwrap_err();
        assert_eq!(err.kind(), kind, "input {:?}", String::from_utf8_lossy(input));
        assert!(err.is_header_error());
    }
}

#[test]
fn test_error_carries_context() {
    let err = tokenize("MSH|^~\\&#rest", EscapePolicy::Preserve).unwrap_err();
    assert_eq!(
        err,
        ParseError::HeaderDelimiterMismatch {
            expected: '|',
            found: '#'
        }
    );
}
