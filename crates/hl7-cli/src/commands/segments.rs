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

//! Segments command - stream segment summaries

use super::read_input;
use crate::error::CliError;
use hl7::{parse_stream_with_options, ParseEvent, ParseOptions};
use std::io::{self, Write};

/// Stream a message and print one line per completed segment.
///
/// Each line is `index tag field-count`, written as soon as the segment
/// completes. The field count includes the tag field.
///
/// # Errors
///
/// Returns `Err` if the input cannot be read, the parse fails, or stdout
/// is closed.
pub fn segments(file: &str, options: ParseOptions) -> Result<(), CliError> {
    let input = read_input(file)?;
    let mut stdout = io::stdout().lock();

    let mut index = 0usize;
    for event in parse_stream_with_options(input, options) {
        match event {
            ParseEvent::SegmentCompleted { tag, segment } => {
                writeln!(stdout, "{} {} {}", index, tag, segment.len())
                    .map_err(|e| CliError::io_error("<stdout>", e))?;
                index += 1;
            }
            ParseEvent::ParseFinished { .. } => break,
            ParseEvent::ParseFailed { error } => return Err(error.into()),
        }
    }

    stdout.flush().map_err(|e| CliError::io_error("<stdout>", e))
}
