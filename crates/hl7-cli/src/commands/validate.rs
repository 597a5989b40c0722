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

//! Validate command - HL7 header validation

use super::read_input;
use crate::error::CliError;
use colored::Colorize;
use hl7::ParseOptions;

/// Validate that a file holds a parseable HL7 message.
///
/// Only the header can make a message invalid; the body always parses.
///
/// # Output
///
/// Prints a summary to stdout: status (✓ or ✗), the declared delimiters,
/// the segment count and the header field count.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or the header is malformed.
///
/// # Examples
///
/// ```no_run
/// use hl7_cli::commands::validate;
/// use hl7::ParseOptions;
///
/// # fn main() -> Result<(), hl7_cli::error::CliError> {
/// validate("adt.hl7", ParseOptions::default())?;
/// # Ok(())
/// # }
/// ```
pub fn validate(file: &str, options: ParseOptions) -> Result<(), CliError> {
    let input = read_input(file)?;
    let delimiters = hl7::resolve_delimiters(&input).ok();

    match hl7::parse_with_options(input, options) {
        Ok(message) => {
            println!("{} {}", "✓".green().bold(), file);
            if let Some(delims) = delimiters {
                println!(
                    "  Delimiters: {}{}",
                    char::from(delims.field),
                    String::from_utf8_lossy(&delims.encoding_characters())
                );
            }
            println!("  Segments: {}", message.len());
            if let Some(header) = message.header() {
                println!("  Header fields: {}", header.len());
            }
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), file);
            Err(e.into())
        }
    }
}
