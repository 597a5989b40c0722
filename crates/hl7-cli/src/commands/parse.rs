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

//! Parse command - HL7 message to JSON

use super::{read_input, write_output};
use crate::error::CliError;
use hl7::ParseOptions;
use tracing::debug;

/// Parse a message and print its tree as JSON.
///
/// Every level of the tree becomes a nested array; subcomponents are
/// strings. Empty fields and components are kept as empty arrays so
/// positions survive the conversion.
///
/// # Errors
///
/// Returns `Err` if the input cannot be read, the header is malformed, the
/// deadline elapses, or the output cannot be written.
///
/// # Examples
///
/// ```no_run
/// use hl7_cli::commands::parse;
/// use hl7::ParseOptions;
///
/// # fn main() -> Result<(), hl7_cli::error::CliError> {
/// parse("adt.hl7", None, true, ParseOptions::default())?;
/// # Ok(())
/// # }
/// ```
pub fn parse(
    file: &str,
    output: Option<&str>,
    pretty: bool,
    options: ParseOptions,
) -> Result<(), CliError> {
    let input = read_input(file)?;
    let message = hl7::parse_with_options(input, options)?;
    debug!(segments = message.len(), "message parsed");

    let json = if pretty {
        hl7::to_json_pretty(&message)
    } else {
        hl7::to_json(&message)
    }
    .map_err(CliError::json_format)?;

    write_output(&json, output)
}
