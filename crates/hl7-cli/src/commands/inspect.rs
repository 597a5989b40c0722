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

//! Inspect command - positional tree view

use super::read_input;
use crate::error::CliError;
use colored::Colorize;
use hl7::{Delimiters, Message, ParseOptions, Segment};

/// Print the parsed message as a tree of positional values.
///
/// Every non-empty subcomponent is listed under its segment with an HL7
/// position label such as `PID-3`, `PID-3.4` or `PID-3(2).4.2`. With
/// `verbose`, empty fields are listed too.
///
/// # Errors
///
/// Returns `Err` if the input cannot be read or the header is malformed.
pub fn inspect(file: &str, verbose: bool, options: ParseOptions) -> Result<(), CliError> {
    let input = read_input(file)?;
    let delimiters = hl7::resolve_delimiters(&input)?;
    let message = hl7::parse_with_options(input, options)?;

    println!("{}", "HL7 Message".bold().underline());
    println!();
    println!("  {} {}", "Delimiters:".cyan(), describe_delimiters(&delimiters));
    println!("  {} {}", "Segments:".cyan(), message.len());
    println!();

    print_segments(&message, verbose);
    Ok(())
}

fn describe_delimiters(delims: &Delimiters) -> String {
    format!(
        "field={} component={} repeat={} escape={} subcomponent={}",
        char::from(delims.field),
        char::from(delims.component),
        char::from(delims.repeat),
        char::from(delims.escape),
        char::from(delims.subcomponent),
    )
}

fn print_segments(message: &Message, verbose: bool) {
    for (index, segment) in message.iter().enumerate() {
        let name = segment.name();
        println!(
            "{} {} {}",
            format!("[{}]", index).dimmed(),
            name.yellow().bold(),
            format!("({} fields)", segment.len().saturating_sub(1)).dimmed()
        );
        print_fields(&name, segment, verbose);
    }
}

fn print_fields(name: &str, segment: &Segment, verbose: bool) {
    // Field 0 is the tag, already shown in the segment line.
    for (f, field) in segment.iter().enumerate().skip(1) {
        if field.is_empty() {
            if verbose {
                println!("  {} {}", position_label(name, f, 0, None).cyan(), "<empty>".dimmed());
            }
            continue;
        }

        for (r, repetition) in field.iter().enumerate() {
            let show_components = repetition.len() > 1;
            for (c, component) in repetition.iter().enumerate() {
                let show_subs = component.len() > 1;
                for (s, sub) in component.iter().enumerate() {
                    if sub.is_empty() {
                        continue;
                    }
                    let path = match (show_components || show_subs, show_subs) {
                        (false, _) => None,
                        (true, false) => Some((c, None)),
                        (true, true) => Some((c, Some(s))),
                    };
                    println!(
                        "  {} {}",
                        position_label(name, f, r, path).cyan(),
                        sub.to_string_lossy().green()
                    );
                }
            }
        }
    }
}

/// Conventional position label, with 1-based components and subcomponents.
///
/// The repetition index only appears for repetitions after the first.
fn position_label(
    segment: &str,
    field: usize,
    repetition: usize,
    path: Option<(usize, Option<usize>)>,
) -> String {
    let mut label = format!("{}-{}", segment, field);
    if repetition > 0 {
        label.push_str(&format!("({})", repetition + 1));
    }
    if let Some((component, subcomponent)) = path {
        label.push_str(&format!(".{}", component + 1));
        if let Some(sub) = subcomponent {
            label.push_str(&format!(".{}", sub + 1));
        }
    }
    label
}
