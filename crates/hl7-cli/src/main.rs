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

//! HL7 Command Line Interface

use clap::Parser;
use hl7_cli::cli::{Commands, ParseArgs};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// HL7 - streaming HL7 v2 message toolkit
///
/// # Examples
///
/// ```bash
/// # Parse a message to JSON
/// hl7 parse adt.hl7 --pretty
///
/// # Stream segments from stdin
/// cat adt.hl7 | hl7 segments -
///
/// # Show positional values with escapes decoded
/// hl7 inspect adt.hl7 --decode-escapes
/// ```
#[derive(Parser)]
#[command(name = "hl7")]
#[command(author, version, about = "HL7 - streaming HL7 v2 message toolkit", long_about = None)]
struct Cli {
    #[command(flatten)]
    parse: ParseArgs,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for JSON and segment output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hl7=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.execute(&cli.parse) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
