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

//! CLI command definitions and argument parsing.

use crate::commands;
use crate::error::CliError;
use clap::{Args, Subcommand};
use hl7::{EscapePolicy, ParseOptions};
use std::time::Duration;

/// Parser options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ParseArgs {
    /// Decode escape sequences (\F\, \S\, \T\, \R\, \E\) in field values
    #[arg(long, global = true)]
    pub decode_escapes: bool,

    /// Abort the parse after this many milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,
}

impl ParseArgs {
    /// Build the parser options these flags describe.
    pub fn to_options(&self) -> ParseOptions {
        let mut builder = ParseOptions::builder();
        if self.decode_escapes {
            builder = builder.escape(EscapePolicy::Decode);
        }
        if let Some(ms) = self.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        builder.build()
    }
}

/// Top-level CLI commands.
///
/// Every `FILE` argument accepts `-` for standard input.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use hl7_cli::cli::{Commands, ParseArgs};
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     parse: ParseArgs,
///
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a message and print its tree as JSON
    Parse {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Stream segments as they complete
    ///
    /// Prints one `index tag field-count` line per segment.
    Segments {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Print parsed structure as a positional tree
    Inspect {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Also list empty fields
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a message header
    Validate {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,
    },
}

impl Commands {
    /// Execute the command with the provided parser options.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - The input cannot be read or is too large
    /// - The message header is malformed
    /// - The parse is cancelled or times out
    /// - Output cannot be written
    pub fn execute(self, args: &ParseArgs) -> Result<(), CliError> {
        let options = args.to_options();
        match self {
            Commands::Parse {
                file,
                output,
                pretty,
            } => commands::parse(&file, output.as_deref(), pretty, options),
            Commands::Segments { file } => commands::segments(&file, options),
            Commands::Inspect { file, verbose } => commands::inspect(&file, verbose, options),
            Commands::Validate { file } => commands::validate(&file, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let options = ParseArgs::default().to_options();
        assert_eq!(options, ParseOptions::default());
    }

    #[test]
    fn test_args_to_options() {
        let args = ParseArgs {
            decode_escapes: true,
            timeout_ms: Some(250),
        };
        let options = args.to_options();
        assert_eq!(options.escape, EscapePolicy::Decode);
        assert_eq!(options.timeout, Some(Duration::from_millis(250)));
    }
}
