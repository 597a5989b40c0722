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

//! HL7 CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **parse**: Parse a message and print the tree as JSON
//! - **segments**: Stream one summary line per completed segment
//! - **inspect**: Visualize the positional tree
//! - **validate**: Check that the header is well formed
//!
//! All commands read `-` as standard input and accept `--decode-escapes`
//! and `--timeout-ms`.
//!
//! # Examples
//!
//! ```no_run
//! use hl7_cli::commands::validate;
//! use hl7::ParseOptions;
//!
//! # fn main() -> Result<(), hl7_cli::error::CliError> {
//! validate("adt.hl7", ParseOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
