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

//! CLI command implementations

mod inspect;
mod parse;
mod segments;
mod validate;

pub use inspect::inspect;
pub use parse::parse;
pub use segments::segments;
pub use validate::validate;

use crate::error::CliError;
use std::fs;
use std::io::{self, Read, Write};

/// Path argument that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Default maximum input size (64 MB).
/// Can be overridden via the HL7_MAX_FILE_SIZE environment variable
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

fn get_max_file_size() -> u64 {
    std::env::var("HL7_MAX_FILE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a message from a file, or from stdin when `path` is `-`.
///
/// Input larger than the configured maximum is rejected before it is
/// buffered in full.
///
/// # Errors
///
/// Returns `Err` if:
/// - The file metadata cannot be accessed
/// - The input exceeds the maximum size (configurable via `HL7_MAX_FILE_SIZE`)
/// - The input cannot be read
pub fn read_input(path: &str) -> Result<Vec<u8>, CliError> {
    let max = get_max_file_size();

    if path == STDIN_PATH {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .take(max.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|e| CliError::io_error("<stdin>", e))?;
        if buf.len() as u64 > max {
            return Err(CliError::file_too_large("<stdin>", buf.len() as u64, max));
        }
        return Ok(buf);
    }

    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;
    if metadata.len() > max {
        return Err(CliError::file_too_large(path, metadata.len(), max));
    }

    fs::read(path).map_err(|e| CliError::io_error(path, e))
}

/// Write content to a file or stdout.
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), CliError> {
    match path {
        Some(p) => fs::write(p, content).map_err(|e| CliError::io_error(p, e)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .map_err(|e| CliError::io_error("<stdout>", e))
        }
    }
}
