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

//! Parser configuration.

use crate::escape::EscapePolicy;
use std::time::Duration;

/// Options for a single parse.
///
/// # Examples
///
/// ```rust
/// use hl7_core::{EscapePolicy, ParseOptions};
/// use std::time::Duration;
///
/// let options = ParseOptions::builder()
///     .escape(EscapePolicy::Decode)
///     .timeout(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(options.escape, EscapePolicy::Decode);
/// assert_eq!(options.timeout, Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// How escape sequences are stored in subcomponent data.
    ///
    /// Default: [`EscapePolicy::Preserve`]
    pub escape: EscapePolicy,

    /// Deadline for a streamed parse, measured from the moment the stream
    /// starts. When it elapses the stream ends with a `Timeout` failure.
    ///
    /// Default: None (no deadline)
    pub timeout: Option<Duration>,
}

impl ParseOptions {
    /// Create a new builder for ParseOptions.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

/// Builder for [`ParseOptions`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the escape policy.
    pub fn escape(mut self, policy: EscapePolicy) -> Self {
        self.options.escape = policy;
        self
    }

    /// Set a deadline for streamed parses.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.options.timeout = Some(limit);
        self
    }

    /// Remove any deadline.
    pub fn no_timeout(mut self) -> Self {
        self.options.timeout = None;
        self
    }

    pub fn build(self) -> ParseOptions {
        self.options
    }
}
