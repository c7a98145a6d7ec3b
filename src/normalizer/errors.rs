// Copyright (C) 2026 dialnorm maintainers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

use crate::regexp_cache::InvalidRegexError;

/// Per-pattern expansion outcome.
///
/// `IllegalPattern` is recoverable: the caller reports it and moves on to
/// the next pattern. `UnsupportedBracket` means the input is outside the
/// supported character-class grammar and must abort the run rather than
/// silently mis-expand.
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("illegal pattern format: {0}")]
    IllegalPattern(String),

    #[error("unsupported bracket expression in \"{pattern}\": {source}")]
    UnsupportedBracket {
        pattern: String,
        source: InvalidRegexError,
    },
}

impl ExpandError {
    /// Recoverable errors are skipped with a warning; the rest abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExpandError::IllegalPattern(_))
    }
}
