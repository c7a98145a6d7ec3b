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

use std::{collections::VecDeque, sync::LazyLock};

use fast_cat::concat_str;
use log::{debug, warn};
use regex::Regex;

use crate::regexp_cache::RegexCache;

use super::errors::ExpandError;

const DIGITS: &str = "0123456789";

/// Characters that mark wildcard/extension syntax the expansion does not
/// support. A pattern containing any of them is rejected as a whole.
const ILLEGAL_CHARS: [char; 3] = ['.', '*', '!'];

/// Splits a raw pattern into `<prefix><bracket-expression><suffix>`.
/// Greedy prefix means a malformed multi-bracket pattern resolves to the
/// last bracket block, mirroring how the grammar is written down at the
/// PBX side.
static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<pre>.*)(?P<class>\[.+\])(?P<post>.*)$")
        .unwrap_or_else(|err| panic!("bracket splitter must compile: {err}"))
});

/// Lazily expands raw dialing patterns into literal digit patterns.
///
/// For every input pattern without a bracket expression the pattern itself
/// is yielded unchanged. A pattern `pre[class]post` yields `pre + d + post`
/// for every digit `d` in `0..=9` the class matches, in ascending digit
/// order. Created by [`expand`].
///
/// Items are `Result`s: an [`ExpandError::IllegalPattern`] is yielded for
/// patterns using unsupported wildcard syntax (the caller decides to skip),
/// an [`ExpandError::UnsupportedBracket`] for a class the regex engine
/// refuses to compile.
pub struct Expand<'c, I> {
    patterns: I,
    cache: &'c RegexCache,
    pending: VecDeque<String>,
}

/// Expands `patterns` against the shared compiled-class `cache`.
///
/// The returned iterator is single-pass over its input; expanding the same
/// patterns again requires calling `expand` again.
pub fn expand<'c, I, S>(patterns: I, cache: &'c RegexCache) -> Expand<'c, I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Expand {
        patterns: patterns.into_iter(),
        cache,
        pending: VecDeque::new(),
    }
}

impl<I, S> Iterator for Expand<'_, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<String, ExpandError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(expanded) = self.pending.pop_front() {
                return Some(Ok(expanded));
            }
            let raw = self.patterns.next()?;
            let raw = raw.as_ref();

            if raw.contains(ILLEGAL_CHARS) {
                return Some(Err(ExpandError::IllegalPattern(raw.to_owned())));
            }

            let Some(caps) = BRACKET_RE.captures(raw) else {
                // nothing to do, the pattern already is a literal
                return Some(Ok(raw.to_owned()));
            };

            let pre = &caps["pre"];
            let class = &caps["class"];
            let post = &caps["post"];

            let matcher = match self.cache.class_matcher(class) {
                Ok(matcher) => matcher,
                Err(source) => {
                    return Some(Err(ExpandError::UnsupportedBracket {
                        pattern: raw.to_owned(),
                        source,
                    }));
                }
            };

            debug!("expanding \"{raw}\"");
            for i in 0..DIGITS.len() {
                let digit = &DIGITS[i..i + 1];
                if matcher.is_match(digit) {
                    let expanded = concat_str!(pre, digit, post);
                    debug!(" {expanded}");
                    self.pending.push_back(expanded);
                }
            }
            if self.pending.is_empty() {
                warn!("bracket expression in \"{raw}\" matches no digit, pattern dropped");
            }
        }
    }
}
