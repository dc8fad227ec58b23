//! Glob-style channel pattern matching (`*`, `?`, `[...]`, `\` escapes).

use lru::LruCache;
use regex::{Regex, RegexBuilder};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::core::{PubSubError, Result};

lazy_static::lazy_static! {
    static ref PATTERN_CACHE: Mutex<LruCache<String, Arc<Regex>>> = Mutex::new(LruCache::new(
        NonZeroUsize::new(256).unwrap_or(NonZeroUsize::MIN)
    ));
}

/// Translates a glob pattern into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<String> {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                regex.push_str(&regex::escape(&chars[i].to_string()));
            }
            '[' => {
                i = push_class(&chars, i, &mut regex)?;
            }
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    regex.push('$');
    Ok(regex)
}

/// Copies the character class opening at `start`; returns the index of the
/// closing `]`.
fn push_class(chars: &[char], start: usize, regex: &mut String) -> Result<usize> {
    let mut i = start + 1;
    regex.push('[');
    if matches!(chars.get(i), Some('^') | Some('!')) {
        regex.push('^');
        i += 1;
    }
    let mut empty = true;
    while i < chars.len() {
        let c = chars[i];
        if c == ']' && !empty {
            regex.push(']');
            return Ok(i);
        }
        let c = if c == '\\' && i + 1 < chars.len() {
            i += 1;
            chars[i]
        } else {
            c
        };
        if chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|end| *end != ']') {
            // Reversed ranges match as if their endpoints were swapped.
            let end = chars[i + 2];
            let (low, high) = if c <= end { (c, end) } else { (end, c) };
            regex.push_str(&regex::escape(&low.to_string()));
            regex.push('-');
            regex.push_str(&regex::escape(&high.to_string()));
            i += 2;
        } else {
            regex.push_str(&regex::escape(&c.to_string()));
        }
        empty = false;
        i += 1;
    }
    Err(PubSubError::Aggregation(format!(
        "unterminated character class in pattern '{}'",
        chars.iter().collect::<String>()
    )))
}

/// Cheap answers for the common shapes, no regex needed.
fn fast_path(pattern: &str, channel: &str) -> Option<bool> {
    let is_meta = |c: char| matches!(c, '*' | '?' | '[' | '\\');
    if pattern == "*" {
        return Some(true);
    }
    if !pattern.contains(is_meta) {
        return Some(pattern == channel);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        if !prefix.contains(is_meta) {
            return Some(channel.starts_with(prefix));
        }
    }
    None
}

fn compiled(pattern: &str) -> Result<Arc<Regex>> {
    {
        let mut cache = PATTERN_CACHE
            .lock()
            .map_err(|err| PubSubError::Aggregation(format!("pattern cache poisoned: {}", err)))?;
        if let Some(regex) = cache.get(pattern) {
            return Ok(Arc::clone(regex));
        }
    }

    // `*` and `?` match any character, newlines included.
    let regex = RegexBuilder::new(&glob_to_regex(pattern)?)
        .dot_matches_new_line(true)
        .build()
        .map_err(|err| {
            PubSubError::Aggregation(format!("invalid pattern '{}': {}", pattern, err))
        })?;
    let regex = Arc::new(regex);

    let mut cache = PATTERN_CACHE
        .lock()
        .map_err(|err| PubSubError::Aggregation(format!("pattern cache poisoned: {}", err)))?;
    cache.put(pattern.to_string(), Arc::clone(&regex));
    Ok(regex)
}

/// Returns true when `channel` matches the glob `pattern`.
pub fn glob_match(pattern: &str, channel: &str) -> Result<bool> {
    if let Some(matched) = fast_path(pattern, channel) {
        return Ok(matched);
    }
    Ok(compiled(pattern)?.is_match(channel))
}
