//! Assertion adapter
//!
//! A fluent chain over plain values: `expect(value).to_be_true()`,
//! `expect(body).to_include("...")`. Every check returns `Result<(), AssertionError>` so a test
//! case body can bail out with `?`. Checks are evaluated once and have no side effects.

use std::{any::Any, fmt::Debug};

use regex::Regex;

use crate::error::AssertionError;

/// Longest slice of an actual value quoted back in a failure message.
const PREVIEW_CHARS: usize = 200;

fn preview(s: &str) -> String {
    match s.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{:?}...", &s[..cut]),
        None => format!("{s:?}"),
    }
}

/// Passes only for the boolean `true`; any other value, of any type, fails.
pub fn assert_true<T: Any + Debug>(value: T) -> Result<(), AssertionError> {
    if (&value as &dyn Any).downcast_ref::<bool>() == Some(&true) {
        return Ok(());
    }
    let actual = format!("{value:?}");
    Err(AssertionError::new(
        format!("expected true, got {actual}"),
        "true",
        actual,
    ))
}

/// Literal, case-sensitive substring check.
pub fn assert_includes(haystack: &str, needle: &str) -> Result<(), AssertionError> {
    if haystack.contains(needle) {
        return Ok(());
    }
    let actual = preview(haystack);
    Err(AssertionError::new(
        format!("expected {actual} to include {needle:?}"),
        needle,
        actual,
    ))
}

pub fn assert_equal<T: PartialEq + Debug>(actual: T, expected: T) -> Result<(), AssertionError> {
    if actual == expected {
        return Ok(());
    }
    let (expected, actual) = (format!("{expected:?}"), format!("{actual:?}"));
    Err(AssertionError::new(
        format!("expected {expected}, got {actual}"),
        expected,
        actual,
    ))
}

pub fn assert_matches(value: &str, pattern: &Regex) -> Result<(), AssertionError> {
    if pattern.is_match(value) {
        return Ok(());
    }
    let actual = preview(value);
    Err(AssertionError::new(
        format!("expected {actual} to match /{pattern}/"),
        format!("/{pattern}/"),
        actual,
    ))
}

/// Value under assertion; see [`expect`].
#[derive(Debug)]
pub struct Expect<T> {
    value: T,
}

pub fn expect<T>(value: T) -> Expect<T> {
    Expect { value }
}

impl<T: Any + Debug> Expect<T> {
    pub fn to_be_true(self) -> Result<(), AssertionError> {
        assert_true(self.value)
    }
}

impl<T: PartialEq + Debug> Expect<T> {
    pub fn to_equal(self, expected: T) -> Result<(), AssertionError> {
        assert_equal(self.value, expected)
    }
}

impl<T: AsRef<str>> Expect<T> {
    pub fn to_include(&self, needle: &str) -> Result<(), AssertionError> {
        assert_includes(self.value.as_ref(), needle)
    }

    pub fn to_match(&self, pattern: &Regex) -> Result<(), AssertionError> {
        assert_matches(self.value.as_ref(), pattern)
    }
}
