// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small parsing helpers shared by the agent-side subcommands.

use meow_core::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Parse a `key=value` flag value into its two halves.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

/// Build a predicate/data map from repeated `key=value` flags, string-valued.
pub fn key_values_to_map(pairs: &[(String, String)]) -> BTreeMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.clone(), Value::string(v.clone()))).collect()
}

/// Parse a duration like `100ms`, `5s`, or `2m`. Bare digits are milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (number, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, ""),
    };
    let value: u64 = number.parse().map_err(|_| format!("invalid duration '{s}'"))?;
    let ms = match unit {
        "" | "ms" => value,
        "s" => value * 1_000,
        "m" => value * 60_000,
        other => return Err(format!("unknown duration unit '{other}' in '{s}'")),
    };
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
#[path = "util_tests.rs"]
mod tests;
