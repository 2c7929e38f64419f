//! Dotted-key properties store
//!
//! Parses the `key = value` configuration format:
//!
//! ```text
//! # comment
//! ! also a comment
//! rootLogger = INFO
//! rootLogger.handlers = console, file
//! logger.file.constructor.path = logs/%module%-%datetime%.log
//! logger.console.formatter.constructor.format = [%datetime%] %message%\n
//! long.value = first part \
//!              second part
//! ```
//!
//! The separator is the first `=`; a `:` followed by whitespace is accepted
//! when the line has no `=`, so keys may contain `::` path separators. Values
//! are kept verbatim apart from surrounding whitespace, which means escape
//! sequences such as `\n` reach the consumers untouched. Empty values are
//! treated as absent. A repeated key keeps its first position and its last value.

use crate::core::{LoggerError, Result};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a properties file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoggerError::config_load(path.display().to_string(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut properties = Self::new();
        let mut pending: Option<(usize, String)> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_start();

            let (start, mut logical) = match pending.take() {
                Some((start, acc)) => (start, acc),
                None => {
                    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                        continue;
                    }
                    (line_no, String::new())
                }
            };

            if ends_with_continuation(line) {
                logical.push_str(&line[..line.len() - 1]);
                pending = Some((start, logical));
                continue;
            }

            logical.push_str(line);
            properties.parse_line(start, &logical)?;
        }

        if let Some((start, logical)) = pending {
            properties.parse_line(start, &logical)?;
        }

        Ok(properties)
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let (key, value) = split_key_value(line)
            .ok_or_else(|| LoggerError::config_parse(line_no, format!("no separator in '{}'", line)))?;
        if key.is_empty() {
            return Err(LoggerError::config_parse(line_no, "empty key"));
        }
        self.set(key, value);
        Ok(())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties = Self::new();
        for (k, v) in pairs {
            properties.set(k, v);
        }
        properties
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Value for `key`; empty values count as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
            .filter(|value| !value.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct `<name>` segments of keys shaped `<prefix>.<name>.<rest>`,
    /// in order of first appearance.
    pub fn sections(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (key, _) in &self.entries {
            let Some(rest) = key.strip_prefix(prefix).and_then(|r| r.strip_prefix('.')) else {
                continue;
            };
            let Some((name, _)) = rest.split_once('.') else {
                continue;
            };
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    if let Some(pos) = line.find('=') {
        return Some((line[..pos].trim(), line[pos + 1..].trim()));
    }

    let bytes = line.as_bytes();
    for (pos, _) in line.match_indices(':') {
        let next = bytes.get(pos + 1);
        if next.map_or(true, |b| b.is_ascii_whitespace()) {
            return Some((line[..pos].trim(), line[pos + 1..].trim()));
        }
    }
    None
}
