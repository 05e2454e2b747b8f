//! Parsing of ExifTool `-args` output.
//!
//! Two kinds of lines matter:
//! - tag lines: `-<group>:<tag>=<value>` (e.g. `-IFD0:Make=Canon`)
//! - status lines: `<count> <phrase>` (e.g. `1 image files updated`)
//!
//! Everything else is ignored, and malformed lines are skipped rather than
//! failing the parse: ExifTool's wording is not a stable contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Marker that starts a tag line in `-args` output.
pub const TAG_PREFIX: char = '-';
/// Separator between group and tag name.
pub const GROUP_SEPARATOR: char = ':';

/// How "image files unchanged" is counted for read/write responses.
///
/// ExifTool prints it when a write matched nothing to change. Whether that is
/// a failure depends on the caller, so it is a policy, not a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnchangedPolicy {
    /// Count unchanged files as errors (a write that changed nothing failed)
    #[default]
    Error,
    /// Ignore unchanged files
    Ignore,
}

/// Which counter a status phrase contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Update,
    Error,
}

/// Status phrases recognised in read/write responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusVocabulary {
    phrases: Vec<(&'static str, StatusKind)>,
}

impl StatusVocabulary {
    /// Vocabulary for read and write commands.
    pub fn read_write(unchanged: UnchangedPolicy) -> Self {
        let mut phrases = vec![
            ("image files updated", StatusKind::Update),
            ("image files read", StatusKind::Update),
            ("image files created", StatusKind::Update),
            ("files weren't updated due to errors", StatusKind::Error),
            ("files could not be read", StatusKind::Error),
        ];
        if unchanged == UnchangedPolicy::Error {
            phrases.push(("image files unchanged", StatusKind::Error));
        }
        Self { phrases }
    }

    /// Classify a status phrase; unknown phrases yield `None`.
    pub fn classify(&self, phrase: &str) -> Option<StatusKind> {
        let phrase = phrase.trim();
        self.phrases
            .iter()
            .find(|(known, _)| *known == phrase)
            .map(|(_, kind)| *kind)
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::read_write(UnchangedPolicy::default())
    }
}

/// Parsed result of a read or write command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataResult {
    output: String,
    tags: HashMap<String, String>,
    updates: u64,
    errors: u64,
}

impl MetadataResult {
    /// Raw response text the result was parsed from.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn into_tags(self) -> HashMap<String, String> {
        self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// A write succeeded iff something was updated and nothing failed.
    pub fn is_write_success(&self) -> bool {
        self.updates > 0 && self.errors == 0
    }
}

/// Split a tag line into `(name, value)`.
///
/// Returns `None` for lines without the tag prefix, without a group
/// separator, or without `=` after the separator.
pub fn parse_tag_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(TAG_PREFIX)?;
    let (_group, rest) = rest.split_once(GROUP_SEPARATOR)?;
    let (name, value) = rest.split_once('=')?;
    Some((name.trim(), value.trim()))
}

/// Split a status line into `(count, phrase)`.
///
/// Returns `None` when there is no space or the leading token is not a
/// non-negative integer.
pub fn parse_status_line(line: &str) -> Option<(u64, &str)> {
    let (count, phrase) = line.trim().split_once(' ')?;
    let count = count.parse().ok()?;
    Some((count, phrase.trim()))
}

/// Parse a raw response into tags and counters.
pub fn parse_response(output: &str, vocabulary: &StatusVocabulary) -> MetadataResult {
    let mut tags = HashMap::new();
    let mut updates = 0u64;
    let mut errors = 0u64;

    for line in output.lines() {
        if line.starts_with(TAG_PREFIX) {
            match parse_tag_line(line) {
                Some((name, value)) => {
                    tags.insert(name.to_string(), value.to_string());
                }
                None => {
                    log::debug!(target: "exifbatch::parser", "Skipping malformed tag line: {}", line);
                }
            }
            continue;
        }

        let Some((count, phrase)) = parse_status_line(line) else {
            continue;
        };
        match vocabulary.classify(phrase) {
            Some(StatusKind::Update) => updates = updates.saturating_add(count),
            Some(StatusKind::Error) => errors = errors.saturating_add(count),
            None => {
                log::trace!(target: "exifbatch::parser", "Ignoring status line: {}", line);
            }
        }
    }

    MetadataResult {
        output: output.to_string(),
        tags,
        updates,
        errors,
    }
}
