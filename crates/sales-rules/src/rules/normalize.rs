//! Value rewrites: corrections, truncation, emoji stripping and defaults.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use sales_model::{Decision, Record, Value};

use crate::rule::{Rule, RuleCategory, RuleMetadata};
use crate::state::RunState;

/// Emoji and pictographic code points, plus the joiners, variation
/// selectors and tag characters that build emoji sequences.
static PICTOGRAPHIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\p{Extended_Pictographic}\p{Regional_Indicator}\p{Emoji_Modifier}\p{So}\x{200D}\x{20E3}\x{FE0E}\x{FE0F}\x{E0020}-\x{E007F}]",
    )
    .expect("Invalid pictographic regex")
});

/// Replaces exact text matches with their corrections.
#[derive(Debug)]
pub struct RewriteValues {
    metadata: RuleMetadata,
    field: &'static str,
    corrections: BTreeMap<String, String>,
}

impl RewriteValues {
    pub fn new(
        id: u8,
        field: &'static str,
        corrections: BTreeMap<String, String>,
        description: &str,
    ) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Normalization, description)
                .with_fields(&[field]),
            field,
            corrections,
        }
    }
}

impl Rule for RewriteValues {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        let correction = record
            .get(self.field)
            .as_text()
            .and_then(|text| self.corrections.get(text));
        match correction {
            Some(corrected) => Decision::Keep(record.with_value(self.field, Value::text(corrected))),
            None => Decision::Keep(record.clone()),
        }
    }
}

/// Cuts text longer than `max_chars` characters down to its first `max_chars`.
#[derive(Debug)]
pub struct TruncateText {
    metadata: RuleMetadata,
    field: &'static str,
    max_chars: usize,
}

impl TruncateText {
    pub fn new(id: u8, field: &'static str, max_chars: usize, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Normalization, description)
                .with_fields(&[field]),
            field,
            max_chars,
        }
    }
}

impl Rule for TruncateText {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        match record.get(self.field).as_text() {
            Some(text) if text.chars().count() > self.max_chars => {
                let truncated: String = text.chars().take(self.max_chars).collect();
                Decision::Keep(record.with_value(self.field, Value::Text(truncated)))
            }
            _ => Decision::Keep(record.clone()),
        }
    }
}

/// Strip pictographic code points and surrounding whitespace.
///
/// Returns `None` when nothing was stripped.
pub fn strip_pictographs(text: &str) -> Option<String> {
    if !PICTOGRAPHIC.is_match(text) {
        return None;
    }
    Some(PICTOGRAPHIC.replace_all(text, "").trim().to_string())
}

/// Removes emoji from text; text left empty becomes Null.
#[derive(Debug)]
pub struct StripPictographs {
    metadata: RuleMetadata,
    field: &'static str,
}

impl StripPictographs {
    pub fn new(id: u8, field: &'static str, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Normalization, description)
                .with_fields(&[field]),
            field,
        }
    }
}

impl Rule for StripPictographs {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        let stripped = record.get(self.field).as_text().and_then(strip_pictographs);
        match stripped {
            Some(text) if text.is_empty() => Decision::Keep(record.with_value(self.field, Value::Null)),
            Some(text) => Decision::Keep(record.with_value(self.field, Value::Text(text))),
            None => Decision::Keep(record.clone()),
        }
    }
}

/// Fills a Null field with a fixed text.
#[derive(Debug)]
pub struct DefaultWhenNull {
    metadata: RuleMetadata,
    field: &'static str,
    default: String,
}

impl DefaultWhenNull {
    pub fn new(id: u8, field: &'static str, default: impl Into<String>, description: &str) -> Self {
        Self {
            metadata: RuleMetadata::new(id, RuleCategory::Default, description)
                .with_fields(&[field]),
            field,
            default: default.into(),
        }
    }
}

impl Rule for DefaultWhenNull {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, record: &Record, _state: &RunState) -> Decision {
        if record.get(self.field).is_null() {
            Decision::Keep(record.with_value(self.field, Value::text(self.default.as_str())))
        } else {
            Decision::Keep(record.clone())
        }
    }
}
