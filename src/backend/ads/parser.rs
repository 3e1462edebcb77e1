//! Caption output parsing
//!
//! The model is asked to end every caption with [`VARIANT_DELIMITER`]. When it
//! ignores the delimiter the text is split on `Caption N` / `캡션 N` labels and
//! then on `1.` `2.` bullet starts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::backend::ads::prompt::VARIANT_DELIMITER;

static HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Za-z0-9가-힣_]+)").expect("valid hashtag regex"));

static CAPTION_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:캡션|Caption)\s*\d+\s*:\s*").expect("valid title regex"));

static CAPTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:\*\*)?(?:캡션|Caption)[ \t]*\d+").expect("valid label regex")
});

static BULLET_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+").expect("valid bullet regex"));

/// One generated caption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedVariant {
    pub id: String,
    pub content: String,
    pub hashtags: Vec<String>,
}

impl ParsedVariant {
    fn new(content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            hashtags: extract_hashtags(&content),
            content,
        }
    }
}

/// Hashtags in order of first appearance, without the `#`
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for cap in HASHTAG.captures_iter(text) {
        let tag = &cap[1];
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Split `text` at every match start of `pattern`, dropping any preamble
fn split_at_matches<'a>(text: &'a str, pattern: &Regex) -> Vec<&'a str> {
    let starts: Vec<usize> = pattern.find_iter(text).map(|m| m.start()).collect();
    if starts.len() < 2 {
        return Vec::new();
    }
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim()
        })
        .filter(|block| !block.is_empty())
        .collect()
}

fn split_blocks(raw: &str) -> Vec<String> {
    let blocks: Vec<&str> = raw
        .split(VARIANT_DELIMITER)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    if raw.contains(VARIANT_DELIMITER) {
        return blocks.into_iter().map(str::to_string).collect();
    }

    let labelled = split_at_matches(raw, &CAPTION_LABEL);
    if !labelled.is_empty() {
        return labelled
            .into_iter()
            .map(|b| match b.strip_prefix("**") {
                // **Caption 1:** bold labels
                Some(rest) => rest.replacen("**", "", 1),
                None => b.to_string(),
            })
            .collect();
    }

    let bulleted = split_at_matches(raw, &BULLET_START);
    if !bulleted.is_empty() {
        return bulleted
            .into_iter()
            .map(|b| BULLET_START.replace(b, "").into_owned())
            .collect();
    }

    blocks.into_iter().map(str::to_string).collect()
}

fn format_block(block: &str) -> String {
    let lines: Vec<&str> = block.lines().collect();
    let (body, hashtag_line) = match lines.iter().rposition(|line| line.contains('#')) {
        Some(i) => (lines[..i].join("\n"), Some(lines[i].trim())),
        None => (block.to_string(), None),
    };

    let body = CAPTION_TITLE.replace(body.trim(), "").trim().to_string();
    match hashtag_line {
        Some(tags) if body.is_empty() => tags.to_string(),
        Some(tags) => format!("{}\n\n{}", body.trim_end(), tags),
        None => body,
    }
}

/// Parse raw model output into at most `limit` variants
///
/// Never returns an empty list for non-blank input: unparseable text becomes
/// a single variant.
pub fn parse_variants(raw: &str, limit: usize) -> Vec<ParsedVariant> {
    let mut variants: Vec<ParsedVariant> = split_blocks(raw)
        .iter()
        .map(|block| format_block(block))
        .filter(|content| !content.is_empty())
        .map(ParsedVariant::new)
        .collect();

    if variants.is_empty() && !raw.trim().is_empty() {
        variants.push(ParsedVariant::new(raw.trim().to_string()));
    }

    variants.truncate(limit);
    variants
}
