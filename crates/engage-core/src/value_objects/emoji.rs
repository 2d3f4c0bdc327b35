//! Emoji payload of an EMOJI reaction and its aggregate bucket table

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Longest accepted emoji sequence, in chars (ZWJ family sequences run long)
pub const MAX_EMOJI_CHARS: usize = 32;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

const LOVE: &[&str] = &["❤", "😍", "🥰", "💖", "💕", "😘", "💗"];
const YUM: &[&str] = &["😋", "🤤", "🍕", "🍰", "🍲", "🥘", "🍝", "🍜"];
const WOW: &[&str] = &["😮", "😲", "🤩", "😯", "🔥", "🎉", "😱"];

/// A validated emoji string, stored exactly as submitted (trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Emoji(String);

impl Emoji {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmojiRequired);
        }
        if trimmed.chars().count() > MAX_EMOJI_CHARS
            || trimmed
                .chars()
                .any(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || c.is_control())
        {
            return Err(DomainError::InvalidEmoji);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn bucket(&self) -> Option<EmojiBucket> {
        EmojiBucket::classify(&self.0)
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Emoji {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Emoji::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Canonical aggregate slot an emoji counts towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmojiBucket {
    Love,
    Yum,
    Wow,
}

impl EmojiBucket {
    /// Map a raw emoji onto a bucket. Presentation selectors are ignored, so
    /// "❤️" and "❤" land in the same slot. Unknown emoji return `None`.
    pub fn classify(raw: &str) -> Option<Self> {
        let bare: String = raw
            .trim()
            .chars()
            .filter(|c| *c != VARIATION_SELECTOR_16)
            .collect();

        if LOVE.contains(&bare.as_str()) {
            Some(Self::Love)
        } else if YUM.contains(&bare.as_str()) {
            Some(Self::Yum)
        } else if WOW.contains(&bare.as_str()) {
            Some(Self::Wow)
        } else {
            None
        }
    }
}
