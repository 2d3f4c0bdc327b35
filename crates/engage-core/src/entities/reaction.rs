//! Reaction entity - one actor's stance on one target

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::actor::ActorKey;
use crate::error::DomainError;
use crate::value_objects::{Emoji, RatingValue, Snowflake};

/// Closed set of reaction categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionKind {
    Like,
    Favorite,
    Bookmark,
    Emoji,
    Rating,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 5] = [
        Self::Like,
        Self::Favorite,
        Self::Bookmark,
        Self::Emoji,
        Self::Rating,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Favorite => "FAVORITE",
            Self::Bookmark => "BOOKMARK",
            Self::Emoji => "EMOJI",
            Self::Rating => "RATING",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::InvalidReactionKind(wanted.to_owned()))
    }
}

/// What the reaction says. The payload shape follows the kind: only `Emoji`
/// carries an emoji, only `Rating` carries a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stance {
    Like,
    Favorite,
    Bookmark,
    Emoji(Emoji),
    Rating(RatingValue),
}

impl Stance {
    /// Build a toggleable stance from request input. Emoji input is dropped
    /// for kinds that do not carry one; RATING goes through [`Stance::rating`].
    pub fn toggleable(kind: ReactionKind, emoji: Option<&str>) -> Result<Self, DomainError> {
        match kind {
            ReactionKind::Like => Ok(Self::Like),
            ReactionKind::Favorite => Ok(Self::Favorite),
            ReactionKind::Bookmark => Ok(Self::Bookmark),
            ReactionKind::Emoji => {
                let raw = emoji.ok_or(DomainError::EmojiRequired)?;
                Ok(Self::Emoji(Emoji::parse(raw)?))
            }
            ReactionKind::Rating => Err(DomainError::RatingNotToggleable),
        }
    }

    pub fn rating(raw: i64) -> Self {
        Self::Rating(RatingValue::clamped(raw))
    }

    /// Rebuild a stance from stored columns
    pub fn from_parts(
        kind: ReactionKind,
        emoji: Option<&str>,
        value: Option<i64>,
    ) -> Result<Self, DomainError> {
        match kind {
            ReactionKind::Rating => value
                .map(Self::rating)
                .ok_or_else(|| DomainError::InternalError("rating row without value".into())),
            other => Self::toggleable(other, emoji),
        }
    }

    pub fn kind(&self) -> ReactionKind {
        match self {
            Self::Like => ReactionKind::Like,
            Self::Favorite => ReactionKind::Favorite,
            Self::Bookmark => ReactionKind::Bookmark,
            Self::Emoji(_) => ReactionKind::Emoji,
            Self::Rating(_) => ReactionKind::Rating,
        }
    }

    pub fn emoji(&self) -> Option<&Emoji> {
        match self {
            Self::Emoji(emoji) => Some(emoji),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<RatingValue> {
        match self {
            Self::Rating(value) => Some(*value),
            _ => None,
        }
    }
}

/// Identity of the single row allowed per (actor, target, kind, emoji)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionKey {
    pub actor: ActorKey,
    pub target_id: Snowflake,
    pub kind: ReactionKind,
    pub emoji: Option<Emoji>,
}

impl ReactionKey {
    pub fn rating(actor: ActorKey, target_id: Snowflake) -> Self {
        Self {
            actor,
            target_id,
            kind: ReactionKind::Rating,
            emoji: None,
        }
    }
}

/// Reaction entity
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub actor: ActorKey,
    pub target_id: Snowflake,
    pub stance: Stance,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(actor: ActorKey, target_id: Snowflake, stance: Stance, now: DateTime<Utc>) -> Self {
        Self {
            actor,
            target_id,
            stance,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn kind(&self) -> ReactionKind {
        self.stance.kind()
    }

    pub fn key(&self) -> ReactionKey {
        ReactionKey {
            actor: self.actor,
            target_id: self.target_id,
            kind: self.kind(),
            emoji: self.stance.emoji().cloned(),
        }
    }
}
