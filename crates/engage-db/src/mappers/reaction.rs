//! Reaction entity <-> model mapper

use engage_core::entities::{Reaction, ReactionKind, Stance};
use engage_core::error::DomainError;
use engage_core::value_objects::Snowflake;
use engage_core::ReactionGroupCount;

use crate::models::{GroupCountModel, ReactionModel};

/// Kinds are stored as their upper-case names
pub fn parse_kind(raw: &str) -> Result<ReactionKind, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::DatabaseError(format!("unknown reaction kind in row: {raw}")))
}

impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        let kind = parse_kind(&model.kind)?;
        let stance = Stance::from_parts(kind, model.emoji.as_deref(), model.value.map(i64::from))?;
        Ok(Reaction {
            actor: model.actor_key.parse()?,
            target_id: Snowflake::new(model.target_id),
            stance,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<GroupCountModel> for ReactionGroupCount {
    type Error = DomainError;

    fn try_from(model: GroupCountModel) -> Result<Self, Self::Error> {
        Ok(ReactionGroupCount {
            target_id: Snowflake::new(model.target_id),
            kind: parse_kind(&model.kind)?,
            emoji: model.emoji,
            count: model.count,
        })
    }
}

/// Column values for inserting a reaction
pub struct ReactionInsert<'a> {
    pub actor_key: String,
    pub target_id: i64,
    pub kind: &'static str,
    pub emoji: Option<&'a str>,
    pub value: Option<i16>,
}

impl<'a> ReactionInsert<'a> {
    pub fn new(reaction: &'a Reaction) -> Self {
        Self {
            actor_key: reaction.actor.to_string(),
            target_id: reaction.target_id.into_inner(),
            kind: reaction.kind().as_str(),
            emoji: reaction.stance.emoji().map(|e| e.as_str()),
            value: reaction.stance.value().map(i16::from),
        }
    }
}
