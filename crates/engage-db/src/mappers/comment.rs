//! Comment entity <-> model mapper

use engage_core::entities::Comment;
use engage_core::error::DomainError;
use engage_core::value_objects::Snowflake;

use crate::models::CommentModel;

impl TryFrom<CommentModel> for Comment {
    type Error = DomainError;

    fn try_from(model: CommentModel) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: Snowflake::new(model.id),
            target_id: Snowflake::new(model.target_id),
            actor: model.actor_key.parse()?,
            author_id: model.author_id.map(Snowflake::new),
            name: model.name,
            email: model.email,
            text: model.text,
            text_hash: model.text_hash,
            ip_hash: model.ip_hash,
            user_agent: model.user_agent,
            risk_score: model.risk_score,
            is_published: model.is_published,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Column values for inserting a comment
pub struct CommentInsert<'a> {
    pub id: i64,
    pub target_id: i64,
    pub actor_key: String,
    pub author_id: Option<i64>,
    pub comment: &'a Comment,
}

impl<'a> CommentInsert<'a> {
    pub fn new(comment: &'a Comment) -> Self {
        Self {
            id: comment.id.into_inner(),
            target_id: comment.target_id.into_inner(),
            actor_key: comment.actor.to_string(),
            author_id: comment.author_id.map(Snowflake::into_inner),
            comment,
        }
    }
}
