//! Entity to DTO mappers

use engage_core::entities::{Comment, Reaction};

use super::responses::{CommentResponse, MyReactionResponse};

impl From<&Reaction> for MyReactionResponse {
    fn from(reaction: &Reaction) -> Self {
        Self {
            target_id: reaction.target_id,
            kind: reaction.kind(),
            emoji: reaction.stance.emoji().map(|e| e.as_str().to_owned()),
            value: reaction.stance.value().map(|v| v.get()),
            created_at: reaction.created_at,
        }
    }
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            target_id: comment.target_id,
            name: comment.display_name().to_owned(),
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self::from(&comment)
    }
}
