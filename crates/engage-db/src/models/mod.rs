//! Database models - SQLx-compatible structs for PostgreSQL tables

mod comment;
mod reaction;
mod target;

pub use comment::CommentModel;
pub use reaction::{
    EmojiCountModel, GroupCountModel, KindCountModel, RatingStatsModel, ReactionModel,
};
pub use target::TargetModel;
