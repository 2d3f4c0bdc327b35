//! Target - the content item (a recipe) reactions and comments attach to

use chrono::{DateTime, Utc};

use super::aggregate::ReactionAggregate;
use crate::value_objects::Snowflake;

/// Target entity. Only the engagement-facing columns are modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: Snowflake,
    pub title: String,
    pub aggregate: ReactionAggregate,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Target {
    pub fn new(id: Snowflake, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            aggregate: ReactionAggregate::default(),
            comment_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
