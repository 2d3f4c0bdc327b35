//! Target entity <-> model mapper

use engage_core::entities::{ReactionAggregate, Target};
use engage_core::value_objects::Snowflake;

use crate::models::TargetModel;

impl From<TargetModel> for Target {
    fn from(model: TargetModel) -> Self {
        Target {
            id: Snowflake::new(model.id),
            title: model.title,
            aggregate: ReactionAggregate {
                like: model.agg_like,
                love: model.agg_love,
                yum: model.agg_yum,
                wow: model.agg_wow,
                rating_avg: model.rating_avg,
                rating_count: model.rating_count,
            },
            comment_count: model.comment_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
