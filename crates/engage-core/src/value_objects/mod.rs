//! Value objects - immutable types that represent domain concepts

mod emoji;
mod rating;
mod snowflake;

pub use emoji::{Emoji, EmojiBucket};
pub use rating::RatingValue;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
