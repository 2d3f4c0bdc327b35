//! # engage-core
//!
//! Domain layer for the engagement-integrity subsystem: actors, reactions, the
//! denormalized reaction aggregate, comments, and the ports (repository and
//! infrastructure traits) the application layer is written against.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod text;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Actor, ActorKey, ActorRole, Comment, RatingStats, Reaction, ReactionAggregate,
    ReactionKey, ReactionKind, Stance, Target,
};
pub use error::DomainError;
pub use traits::{
    Clock, CommentRepository, CooldownDecision, CooldownStore, ReactionGroupCount,
    ReactionRepository, RepoResult, RiskAssessment, RiskRequest, RiskVerifier, SystemClock,
    TargetRepository,
};
pub use value_objects::{
    Emoji, EmojiBucket, RatingValue, Snowflake, SnowflakeGenerator, SnowflakeParseError,
};
