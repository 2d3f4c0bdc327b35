//! Domain entities - core business objects

mod actor;
mod aggregate;
mod comment;
mod reaction;
mod target;

pub use actor::{Actor, ActorKey, ActorRole};
pub use aggregate::{round2, RatingStats, ReactionAggregate};
pub use comment::Comment;
pub use reaction::{Reaction, ReactionKey, ReactionKind, Stance};
pub use target::Target;
