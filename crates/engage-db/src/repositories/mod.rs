//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in engage-core.

mod comment;
mod error;
mod reaction;
mod target;

pub use comment::PgCommentRepository;
pub use reaction::PgReactionRepository;
pub use target::PgTargetRepository;
