//! Entity to model mappers
//!
//! - `From`/`TryFrom<Model> for Entity`: convert database rows to domain objects
//! - `*Insert` structs: prepare entity data for database writes

mod comment;
mod reaction;
mod target;

pub use comment::CommentInsert;
pub use reaction::{parse_kind, ReactionInsert};
