//! Axum extractors for request handling
//!
//! Resolved actors, client network details, and validated bodies and queries.

mod actor;
mod client;
mod validated;

pub use actor::{CurrentActor, KnownActor};
pub use client::{ClientIpKeyExtractor, ClientMeta};
pub use validated::{ValidatedJson, ValidatedQuery};
