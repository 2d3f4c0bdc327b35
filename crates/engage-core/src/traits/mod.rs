//! Ports - traits the domain needs implemented by infrastructure

mod ports;
mod repositories;

pub use ports::{
    Clock, CooldownDecision, CooldownStore, RiskAssessment, RiskRequest, RiskVerifier,
    SystemClock,
};
pub use repositories::{
    CommentRepository, ReactionGroupCount, ReactionRepository, RepoResult, TargetRepository,
};
