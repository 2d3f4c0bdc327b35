//! Actor - the identity a request acts as

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Role carried by an authenticated session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    #[default]
    Member,
    Editor,
    Admin,
}

impl FromStr for ActorRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" | "user" => Ok(Self::Member),
            "editor" => Ok(Self::Editor),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::ValidationError(format!("unknown role {other}"))),
        }
    }
}

/// Either an authenticated user or a cookie-identified guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Authenticated { id: Snowflake, role: ActorRole },
    Guest { id: Uuid },
}

impl Actor {
    pub fn guest(id: Uuid) -> Self {
        Self::Guest { id }
    }

    pub fn authenticated(id: Snowflake, role: ActorRole) -> Self {
        Self::Authenticated { id, role }
    }

    #[inline]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        match self {
            Self::Authenticated { id, .. } => Some(*id),
            Self::Guest { .. } => None,
        }
    }

    pub fn key(&self) -> ActorKey {
        ActorKey(*self)
    }
}

/// Stable string identity of an actor as persisted: `user:<id>` or `guest:<uuid>`.
///
/// Role is not part of the key; two sessions of the same user share one key.
#[derive(Debug, Clone, Copy)]
pub struct ActorKey(Actor);

impl ActorKey {
    pub fn actor(&self) -> Actor {
        self.0
    }

    pub fn is_guest(&self) -> bool {
        self.0.is_guest()
    }
}

impl PartialEq for ActorKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Actor::Authenticated { id: a, .. }, Actor::Authenticated { id: b, .. }) => a == b,
            (Actor::Guest { id: a }, Actor::Guest { id: b }) => a == b,
            _ => false,
        }
    }
}

impl Eq for ActorKey {}

impl std::hash::Hash for ActorKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self.0 {
            Actor::Authenticated { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            Actor::Guest { id } => {
                1u8.hash(state);
                id.hash(state);
            }
        }
    }
}

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Actor::Authenticated { id, .. } => write!(f, "user:{id}"),
            Actor::Guest { id } => write!(f, "guest:{}", id.as_hyphenated()),
        }
    }
}

impl FromStr for ActorKey {
    type Err = DomainError;

    /// Parsed user keys carry the default role; the role is not persisted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidActorKey(s.to_owned());
        let (prefix, rest) = s.split_once(':').ok_or_else(invalid)?;
        let actor = match prefix {
            "user" => Actor::authenticated(
                Snowflake::parse(rest).map_err(|_| invalid())?,
                ActorRole::default(),
            ),
            "guest" => Actor::guest(Uuid::parse_str(rest).map_err(|_| invalid())?),
            _ => return Err(invalid()),
        };
        Ok(Self(actor))
    }
}

impl Serialize for ActorKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
