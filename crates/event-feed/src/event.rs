use chrono::{DateTime, Utc};
use common::{Meow, MeowId};
use serde::{Deserialize, Serialize};

use crate::Result;

/// What happened to the record carried by a change event.
///
/// Only creation exists today. New kinds must be matched explicitly by
/// consumers, since not every kind is safe to apply as an upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    #[default]
    Created,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Created => f.write_str("created"),
        }
    }
}

/// A change notification carrying a full record snapshot.
///
/// Delivered at-least-once with no ordering across IDs, so consumers must
/// tolerate duplicates and reordering. `kind` defaults to `created` when the
/// publisher omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(default)]
    pub kind: EventKind,
    pub id: MeowId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Creates a `created` event for the given record.
    pub fn created(meow: Meow) -> Self {
        Self {
            kind: EventKind::Created,
            id: meow.id,
            body: meow.body,
            created_at: meow.created_at,
        }
    }

    /// Returns the record snapshot carried by this event.
    pub fn record(&self) -> Meow {
        Meow {
            id: self.id.clone(),
            body: self.body.clone(),
            created_at: self.created_at,
        }
    }
}

/// The notice the database publishes when a record changes.
///
/// Carries only the kind and the ID, so that notices stay well under the
/// notification payload limit whatever the record size. The record itself is
/// loaded from the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    #[serde(default)]
    pub kind: EventKind,
    pub id: MeowId,
}

impl ChangeNotice {
    /// Decodes a notice from its JSON wire form.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Completes the notice with the stored record it refers to.
    pub fn into_event(self, meow: Meow) -> ChangeEvent {
        ChangeEvent {
            kind: self.kind,
            ..ChangeEvent::created(meow)
        }
    }
}
