use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a meow.
///
/// Assigned by the command side and treated as opaque here. Ordering is
/// lexicographic, which is what listing and search use as a tiebreak.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeowId(String);

impl MeowId {
    /// Creates an ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ID is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for MeowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MeowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MeowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single meow as seen by the query side.
///
/// Records are immutable once created; `id` is the natural key for upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meow {
    pub id: MeowId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Meow {
    pub fn new(id: impl Into<MeowId>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_meow_id_is_transparent_in_json() {
        let id = MeowId::new("2aWs1f");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"2aWs1f\"");
    }

    #[test]
    fn test_meow_id_blank_detection() {
        assert!(MeowId::new("").is_blank());
        assert!(MeowId::new("  ").is_blank());
        assert!(!MeowId::new("a").is_blank());
    }

    #[test]
    fn test_meow_id_orders_lexicographically() {
        assert!(MeowId::from("a") < MeowId::from("b"));
        assert!(MeowId::from("a1") < MeowId::from("a2"));
    }

    #[test]
    fn test_meow_json_shape() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let meow = Meow::new("m1", "hello cats", created_at);

        let json = serde_json::to_value(&meow).unwrap();
        assert_eq!(json["id"], "m1");
        assert_eq!(json["body"], "hello cats");
        assert_eq!(json["created_at"], "2024-03-01T12:00:00Z");

        let back: Meow = serde_json::from_value(json).unwrap();
        assert_eq!(back, meow);
    }
}
