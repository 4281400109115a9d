//! Event records flowing through the pipeline.
//!
//! [`RawEvent`] is one line of a GH Archive partition as delivered by the event
//! source. [`NormalizedRow`] is the flat projection produced for every raw event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One raw archive record.
///
/// `actor`, `repo` and `payload` are kept as untyped JSON because they may arrive
/// either as nested objects or as JSON-encoded text; normalization decides how to
/// read them. Every field defaults so that a record missing a column still yields
/// a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event type discriminant, e.g. `PushEvent`
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Actor sub-record carrying `login` and `id`
    #[serde(default)]
    pub actor: Value,

    /// Repository sub-record carrying `name` and `id`
    #[serde(default)]
    pub repo: Value,

    /// Type-dependent payload
    #[serde(default)]
    pub payload: Value,

    /// ISO-8601 creation timestamp as delivered upstream
    #[serde(default)]
    pub created_at: String,
}

/// Flat row derived from exactly one [`RawEvent`].
///
/// Field order is the serialized column order. Optional values serialize as
/// `null` rather than being omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub created_at: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor_login: Option<String>,
    pub actor_id: Option<i64>,
    pub repo_name: Option<String>,
    pub repo_id: Option<i64>,
    /// Branch name, only for push events
    pub branch: Option<String>,
    /// Push size, only for push events
    pub tamano_push: Option<i64>,
    /// Action, only for pull request and issue events
    pub action: Option<String>,
    pub n_commits: u64,
}
