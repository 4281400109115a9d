use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::{NormalizedRow, RawEvent};

/// Event types whose payloads carry fields worth extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Push,
    PullRequest,
    Issues,
    Other,
}

impl EventKind {
    /// Resolve the upstream `type` discriminant. Unknown types map to [`EventKind::Other`].
    pub fn from_discriminant(kind: &str) -> Self {
        match kind {
            "PushEvent" => EventKind::Push,
            "PullRequestEvent" => EventKind::PullRequest,
            "IssuesEvent" => EventKind::Issues,
            _ => EventKind::Other,
        }
    }

    /// Return the upstream discriminant for this kind (`None` for [`EventKind::Other`]).
    pub const fn discriminant(self) -> Option<&'static str> {
        match self {
            EventKind::Push => Some("PushEvent"),
            EventKind::PullRequest => Some("PullRequestEvent"),
            EventKind::Issues => Some("IssuesEvent"),
            EventKind::Other => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminant().unwrap_or("other"))
    }
}

/// Type-specific fields derived from a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetails {
    Push {
        branch: String,
        size: i64,
        commits: u64,
    },
    PullRequest {
        action: Option<String>,
    },
    Issues {
        action: Option<String>,
    },
    Other,
}

impl EventDetails {
    pub fn branch(&self) -> Option<&str> {
        match self {
            EventDetails::Push { branch, .. } => Some(branch.as_str()),
            _ => None,
        }
    }

    pub fn push_size(&self) -> Option<i64> {
        match self {
            EventDetails::Push { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            EventDetails::PullRequest { action } | EventDetails::Issues { action } => {
                action.as_deref()
            }
            _ => None,
        }
    }

    /// Commit count; zero for anything but a push.
    pub fn commit_count(&self) -> u64 {
        match self {
            EventDetails::Push { commits, .. } => *commits,
            _ => 0,
        }
    }
}

/// Scalar identity fields taken from the `actor` and `repo` sub-records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub actor_login: Option<String>,
    pub actor_id: Option<i64>,
    pub repo_name: Option<String>,
    pub repo_id: Option<i64>,
}

/// Reasons a structured sub-field could not be read as a mapping.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("text is neither JSON nor a literal mapping: {0}")]
    Unparseable(#[from] serde_json::Error),
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Rewrite literal mapping syntax as JSON text: single-quoted strings, `True`,
/// `False`, `None`, tuples and trailing commas.
///
/// Returns `None` when a string is left unterminated. Anything else is passed
/// through untouched for the JSON parser to judge.
fn literal_to_json(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                loop {
                    match chars.next()? {
                        '\\' => match chars.next()? {
                            '\'' => out.push('\''),
                            escaped => {
                                out.push('\\');
                                out.push(escaped);
                            }
                        },
                        ch if ch == c => break,
                        '"' => out.push_str("\\\""),
                        ch => out.push(ch),
                    }
                }
                out.push('"');
            }
            '(' => out.push('['),
            ')' | ']' | '}' => {
                out.truncate(out.trim_end().len());
                if out.ends_with(',') {
                    out.pop();
                }
                out.push(if c == ')' { ']' } else { c });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
            }
            c => out.push(c),
        }
    }

    Some(out)
}

/// Interpret `value` as a mapping.
///
/// Objects are used as-is. Strings are parsed as JSON text first, then as literal
/// mapping syntax (`{'login': 'ghost', 'admin': False}`), and must contain an
/// object. Everything else is rejected.
pub fn decode_mapping(value: &Value) -> Result<Map<String, Value>, DecodeError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::String(text) => {
            let parsed = match serde_json::from_str::<Value>(text) {
                Ok(parsed) => parsed,
                Err(json_err) => literal_to_json(text)
                    .and_then(|converted| serde_json::from_str(&converted).ok())
                    .ok_or(DecodeError::Unparseable(json_err))?,
            };
            match parsed {
                Value::Object(map) => Ok(map),
                other => Err(DecodeError::NotAnObject {
                    found: json_type_name(&other),
                }),
            }
        }
        other => Err(DecodeError::NotAnObject {
            found: json_type_name(other),
        }),
    }
}

/// Best-effort variant of [`decode_mapping`]: any failure yields an empty map.
pub fn lenient_mapping(field: &'static str, value: &Value) -> Map<String, Value> {
    decode_mapping(value).unwrap_or_else(|err| {
        debug!(field, error = %err, "sub-record degraded to empty mapping");
        Map::new()
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Integers, or strings holding one, are accepted as identifiers.
fn integer_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Field Normalizer: read `login`/`id` from `actor` and `name`/`id` from `repo`.
pub fn extract_identity(event: &RawEvent) -> Identity {
    let actor = lenient_mapping("actor", &event.actor);
    let repo = lenient_mapping("repo", &event.repo);

    Identity {
        actor_login: string_field(&actor, "login"),
        actor_id: integer_field(&actor, "id"),
        repo_name: string_field(&repo, "name"),
        repo_id: integer_field(&repo, "id"),
    }
}

/// Last `/`-separated segment of a git ref. A missing ref gives an empty branch.
pub fn branch_from_ref(git_ref: Option<&str>) -> String {
    git_ref
        .and_then(|r| r.rsplit('/').next())
        .unwrap_or_default()
        .to_string()
}

/// Event-Type Detail Extractor. `payload` must already be decoded.
pub fn extract_details(kind: EventKind, payload: &Map<String, Value>) -> EventDetails {
    match kind {
        EventKind::Push => EventDetails::Push {
            branch: branch_from_ref(payload.get("ref").and_then(Value::as_str)),
            size: integer_field(payload, "size").unwrap_or(0),
            commits: payload
                .get("commits")
                .and_then(Value::as_array)
                .map_or(0, |commits| commits.len() as u64),
        },
        EventKind::PullRequest => EventDetails::PullRequest {
            action: string_field(payload, "action"),
        },
        EventKind::Issues => EventDetails::Issues {
            action: string_field(payload, "action"),
        },
        EventKind::Other => EventDetails::Other,
    }
}

/// Row Projector: assemble the final column set.
pub fn project_row(event: &RawEvent, identity: Identity, details: &EventDetails) -> NormalizedRow {
    NormalizedRow {
        created_at: event.created_at.clone(),
        kind: event.kind.clone(),
        actor_login: identity.actor_login,
        actor_id: identity.actor_id,
        repo_name: identity.repo_name,
        repo_id: identity.repo_id,
        branch: details.branch().map(str::to_owned),
        tamano_push: details.push_size(),
        action: details.action().map(str::to_owned),
        n_commits: details.commit_count(),
    }
}

/// Normalize one raw event. Never fails; malformed sub-records degrade to defaults.
pub fn normalize_event(event: &RawEvent) -> NormalizedRow {
    let kind = EventKind::from_discriminant(&event.kind);
    let identity = extract_identity(event);

    let details = match kind {
        EventKind::Other => EventDetails::Other,
        _ => extract_details(kind, &lenient_mapping("payload", &event.payload)),
    };

    project_row(event, identity, &details)
}

/// Normalize a batch, preserving order and producing exactly one row per event.
pub fn normalize_events(events: &[RawEvent]) -> Vec<NormalizedRow> {
    events.iter().map(normalize_event).collect()
}
