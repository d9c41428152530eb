//! Output rendering for the query subcommands.

use clap::ValueEnum;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per object.
    Human,
    /// The raw API response, pretty-printed.
    Json,
}

/// What a response describes; picks the human layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    User,
    Team,
    Teams,
    Spaces,
    Projects,
    Tasks,
}

impl ObjectKind {
    /// Key the API wraps this payload in.
    pub fn envelope(&self) -> &'static str {
        match self {
            ObjectKind::User => "user",
            ObjectKind::Team => "team",
            ObjectKind::Teams => "teams",
            ObjectKind::Spaces => "spaces",
            ObjectKind::Projects => "projects",
            ObjectKind::Tasks => "tasks",
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{kind} response has no field {field:?}")]
    MissingField { kind: &'static str, field: String },

    #[error("{kind} response is not {expected}")]
    UnexpectedShape {
        kind: &'static str,
        expected: &'static str,
    },

    #[error("could not encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn render(kind: ObjectKind, value: &Value, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Human => render_human(kind, value),
    }
}

fn render_human(kind: ObjectKind, value: &Value) -> Result<String, FormatError> {
    match kind {
        ObjectKind::User => {
            let user = unwrap(kind, value);
            Ok(format!(
                "{} {}",
                field(kind, user, "id")?,
                field(kind, user, "username")?
            ))
        }
        ObjectKind::Team => team_line(unwrap(kind, value)),
        ObjectKind::Teams => {
            let lines = list(kind, value)?
                .iter()
                .map(team_line)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        }
        ObjectKind::Spaces | ObjectKind::Projects | ObjectKind::Tasks => {
            let lines = list(kind, value)?
                .iter()
                .map(|item| -> Result<String, FormatError> {
                    Ok(format!(
                        "{} {}",
                        field(kind, item, "id")?,
                        field(kind, item, "name")?
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        }
    }
}

fn team_line(team: &Value) -> Result<String, FormatError> {
    let kind = ObjectKind::Team;
    let members = team
        .get("members")
        .and_then(Value::as_array)
        .map(Vec::len)
        .ok_or_else(|| FormatError::MissingField {
            kind: kind.envelope(),
            field: "members".to_string(),
        })?;
    Ok(format!(
        "{} {} {} users",
        field(kind, team, "id")?,
        field(kind, team, "name")?,
        members
    ))
}

/// `{"<envelope>": inner}` → `inner`; anything else unchanged.
fn unwrap<'a>(kind: ObjectKind, value: &'a Value) -> &'a Value {
    value.get(kind.envelope()).unwrap_or(value)
}

fn list(kind: ObjectKind, value: &Value) -> Result<&Vec<Value>, FormatError> {
    unwrap(kind, value)
        .as_array()
        .ok_or(FormatError::UnexpectedShape {
            kind: kind.envelope(),
            expected: "a list",
        })
}

/// A scalar field as display text: strings bare, everything else as JSON.
fn field(kind: ObjectKind, value: &Value, name: &str) -> Result<String, FormatError> {
    match value.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(FormatError::MissingField {
            kind: kind.envelope(),
            field: name.to_string(),
        }),
    }
}
