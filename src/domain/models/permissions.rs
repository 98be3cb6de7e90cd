use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Application modules guarded by profile permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {
    Users,
    Residents,
    Visits,
    ExternalVisits,
}

impl Module {
    pub fn key(self) -> &'static str {
        match self {
            Module::Users => "users",
            Module::Residents => "residentes",
            Module::Visits => "visitas",
            Module::ExternalVisits => "visitas_externas",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    pub fn key(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A profile's permission document, e.g. `{"all": true}` or
/// `{"users": {"read": true}, "visitas": true}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub Map<String, Value>);

impl Permissions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Anything other than a JSON object is treated as an empty document.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

impl From<Value> for Permissions {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
