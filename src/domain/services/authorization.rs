use serde_json::Value;

use crate::domain::models::permissions::{Action, Module, Permissions};

/// Decides whether a permission document grants `action` on `module`.
///
/// `{"all": true}` grants everything, `{module: true}` grants every action on
/// that module and `{module: {action: true}}` grants just that action.
/// Anything else denies.
pub fn can_access(permissions: &Permissions, module: Module, action: Action) -> bool {
    if matches!(permissions.get("all"), Some(Value::Bool(true))) {
        return true;
    }

    match permissions.get(module.key()) {
        Some(Value::Bool(granted)) => *granted,
        Some(Value::Object(actions)) => matches!(actions.get(action.key()), Some(Value::Bool(true))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn perms(value: Value) -> Permissions {
        Permissions::from_value(value)
    }

    #[test]
    fn test_all_grants_everything() {
        let p = perms(json!({ "all": true }));
        assert!(can_access(&p, Module::Users, Action::Write));
        assert!(can_access(&p, Module::ExternalVisits, Action::Read));
    }

    #[test]
    fn test_read_only_module() {
        let p = perms(json!({ "users": { "read": true } }));
        assert!(can_access(&p, Module::Users, Action::Read));
        assert!(!can_access(&p, Module::Users, Action::Write));
    }

    #[test]
    fn test_missing_module_denies() {
        let p = perms(json!({ "visitas": true }));
        assert!(can_access(&p, Module::Visits, Action::Write));
        assert!(!can_access(&p, Module::Residents, Action::Read));
    }

    #[test]
    fn test_non_boolean_values_deny() {
        let p = perms(json!({ "all": "yes", "users": { "read": 1 }, "visitas": false, "residentes": [] }));
        assert!(!can_access(&p, Module::Users, Action::Read));
        assert!(!can_access(&p, Module::Visits, Action::Read));
        assert!(!can_access(&p, Module::Residents, Action::Read));
    }

    #[test]
    fn test_non_object_document_is_empty() {
        let p = perms(json!("all"));
        assert!(!can_access(&p, Module::Users, Action::Read));
    }
}
