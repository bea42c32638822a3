use super::{units_in, UnitScope, UnitScoped};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Role granted every unit by the built-in policy.
pub const ALL_UNITS_ROLE: &str = "admin";

const ALL_UNITS_SENTINEL: &str = "all";

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read access policy: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid access policy document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("role '{role}' grants '{value}'; expected \"all\" or a list of unit codes")]
    UnknownSentinel { role: String, value: String },
    #[error("roles '{first}' and '{second}' differ only in case")]
    DuplicateRole { first: String, second: String },
}

/// Role -> visible units table. Loaded once at start, read-only afterwards.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    roles: HashMap<String, UnitScope>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::empty().grant_all(ALL_UNITS_ROLE)
    }
}

impl AccessPolicy {
    pub fn empty() -> Self {
        Self {
            roles: HashMap::new(),
        }
    }

    pub fn grant_all(mut self, role: &str) -> Self {
        self.roles.insert(role_key(role), UnitScope::All);
        self
    }

    pub fn grant_units<I, S>(mut self, role: &str, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.roles.insert(role_key(role), UnitScope::only(units));
        self
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let file = std::fs::File::open(path.as_ref())?;
        let policy = Self::from_reader(file)?;
        debug!(
            path = %path.as_ref().display(),
            roles = policy.roles.len(),
            "access policy loaded"
        );
        Ok(policy)
    }

    /// Parses `{"roles": {"<role>": "all" | ["UNIT", ...]}}`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PolicyError> {
        let document: PolicyDocument = serde_json::from_reader(reader)?;
        let mut policy = Self::empty();
        let mut seen: HashMap<String, String> = HashMap::new();

        for (role, grant) in document.roles {
            if let Some(first) = seen.insert(role_key(&role), role.clone()) {
                return Err(PolicyError::DuplicateRole {
                    first,
                    second: role,
                });
            }
            policy = match grant {
                RoleGrant::Sentinel(value) if is_all_units_sentinel(&value) => {
                    policy.grant_all(&role)
                }
                RoleGrant::Sentinel(value) => {
                    return Err(PolicyError::UnknownSentinel { role, value });
                }
                RoleGrant::Units(units) => policy.grant_units(&role, units),
            };
        }

        Ok(policy)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Scope granted to `role`. Unknown or blank roles get no units.
    pub fn scope_for(&self, role: &str) -> UnitScope {
        match self.roles.get(&role_key(role)) {
            Some(scope) => scope.clone(),
            None => {
                warn!(role, "role not present in access policy; denying all units");
                UnitScope::none()
            }
        }
    }

    /// Concrete unit set for `role`. The all-units grant resolves against the
    /// units present in `dataset` now, since the roster can gain units.
    pub fn allowed_units<T: UnitScoped>(&self, role: &str, dataset: &[T]) -> BTreeSet<String> {
        match self.scope_for(role) {
            UnitScope::All => units_in(dataset),
            UnitScope::Only(units) => units,
        }
    }
}

fn is_all_units_sentinel(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(ALL_UNITS_SENTINEL)
}

fn role_key(role: &str) -> String {
    role.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct PolicyDocument {
    roles: BTreeMap<String, RoleGrant>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoleGrant {
    Sentinel(String),
    Units(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::domain::StaffingRecord;

    #[test]
    fn default_policy_grants_admin_everything() {
        let policy = AccessPolicy::default();
        assert!(policy.scope_for("Admin").is_all());
        assert!(policy.scope_for(" admin ").is_all());
    }

    #[test]
    fn unknown_role_fails_closed() {
        let policy = AccessPolicy::default();
        assert!(policy.scope_for("visitor").is_empty());
        assert!(policy.scope_for("").is_empty());
    }

    #[test]
    fn all_units_resolve_against_current_dataset() {
        let policy = AccessPolicy::default();
        let mut dataset = vec![StaffingRecord::new("A", 1, 1)];
        assert_eq!(policy.allowed_units("admin", &dataset).len(), 1);

        dataset.push(StaffingRecord::new("B", 1, 1));
        let units = policy.allowed_units("admin", &dataset);
        assert!(units.contains("A") && units.contains("B"));
    }

    #[test]
    fn parses_policy_document() {
        let json = r#"{"roles": {"admin": "ALL", "comando-a": ["baan", "Gap-RJ"]}}"#;
        let policy = AccessPolicy::from_reader(json.as_bytes()).expect("policy parses");

        assert!(policy.scope_for("admin").is_all());
        let scope = policy.scope_for("COMANDO-A");
        assert!(scope.permits("BAAN"));
        assert!(scope.permits("gap-rj"));
        assert!(!scope.permits("CINDACTA"));
    }

    #[test]
    fn rejects_unknown_sentinel() {
        let json = r#"{"roles": {"auditor": "everything"}}"#;
        let err = AccessPolicy::from_reader(json.as_bytes()).expect_err("sentinel rejected");
        assert!(matches!(err, PolicyError::UnknownSentinel { .. }));
    }

    #[test]
    fn rejects_roles_that_collide_after_case_folding() {
        let json = r#"{"roles": {"Admin": ["A"], "admin": "all"}}"#;
        let err = AccessPolicy::from_reader(json.as_bytes()).expect_err("duplicate rejected");
        let PolicyError::DuplicateRole { first, second } = err else {
            panic!("expected duplicate role error, got {err:?}");
        };
        assert_eq!((first.as_str(), second.as_str()), ("Admin", "admin"));
    }
}
