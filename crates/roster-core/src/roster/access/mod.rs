mod policy;
mod session;

pub use policy::{AccessPolicy, PolicyError, ALL_UNITS_ROLE};
pub use session::{
    FileSessionStore, InMemorySessionStore, SessionContext, SessionError, SessionStore,
};

use super::domain::{normalize_unit, PersonnelRecord, StaffingRecord};
use std::collections::BTreeSet;

/// Anything tied to an organizational unit can be scoped by role.
pub trait UnitScoped {
    fn unit_code(&self) -> &str;
}

impl UnitScoped for PersonnelRecord {
    fn unit_code(&self) -> &str {
        &self.unit
    }
}

impl UnitScoped for StaffingRecord {
    fn unit_code(&self) -> &str {
        &self.unit
    }
}

impl UnitScoped for String {
    fn unit_code(&self) -> &str {
        self
    }
}

/// Organizational units a caller may observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitScope {
    All,
    Only(BTreeSet<String>),
}

impl UnitScope {
    pub fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    pub fn only<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Only(
            units
                .into_iter()
                .map(|unit| normalize_unit(unit.as_ref()))
                .filter(|unit| !unit.is_empty())
                .collect(),
        )
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(units) if units.is_empty())
    }

    /// Case-insensitive membership test.
    pub fn permits(&self, unit: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(units) => units.contains(&normalize_unit(unit)),
        }
    }
}

/// Keeps only the records whose unit the scope permits.
///
/// `All` returns the input untouched and an empty scope returns nothing.
/// Must run before aggregation or display.
pub fn filter<T: UnitScoped>(mut records: Vec<T>, scope: &UnitScope) -> Vec<T> {
    match scope {
        UnitScope::All => records,
        UnitScope::Only(units) if units.is_empty() => Vec::new(),
        UnitScope::Only(_) => {
            records.retain(|record| scope.permits(record.unit_code()));
            records
        }
    }
}

/// Restricts selector options to the units the scope permits, keeping order.
pub fn available_units<I, S>(all_units: I, scope: &UnitScope) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let units = all_units
        .into_iter()
        .map(|unit| unit.as_ref().to_string())
        .collect::<Vec<_>>();
    filter(units, scope)
}

/// Distinct normalized units present in a dataset, ignoring blanks.
pub fn units_in<T: UnitScoped>(records: &[T]) -> BTreeSet<String> {
    records
        .iter()
        .map(|record| normalize_unit(record.unit_code()))
        .filter(|unit| !unit.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<StaffingRecord> {
        vec![
            StaffingRecord::new("A", 10, 8),
            StaffingRecord::new("a", 5, 5),
            StaffingRecord::new("B", 3, 6),
        ]
    }

    #[test]
    fn all_scope_is_identity() {
        assert_eq!(filter(records(), &UnitScope::All), records());
    }

    #[test]
    fn empty_scope_returns_nothing() {
        assert!(filter(records(), &UnitScope::none()).is_empty());
    }

    #[test]
    fn membership_ignores_case() {
        let kept = filter(records(), &UnitScope::only(["a"]));
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|record| record.unit == "A"));
    }

    #[test]
    fn unknown_unit_yields_empty_result() {
        assert!(filter(records(), &UnitScope::only(["ZZ"])).is_empty());
    }

    #[test]
    fn available_units_hide_unpermitted_options() {
        let scope = UnitScope::only(["gap-rj", "baan"]);
        let options = available_units(["BAAN", "CINDACTA", "GAP-RJ"], &scope);
        assert_eq!(options, vec!["BAAN".to_string(), "GAP-RJ".to_string()]);
    }

    #[test]
    fn units_in_collects_distinct_codes() {
        let units = units_in(&records());
        assert_eq!(units.into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
