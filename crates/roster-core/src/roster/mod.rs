pub mod access;
pub mod aggregation;
pub mod domain;
pub mod equivalence;
pub mod reconciliation;

pub use access::{AccessPolicy, SessionContext, SessionStore, UnitScope, UnitScoped};
pub use aggregation::{group_by, top_deficits, GroupKey, Grouping, RosterSummary, RosterSummaryRow};
pub use domain::{Code, Occupant, PersonnelRecord, PostSpec, SectorType, StaffingRecord};
pub use equivalence::SpecialtyEquivalenceMap;
pub use reconciliation::{format_display_name, ReconciliationEngine, ReconciliationReport};
