mod report;

pub use report::{ReconciliationFinding, ReconciliationReport, UnitReconciliation};

use super::domain::{Code, PersonnelRecord, VACANCY_LABEL};
use super::equivalence::SpecialtyEquivalenceMap;
use serde::Serialize;

/// Rank categories that upstream sheets misfile into the specialty column.
/// They are not specialties, so the display prefix leaves them out.
const NON_SPECIALTY_CODES: &[&str] = &["QOAV", "QOINT", "QOINF", "QOENG", "QCOA", "QOCON"];

/// One side of a disagreement between the assigned and filled post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeChange {
    pub assigned: Code,
    pub filled: Code,
}

/// Why a record is out of spec. At least one side is always set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<CodeChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<CodeChange>,
}

impl Mismatch {
    pub fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(change) = &self.rank {
            parts.push(format!("rank {} -> {}", change.assigned, change.filled));
        }
        if let Some(change) = &self.specialty {
            parts.push(format!("specialty {} -> {}", change.assigned, change.filled));
        }
        parts.join("; ")
    }
}

/// Compares assigned (TMFT) against filled (EFE) posts. Holds no state beyond
/// the equivalence table it consults.
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine<'a> {
    equivalences: &'a SpecialtyEquivalenceMap,
}

impl Default for ReconciliationEngine<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReconciliationEngine<'static> {
    pub fn standard() -> Self {
        Self::new(SpecialtyEquivalenceMap::standard())
    }
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(equivalences: &'a SpecialtyEquivalenceMap) -> Self {
        Self { equivalences }
    }

    pub fn compare(
        &self,
        assigned_rank: Option<&Code>,
        assigned_specialty: Option<&Code>,
        filled_rank: Option<&Code>,
        filled_specialty: Option<&Code>,
        occupied: bool,
    ) -> Option<Mismatch> {
        if !occupied {
            return None;
        }

        let (
            Some(assigned_rank),
            Some(filled_rank),
            Some(assigned_specialty),
            Some(filled_specialty),
        ) = (assigned_rank, filled_rank, assigned_specialty, filled_specialty)
        else {
            return None;
        };

        let rank = (assigned_rank != filled_rank).then(|| CodeChange {
            assigned: assigned_rank.clone(),
            filled: filled_rank.clone(),
        });

        let specialty = (assigned_specialty != filled_specialty
            && !self
                .equivalences
                .are_equivalent(assigned_specialty, filled_specialty))
        .then(|| CodeChange {
            assigned: assigned_specialty.clone(),
            filled: filled_specialty.clone(),
        });

        if rank.is_none() && specialty.is_none() {
            None
        } else {
            Some(Mismatch { rank, specialty })
        }
    }

    pub fn mismatch(&self, record: &PersonnelRecord) -> Option<Mismatch> {
        self.compare(
            record.assigned.rank.as_ref(),
            record.assigned.specialty.as_ref(),
            record.filled.rank.as_ref(),
            record.filled.specialty.as_ref(),
            record.occupied(),
        )
    }

    /// Raw-token entry point: every token is trimmed and uppercased, and
    /// blank or sentinel tokens mean "not enough data", never a mismatch.
    pub fn is_out_of_spec(
        &self,
        assigned_rank: &str,
        assigned_specialty: &str,
        filled_rank: &str,
        filled_specialty: &str,
        occupied: bool,
    ) -> bool {
        self.compare(
            Code::parse(assigned_rank).as_ref(),
            Code::parse(assigned_specialty).as_ref(),
            Code::parse(filled_rank).as_ref(),
            Code::parse(filled_specialty).as_ref(),
            occupied,
        )
        .is_some()
    }

    pub fn record_out_of_spec(&self, record: &PersonnelRecord) -> bool {
        self.mismatch(record).is_some()
    }

    pub fn describe_mismatch(&self, record: &PersonnelRecord) -> Option<String> {
        self.mismatch(record).map(|mismatch| mismatch.describe())
    }

    pub fn reconcile(&self, records: &[PersonnelRecord]) -> ReconciliationReport {
        ReconciliationReport::build(self, records)
    }
}

/// Occupant name prefixed with `<rank>-<specialty> `, or the vacancy label.
///
/// The prefix comes from the filled post when occupied, else the assigned
/// post. A missing rank drops the prefix entirely; a missing or
/// administrative specialty drops only the specialty segment.
pub fn format_display_name(record: &PersonnelRecord) -> String {
    let Some(name) = record.occupant.name() else {
        return VACANCY_LABEL.to_string();
    };

    // A named occupant always counts as occupied, so the assigned branch is
    // not taken by records the model can build.
    let post = if record.occupied() {
        &record.filled
    } else {
        &record.assigned
    };

    let Some(rank) = &post.rank else {
        return name.to_string();
    };

    match post
        .specialty
        .as_ref()
        .filter(|specialty| !NON_SPECIALTY_CODES.contains(&specialty.as_str()))
    {
        Some(specialty) => format!("{rank}-{specialty} {name}"),
        None => format!("{rank} {name}"),
    }
}

pub fn is_out_of_spec(
    assigned_rank: &str,
    assigned_specialty: &str,
    filled_rank: &str,
    filled_specialty: &str,
    occupied: bool,
) -> bool {
    ReconciliationEngine::standard().is_out_of_spec(
        assigned_rank,
        assigned_specialty,
        filled_rank,
        filled_specialty,
        occupied,
    )
}
