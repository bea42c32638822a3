use super::{format_display_name, ReconciliationEngine};
use crate::roster::domain::{PersonnelRecord, SectorType};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationFinding {
    pub id: String,
    pub unit: String,
    pub display_name: String,
    pub sector: SectorType,
    pub sector_label: &'static str,
    pub out_of_spec: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitReconciliation {
    pub unit: String,
    pub posts: usize,
    pub occupied: usize,
    pub vacant: usize,
    pub extra_allocation: usize,
    pub out_of_spec: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationReport {
    pub findings: Vec<ReconciliationFinding>,
    pub units: Vec<UnitReconciliation>,
}

impl ReconciliationReport {
    pub(super) fn build(engine: &ReconciliationEngine<'_>, records: &[PersonnelRecord]) -> Self {
        let mut units: BTreeMap<&str, UnitReconciliation> = BTreeMap::new();
        let mut findings = Vec::with_capacity(records.len());

        for record in records {
            let description = engine.describe_mismatch(record);
            let out_of_spec = description.is_some();

            let tally = units
                .entry(record.unit.as_str())
                .or_insert_with(|| UnitReconciliation {
                    unit: record.unit.clone(),
                    ..UnitReconciliation::default()
                });
            tally.posts += 1;
            if record.occupied() {
                tally.occupied += 1;
            } else {
                tally.vacant += 1;
            }
            if record.sector == SectorType::ExtraAllocation {
                tally.extra_allocation += 1;
            }
            if out_of_spec {
                tally.out_of_spec += 1;
            }

            findings.push(ReconciliationFinding {
                id: record.id.clone(),
                unit: record.unit.clone(),
                display_name: format_display_name(record),
                sector: record.sector,
                sector_label: record.sector.label(),
                out_of_spec,
                description,
            });
        }

        Self {
            findings,
            units: units.into_values().collect(),
        }
    }

    pub fn out_of_spec(&self) -> impl Iterator<Item = &ReconciliationFinding> {
        self.findings.iter().filter(|finding| finding.out_of_spec)
    }

    pub fn out_of_spec_count(&self) -> usize {
        self.units.iter().map(|unit| unit.out_of_spec).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::domain::PostSpec;

    #[test]
    fn tallies_posts_per_unit_in_unit_order() {
        let records = vec![
            PersonnelRecord::new("1", "cindacta")
                .with_assigned(PostSpec::new("SO", "TIC"))
                .with_filled(PostSpec::new("1S", "TIC"))
                .with_occupant("Rui Costa"),
            PersonnelRecord::new("2", "BAAN")
                .with_assigned(PostSpec::new("2S", "BCT"))
                .with_sector(SectorType::ExtraAllocation),
            PersonnelRecord::new("3", "BAAN")
                .with_assigned(PostSpec::new("SO", "TIC"))
                .with_filled(PostSpec::new("SO", "PD"))
                .with_occupant("Ana Reis"),
        ];

        let report = ReconciliationEngine::standard().reconcile(&records);

        assert_eq!(report.findings.len(), 3);
        assert_eq!(report.out_of_spec_count(), 1);
        assert_eq!(
            report.out_of_spec().map(|f| f.id.as_str()).collect::<Vec<_>>(),
            vec!["1"]
        );

        let units: Vec<_> = report.units.iter().map(|u| u.unit.as_str()).collect();
        assert_eq!(units, vec!["BAAN", "CINDACTA"]);

        let baan = &report.units[0];
        assert_eq!(baan.posts, 2);
        assert_eq!(baan.occupied, 1);
        assert_eq!(baan.vacant, 1);
        assert_eq!(baan.extra_allocation, 1);
        assert_eq!(baan.out_of_spec, 0);
    }

    #[test]
    fn empty_roster_yields_empty_report() {
        let report = ReconciliationEngine::standard().reconcile(&[]);
        assert!(report.findings.is_empty());
        assert!(report.units.is_empty());
    }
}
