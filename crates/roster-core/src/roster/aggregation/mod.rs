mod metrics;
pub mod views;

pub use metrics::{percentage_metrics, round_half_away_from_zero, RankPercentages};

use super::domain::{Code, StaffingRecord, YearMonth};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const UNSPECIFIED_LABEL: &str = "Unspecified";
const UNSCHEDULED_LABEL: &str = "Unscheduled";

/// Projection of a staffing record used to bucket headcounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Unit(String),
    Rank(Option<Code>),
    Specialty(Option<Code>),
    RankUnit { rank: Option<Code>, unit: String },
    SpecialtyRank { specialty: Option<Code>, rank: Option<Code> },
    Month(Option<YearMonth>),
}

impl GroupKey {
    pub fn label(&self) -> String {
        fn code_label(code: &Option<Code>) -> &str {
            code.as_ref().map_or(UNSPECIFIED_LABEL, Code::as_str)
        }

        match self {
            Self::Unit(unit) if unit.is_empty() => UNSPECIFIED_LABEL.to_string(),
            Self::Unit(unit) => unit.clone(),
            Self::Rank(rank) => code_label(rank).to_string(),
            Self::Specialty(specialty) => code_label(specialty).to_string(),
            Self::RankUnit { rank, unit } => format!("{} / {}", code_label(rank), unit),
            Self::SpecialtyRank { specialty, rank } => {
                format!("{} / {}", code_label(specialty), code_label(rank))
            }
            Self::Month(Some(month)) => month.to_string(),
            Self::Month(None) => UNSCHEDULED_LABEL.to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The supported key projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grouping {
    Unit,
    Rank,
    Specialty,
    RankUnit,
    SpecialtyRank,
    Month,
}

impl Grouping {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Unit,
            Self::Rank,
            Self::Specialty,
            Self::RankUnit,
            Self::SpecialtyRank,
            Self::Month,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Rank => "rank",
            Self::Specialty => "specialty",
            Self::RankUnit => "rank-unit",
            Self::SpecialtyRank => "specialty-rank",
            Self::Month => "month",
        }
    }

    pub fn key_for(self, record: &StaffingRecord) -> GroupKey {
        match self {
            Self::Unit => GroupKey::Unit(record.unit.clone()),
            Self::Rank => GroupKey::Rank(record.rank.clone()),
            Self::Specialty => GroupKey::Specialty(record.specialty.clone()),
            Self::RankUnit => GroupKey::RankUnit {
                rank: record.rank.clone(),
                unit: record.unit.clone(),
            },
            Self::SpecialtyRank => GroupKey::SpecialtyRank {
                specialty: record.specialty.clone(),
                rank: record.rank.clone(),
            },
            Self::Month => GroupKey::Month(record.projected_movement.map(YearMonth::of)),
        }
    }

    pub fn apply(self, records: &[StaffingRecord]) -> RosterSummary {
        group_by(records, |record| self.key_for(record))
    }
}

impl FromStr for Grouping {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ordered()
            .into_iter()
            .find(|grouping| grouping.label() == normalized)
            .ok_or_else(|| {
                let expected = Self::ordered().map(Self::label).join(", ");
                format!("unknown grouping '{value}' (expected one of: {expected})")
            })
    }
}

/// Planned (TMFT) and actual (EXI) sums for one key. The difference is
/// derived on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSummaryRow {
    key: GroupKey,
    planned: u64,
    actual: u64,
}

impl RosterSummaryRow {
    pub fn new(key: GroupKey, planned: u64, actual: u64) -> Self {
        Self {
            key,
            planned,
            actual,
        }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn planned(&self) -> u64 {
        self.planned
    }

    pub fn actual(&self) -> u64 {
        self.actual
    }

    /// EXI - TMFT: negative is a deficit, positive a surplus.
    pub fn difference(&self) -> i64 {
        self.actual as i64 - self.planned as i64
    }

    fn accumulate(&mut self, planned: u32, actual: u32) {
        self.planned += u64::from(planned);
        self.actual += u64::from(actual);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryTotals {
    pub planned: u64,
    pub actual: u64,
}

impl SummaryTotals {
    pub fn difference(&self) -> i64 {
        self.actual as i64 - self.planned as i64
    }
}

/// Grouped headcounts keyed and ordered by [`GroupKey`].
#[derive(Debug, Clone, Default)]
pub struct RosterSummary {
    rows: BTreeMap<GroupKey, RosterSummaryRow>,
}

impl RosterSummary {
    pub fn get(&self, key: &GroupKey) -> Option<&RosterSummaryRow> {
        self.rows.get(key)
    }

    pub fn rows(&self) -> impl Iterator<Item = &RosterSummaryRow> {
        self.rows.values()
    }

    pub fn into_rows(self) -> Vec<RosterSummaryRow> {
        self.rows.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn totals(&self) -> SummaryTotals {
        self.rows
            .values()
            .fold(SummaryTotals::default(), |totals, row| SummaryTotals {
                planned: totals.planned + row.planned,
                actual: totals.actual + row.actual,
            })
    }
}

/// Sums planned and actual counts per key. Every record lands in exactly one
/// row; an empty input gives an empty summary.
pub fn group_by<F>(records: &[StaffingRecord], key_fn: F) -> RosterSummary
where
    F: Fn(&StaffingRecord) -> GroupKey,
{
    let mut rows: BTreeMap<GroupKey, RosterSummaryRow> = BTreeMap::new();

    for record in records {
        let key = key_fn(record);
        rows.entry(key.clone())
            .or_insert_with(|| RosterSummaryRow::new(key, 0, 0))
            .accumulate(record.planned, record.actual);
    }

    RosterSummary { rows }
}

/// The `n` most negative rows, most severe first.
///
/// The sort is stable: rows with equal difference keep their input order.
pub fn top_deficits(rows: &[RosterSummaryRow], n: usize) -> Vec<RosterSummaryRow> {
    let mut deficits: Vec<RosterSummaryRow> = rows
        .iter()
        .filter(|row| row.difference() < 0)
        .cloned()
        .collect();
    deficits.sort_by_key(RosterSummaryRow::difference);
    deficits.truncate(n);
    deficits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Vec<StaffingRecord> {
        vec![
            StaffingRecord::new("A", 10, 8).with_rank("SO").with_specialty("TIC"),
            StaffingRecord::new("A", 5, 5).with_rank("1S").with_specialty("BCT"),
            StaffingRecord::new("B", 3, 6).with_rank("SO").with_specialty("TIC"),
        ]
    }

    #[test]
    fn groups_by_unit_with_derived_difference() {
        let summary = Grouping::Unit.apply(&sample());

        let a = summary.get(&GroupKey::Unit("A".into())).expect("unit A");
        assert_eq!((a.planned(), a.actual(), a.difference()), (15, 13, -2));

        let b = summary.get(&GroupKey::Unit("B".into())).expect("unit B");
        assert_eq!((b.planned(), b.actual(), b.difference()), (3, 6, 3));

        let totals = summary.totals();
        assert_eq!(totals.actual, 19);
        assert_eq!(totals.difference(), 1);
    }

    #[test]
    fn cross_tab_keys_split_rank_and_unit() {
        let summary = Grouping::RankUnit.apply(&sample());
        assert_eq!(summary.len(), 3);

        let labels: Vec<_> = summary.rows().map(|row| row.key().label()).collect();
        assert!(labels.contains(&"SO / A".to_string()));
        assert!(labels.contains(&"SO / B".to_string()));

        let by_specialty_rank = Grouping::SpecialtyRank.apply(&sample());
        let tic_so = by_specialty_rank
            .get(&GroupKey::SpecialtyRank {
                specialty: Code::parse("TIC"),
                rank: Code::parse("SO"),
            })
            .expect("TIC / SO row");
        assert_eq!(tic_so.planned(), 13);
    }

    #[test]
    fn month_grouping_keeps_unscheduled_records() {
        let march = NaiveDate::from_ymd_opt(2025, 3, 12).expect("valid date");
        let records = vec![
            StaffingRecord::new("A", 1, 0).with_projected_movement(march),
            StaffingRecord::new("A", 2, 1),
        ];
        let summary = Grouping::Month.apply(&records);

        let labels: Vec<_> = summary.rows().map(|row| row.key().label()).collect();
        assert_eq!(labels, vec!["Unscheduled", "2025-03"]);
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        assert!(Grouping::Rank.apply(&[]).is_empty());
    }

    #[test]
    fn top_deficits_sorts_by_severity_and_keeps_ties_in_input_order() {
        let rows = vec![
            RosterSummaryRow::new(GroupKey::Unit("A".into()), 5, 4),
            RosterSummaryRow::new(GroupKey::Unit("B".into()), 5, 1),
            RosterSummaryRow::new(GroupKey::Unit("C".into()), 5, 9),
            RosterSummaryRow::new(GroupKey::Unit("D".into()), 7, 6),
        ];

        let top = top_deficits(&rows, 5);
        let labels: Vec<_> = top.iter().map(|row| row.key().label()).collect();
        assert_eq!(labels, vec!["B", "A", "D"]);

        assert_eq!(top_deficits(&rows, 1).len(), 1);
        assert!(top_deficits(&rows, 0).is_empty());
    }

    #[test]
    fn grouping_parses_from_cli_labels() {
        assert_eq!("rank_unit".parse::<Grouping>(), Ok(Grouping::RankUnit));
        assert_eq!(" Month ".parse::<Grouping>(), Ok(Grouping::Month));
        assert!("district".parse::<Grouping>().is_err());
    }
}
