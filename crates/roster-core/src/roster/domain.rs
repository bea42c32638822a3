use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Cell values that mean "nothing recorded" in the roster spreadsheets.
const ABSENT_SENTINELS: &[&str] = &["-", "--", "N/A", "NA", "S/N"];

/// Occupant cells that mark an unfilled post.
const VACANCY_SENTINELS: &[&str] = &["VAGO", "VAGA", "VACANT"];

/// Label rendered in place of an occupant name for unfilled posts.
pub const VACANCY_LABEL: &str = "VAGO";

/// Trims and uppercases an organizational-unit code.
pub fn normalize_unit(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

fn is_absent(normalized: &str) -> bool {
    normalized.is_empty() || ABSENT_SENTINELS.contains(&normalized)
}

/// Normalized rank, specialty or option token.
///
/// Construction goes through [`Code::parse`], so a `Code` is never blank and
/// never one of the absent sentinels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        if is_absent(&normalized) {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn parse_opt(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Code {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Occupant {
    Vacant,
    Named(String),
}

impl Occupant {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Vacant;
        };

        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let upper = collapsed.to_ascii_uppercase();
        if is_absent(&upper) || VACANCY_SENTINELS.contains(&upper.as_str()) {
            Self::Vacant
        } else {
            Self::Named(collapsed)
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Vacant => None,
            Self::Named(name) => Some(name),
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorType {
    Normal,
    ExtraAllocation,
}

impl SectorType {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.to_ascii_uppercase().contains("EXTRA") => Self::ExtraAllocation,
            _ => Self::Normal,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::ExtraAllocation => "Extra Allocation",
        }
    }
}

/// Rank, specialty and option of one side of a post (assigned or filled).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostSpec {
    pub rank: Option<Code>,
    pub specialty: Option<Code>,
    pub option: Option<Code>,
}

impl PostSpec {
    pub fn new(rank: &str, specialty: &str) -> Self {
        Self {
            rank: Code::parse(rank),
            specialty: Code::parse(specialty),
            option: None,
        }
    }

    pub fn with_option(mut self, option: &str) -> Self {
        self.option = Code::parse(option);
        self
    }
}

/// One post of the NEO roster: what it is authorized to hold (TMFT) and what
/// currently fills it (EFE).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonnelRecord {
    pub id: String,
    pub unit: String,
    pub assigned: PostSpec,
    pub filled: PostSpec,
    pub occupant: Occupant,
    pub sector: SectorType,
}

impl PersonnelRecord {
    pub fn new(id: impl Into<String>, unit: &str) -> Self {
        Self {
            id: id.into(),
            unit: normalize_unit(unit),
            assigned: PostSpec::default(),
            filled: PostSpec::default(),
            occupant: Occupant::Vacant,
            sector: SectorType::Normal,
        }
    }

    pub fn with_assigned(mut self, assigned: PostSpec) -> Self {
        self.assigned = assigned;
        self
    }

    pub fn with_filled(mut self, filled: PostSpec) -> Self {
        self.filled = filled;
        self
    }

    pub fn with_occupant(mut self, name: &str) -> Self {
        self.occupant = Occupant::parse(Some(name));
        self
    }

    pub fn with_sector(mut self, sector: SectorType) -> Self {
        self.sector = sector;
        self
    }

    pub fn occupied(&self) -> bool {
        self.occupant.is_occupied()
    }
}

/// Headcount row: planned (TMFT) against actual (EXI) for a unit/rank/specialty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffingRecord {
    pub unit: String,
    pub rank: Option<Code>,
    pub specialty: Option<Code>,
    pub planned: u32,
    pub actual: u32,
    pub projected_movement: Option<NaiveDate>,
    pub fill_rate_pct: Option<f64>,
    pub qualification_pct: Option<f64>,
}

impl StaffingRecord {
    pub fn new(unit: &str, planned: u32, actual: u32) -> Self {
        Self {
            unit: normalize_unit(unit),
            rank: None,
            specialty: None,
            planned,
            actual,
            projected_movement: None,
            fill_rate_pct: None,
            qualification_pct: None,
        }
    }

    pub fn with_rank(mut self, rank: &str) -> Self {
        self.rank = Code::parse(rank);
        self
    }

    pub fn with_specialty(mut self, specialty: &str) -> Self {
        self.specialty = Code::parse(specialty);
        self
    }

    pub fn with_projected_movement(mut self, date: NaiveDate) -> Self {
        self.projected_movement = Some(date);
        self
    }

    pub fn with_percentages(mut self, fill_rate: Option<f64>, qualification: Option<f64>) -> Self {
        self.fill_rate_pct = fill_rate;
        self.qualification_pct = qualification;
        self
    }
}

/// Calendar month used to bucket projected movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_parse_normalizes_and_rejects_sentinels() {
        assert_eq!(Code::parse("  tic ").map(|c| c.to_string()), Some("TIC".into()));
        assert!(Code::parse("").is_none());
        assert!(Code::parse("   ").is_none());
        assert!(Code::parse("-").is_none());
        assert!(Code::parse("n/a").is_none());
    }

    #[test]
    fn occupant_treats_vacancy_markers_as_vacant() {
        assert_eq!(Occupant::parse(None), Occupant::Vacant);
        assert_eq!(Occupant::parse(Some(" vago ")), Occupant::Vacant);
        assert_eq!(Occupant::parse(Some("-")), Occupant::Vacant);
        assert_eq!(
            Occupant::parse(Some("  Maria   Silva ")),
            Occupant::Named("Maria Silva".into())
        );
    }

    #[test]
    fn sector_detects_extra_allocation() {
        assert_eq!(SectorType::parse(Some("Extra-lotação")), SectorType::ExtraAllocation);
        assert_eq!(SectorType::parse(Some("Normal")), SectorType::Normal);
        assert_eq!(SectorType::parse(None), SectorType::Normal);
    }

    #[test]
    fn year_month_renders_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).expect("valid date");
        assert_eq!(YearMonth::of(date).to_string(), "2025-03");
    }
}
