use super::{RankPercentages, RosterSummary, RosterSummaryRow, SummaryTotals};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRowView {
    pub key: String,
    pub planned: u64,
    pub actual: u64,
    pub difference: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryTotalsView {
    pub planned: u64,
    pub actual: u64,
    pub difference: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterSummaryView {
    pub grouping: &'static str,
    pub rows: Vec<SummaryRowView>,
    pub totals: SummaryTotalsView,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_deficits: Vec<SummaryRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankPercentageView {
    pub rank: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_rate_pct: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification_pct: Option<i64>,
}

impl RosterSummaryRow {
    pub fn to_view(&self) -> SummaryRowView {
        SummaryRowView {
            key: self.key().label(),
            planned: self.planned(),
            actual: self.actual(),
            difference: self.difference(),
        }
    }
}

impl SummaryTotals {
    pub fn to_view(&self) -> SummaryTotalsView {
        SummaryTotalsView {
            planned: self.planned,
            actual: self.actual,
            difference: self.difference(),
        }
    }
}

impl RosterSummary {
    pub fn to_view(
        &self,
        grouping: &'static str,
        top_deficits: &[RosterSummaryRow],
    ) -> RosterSummaryView {
        RosterSummaryView {
            grouping,
            rows: self.rows().map(RosterSummaryRow::to_view).collect(),
            totals: self.totals().to_view(),
            top_deficits: top_deficits.iter().map(RosterSummaryRow::to_view).collect(),
        }
    }
}

impl RankPercentages {
    pub fn to_view(&self) -> RankPercentageView {
        RankPercentageView {
            rank: self
                .rank()
                .map_or_else(|| super::UNSPECIFIED_LABEL.to_string(), |rank| rank.to_string()),
            fill_rate_pct: self.display_fill_rate(),
            qualification_pct: self.display_qualification(),
        }
    }
}
