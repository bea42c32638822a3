use crate::roster::domain::{Code, StaffingRecord};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct MeanAccumulator {
    sum: f64,
    samples: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value.filter(|value| value.is_finite()) {
            self.sum += value;
            self.samples += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }
}

/// Per-rank means of the fill-rate and qualification percentages.
///
/// Means are kept unrounded; the `display_*` accessors round for
/// presentation only.
#[derive(Debug, Clone, PartialEq)]
pub struct RankPercentages {
    rank: Option<Code>,
    fill_rate: MeanAccumulator,
    qualification: MeanAccumulator,
}

impl RankPercentages {
    pub fn rank(&self) -> Option<&Code> {
        self.rank.as_ref()
    }

    pub fn fill_rate_mean(&self) -> Option<f64> {
        self.fill_rate.mean()
    }

    pub fn qualification_mean(&self) -> Option<f64> {
        self.qualification.mean()
    }

    pub fn fill_rate_samples(&self) -> usize {
        self.fill_rate.samples
    }

    pub fn qualification_samples(&self) -> usize {
        self.qualification.samples
    }

    pub fn display_fill_rate(&self) -> Option<i64> {
        self.fill_rate_mean().map(round_half_away_from_zero)
    }

    pub fn display_qualification(&self) -> Option<i64> {
        self.qualification_mean().map(round_half_away_from_zero)
    }
}

/// `f64::round` already rounds halves away from zero (2.5 -> 3, -2.5 -> -3).
pub fn round_half_away_from_zero(value: f64) -> i64 {
    value.round() as i64
}

/// Groups by rank and averages each percentage field on its own samples.
/// Records missing one field still contribute to the other.
pub fn percentage_metrics(records: &[StaffingRecord]) -> Vec<RankPercentages> {
    let mut by_rank: BTreeMap<Option<Code>, RankPercentages> = BTreeMap::new();

    for record in records {
        let entry = by_rank
            .entry(record.rank.clone())
            .or_insert_with(|| RankPercentages {
                rank: record.rank.clone(),
                fill_rate: MeanAccumulator::default(),
                qualification: MeanAccumulator::default(),
            });
        entry.fill_rate.push(record.fill_rate_pct);
        entry.qualification.push(record.qualification_pct);
    }

    by_rank.into_values().collect()
}
