use super::normalizer::{parse_count, parse_movement_date, parse_percentage};
use crate::roster::domain::{
    normalize_unit, Code, Occupant, PersonnelRecord, PostSpec, SectorType, StaffingRecord,
};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::debug;

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

pub(crate) fn parse_personnel<R: Read>(reader: R) -> Result<Vec<PersonnelRecord>, csv::Error> {
    let mut csv_reader = csv_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<PersonnelRow>().enumerate() {
        let row = row?;
        records.push(row.into_record(index + 1));
    }

    debug!(count = records.len(), "parsed personnel rows");
    Ok(records)
}

pub(crate) fn parse_staffing<R: Read>(reader: R) -> Result<Vec<StaffingRecord>, csv::Error> {
    let mut csv_reader = csv_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<StaffingRow>().enumerate() {
        let row = row?;
        records.push(row.into_record(index + 1));
    }

    debug!(count = records.len(), "parsed staffing rows");
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct PersonnelRow {
    #[serde(rename = "ID", alias = "id", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "OM", alias = "unit", default, deserialize_with = "empty_string_as_none")]
    unit: Option<String>,
    #[serde(
        rename = "POSTO TMFT",
        alias = "assigned_rank",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    assigned_rank: Option<String>,
    #[serde(
        rename = "ESP TMFT",
        alias = "assigned_specialty",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    assigned_specialty: Option<String>,
    #[serde(
        rename = "OPC TMFT",
        alias = "assigned_option",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    assigned_option: Option<String>,
    #[serde(
        rename = "POSTO EFE",
        alias = "filled_rank",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    filled_rank: Option<String>,
    #[serde(
        rename = "ESP EFE",
        alias = "filled_specialty",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    filled_specialty: Option<String>,
    #[serde(
        rename = "OPC EFE",
        alias = "filled_option",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    filled_option: Option<String>,
    #[serde(
        rename = "NOME",
        alias = "occupant",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    occupant: Option<String>,
    #[serde(rename = "SETOR", alias = "sector", default, deserialize_with = "empty_string_as_none")]
    sector: Option<String>,
}

impl PersonnelRow {
    fn into_record(self, row: usize) -> PersonnelRecord {
        PersonnelRecord {
            id: self.id.unwrap_or_else(|| format!("row-{row}")),
            unit: self.unit.as_deref().map(normalize_unit).unwrap_or_default(),
            assigned: PostSpec {
                rank: Code::parse_opt(self.assigned_rank.as_deref()),
                specialty: Code::parse_opt(self.assigned_specialty.as_deref()),
                option: Code::parse_opt(self.assigned_option.as_deref()),
            },
            filled: PostSpec {
                rank: Code::parse_opt(self.filled_rank.as_deref()),
                specialty: Code::parse_opt(self.filled_specialty.as_deref()),
                option: Code::parse_opt(self.filled_option.as_deref()),
            },
            occupant: Occupant::parse(self.occupant.as_deref()),
            sector: SectorType::parse(self.sector.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StaffingRow {
    #[serde(rename = "OM", alias = "unit", default, deserialize_with = "empty_string_as_none")]
    unit: Option<String>,
    #[serde(rename = "POSTO", alias = "rank", default, deserialize_with = "empty_string_as_none")]
    rank: Option<String>,
    #[serde(
        rename = "ESP",
        alias = "specialty",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    specialty: Option<String>,
    #[serde(rename = "TMFT", alias = "planned", default, deserialize_with = "empty_string_as_none")]
    planned: Option<String>,
    #[serde(rename = "EXI", alias = "actual", default, deserialize_with = "empty_string_as_none")]
    actual: Option<String>,
    #[serde(
        rename = "PREVISAO",
        alias = "projected_movement",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    projected_movement: Option<String>,
    #[serde(
        rename = "% EFETIVO",
        alias = "fill_rate_pct",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    fill_rate_pct: Option<String>,
    #[serde(
        rename = "% QUALIFICACAO",
        alias = "qualification_pct",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    qualification_pct: Option<String>,
}

impl StaffingRow {
    fn into_record(self, row: usize) -> StaffingRecord {
        StaffingRecord {
            unit: self.unit.as_deref().map(normalize_unit).unwrap_or_default(),
            rank: Code::parse_opt(self.rank.as_deref()),
            specialty: Code::parse_opt(self.specialty.as_deref()),
            planned: parse_count("TMFT", row, self.planned.as_deref()),
            actual: parse_count("EXI", row, self.actual.as_deref()),
            projected_movement: parse_movement_date(row, self.projected_movement.as_deref()),
            fill_rate_pct: parse_percentage("% EFETIVO", row, self.fill_rate_pct.as_deref()),
            qualification_pct: parse_percentage(
                "% QUALIFICACAO",
                row,
                self.qualification_pct.as_deref(),
            ),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
