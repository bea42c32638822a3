//! Spreadsheet exports in, normalized roster records out.
//!
//! Headers may use the sheet labels (`OM`, `POSTO TMFT`, `ESP EFE`, `TMFT`,
//! `EXI`, ...) or snake_case aliases. Cell-level problems degrade to absent
//! values; only unreadable files and broken CSV structure are errors.

mod normalizer;
mod parser;

use crate::roster::domain::{PersonnelRecord, StaffingRecord};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read roster export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn personnel_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<PersonnelRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::personnel_from_reader(file)
    }

    pub fn personnel_from_reader<R: Read>(reader: R) -> Result<Vec<PersonnelRecord>, ImportError> {
        Ok(parser::parse_personnel(reader)?)
    }

    pub fn staffing_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<StaffingRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::staffing_from_reader(file)
    }

    pub fn staffing_from_reader<R: Read>(reader: R) -> Result<Vec<StaffingRecord>, ImportError> {
        Ok(parser::parse_staffing(reader)?)
    }
}
