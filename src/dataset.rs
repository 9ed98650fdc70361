//! Dataset loader.
//!
//! Reads the pre-processed appointments CSV into an immutable in-memory table
//! at process start. Any schema violation (missing column, unparseable value,
//! contradictory outcome flags) is a fatal startup error; nothing here is
//! recoverable per-request.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{AppointmentRecord, FilterMeta, Status};

/// Errors raised while loading the dataset. All of them abort startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed dataset row at line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Line {line}: unknown status {value:?} (expected \"Attended\" or \"Missed Appointment\")")]
    UnknownStatus { line: usize, value: String },

    #[error("Line {line}: unparseable scheduled date {value:?}")]
    InvalidDate { line: usize, value: String },

    #[error("Line {line}: MissedAppointment flag contradicts Status {status:?}")]
    InconsistentOutcome { line: usize, status: String },
}

/// Raw CSV row, column names as written by the upstream pipeline.
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "AgeGroup")]
    age_group: String,
    #[serde(rename = "IsRecurring", deserialize_with = "flexible_bool")]
    is_recurring: bool,
    #[serde(rename = "SameDayAppt", deserialize_with = "flexible_bool")]
    same_day: bool,
    #[serde(rename = "NumberOfConditions")]
    conditions: u32,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "MissedAppointment", deserialize_with = "flexible_bool")]
    missed: bool,
    #[serde(rename = "Scheduled_Date")]
    scheduled_date: String,
    #[serde(rename = "Days_Waited_Range")]
    days_waited_range: String,
    #[serde(rename = "Neighbourhood")]
    neighbourhood: String,
}

/// Accept pandas-style booleans: the upstream pre-processing writes Python
/// `True`/`False`, older exports use `1`/`0`.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "not a boolean: {other:?}"
        ))),
    }
}

/// The loaded appointments table. Read-only for the life of the process.
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<AppointmentRecord>,
}

impl Dataset {
    /// Load and validate the dataset from a CSV file.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_path(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for (index, row) in reader.deserialize().enumerate() {
            // Line 1 is the header, so data record N sits on line N + 1.
            let line = index + 2;
            let raw: CsvRow = row.map_err(|source| DatasetError::Row { line, source })?;
            records.push(validate_row(raw, line)?);
        }

        Ok(Self { records })
    }

    /// Build a dataset from already-validated records. Test seam.
    pub fn from_records(records: Vec<AppointmentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Derive the filter-control metadata the UI builds its controls from:
    /// gender options in first-seen order, age groups sorted ascending, both
    /// with the "All" wildcard prepended, plus the condition-count bounds.
    pub fn filter_meta(&self) -> FilterMeta {
        let mut gender_options = vec!["All".to_string()];
        for record in &self.records {
            if !gender_options.contains(&record.gender) {
                gender_options.push(record.gender.clone());
            }
        }

        let age_groups: BTreeSet<&str> =
            self.records.iter().map(|r| r.age_group.as_str()).collect();
        let mut age_group_options = vec!["All".to_string()];
        age_group_options.extend(age_groups.into_iter().map(str::to_string));

        let condition_min = self.records.iter().map(|r| r.conditions).min().unwrap_or(0);
        let condition_max = self.records.iter().map(|r| r.conditions).max().unwrap_or(0);

        FilterMeta {
            gender_options,
            age_group_options,
            condition_min,
            condition_max,
        }
    }
}

fn validate_row(raw: CsvRow, line: usize) -> Result<AppointmentRecord, DatasetError> {
    let status = match raw.status.as_str() {
        "Attended" => Status::Attended,
        "Missed Appointment" => Status::Missed,
        _ => {
            return Err(DatasetError::UnknownStatus {
                line,
                value: raw.status,
            })
        }
    };

    if raw.missed != (status == Status::Missed) {
        return Err(DatasetError::InconsistentOutcome {
            line,
            status: raw.status,
        });
    }

    let scheduled_date = parse_scheduled_date(&raw.scheduled_date).ok_or_else(|| {
        DatasetError::InvalidDate {
            line,
            value: raw.scheduled_date.clone(),
        }
    })?;

    Ok(AppointmentRecord {
        gender: raw.gender,
        age_group: raw.age_group,
        is_recurring: raw.is_recurring,
        same_day: raw.same_day,
        conditions: raw.conditions,
        status,
        missed: raw.missed,
        scheduled_date,
        days_waited_range: raw.days_waited_range,
        neighbourhood: raw.neighbourhood,
    })
}

/// Dates arrive as plain `YYYY-MM-DD`; some exports keep the midnight
/// timestamp pandas attaches to datetime columns.
fn parse_scheduled_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}
