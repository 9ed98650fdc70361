//! Filter engine: narrows the dataset to the rows matching the current
//! selection. Every constraint is optional and they combine with AND; the
//! result may be empty and that is not an error.

use crate::dataset::Dataset;
use crate::types::{AppointmentRecord, FilterSelection};

/// Apply `selection` to the full dataset, returning borrowed matching rows.
///
/// An inverted condition range (min > max) matches nothing: the bounds are
/// applied as-is, never reinterpreted as "no constraint".
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> Vec<&'a AppointmentRecord> {
    dataset
        .records()
        .iter()
        .filter(|record| matches(record, selection))
        .collect()
}

fn matches(record: &AppointmentRecord, selection: &FilterSelection) -> bool {
    if let Some(gender) = &selection.gender {
        if record.gender != *gender {
            return false;
        }
    }
    if let Some(age_group) = &selection.age_group {
        if record.age_group != *age_group {
            return false;
        }
    }
    if let Some(recurring) = selection.recurring {
        if record.is_recurring != recurring {
            return false;
        }
    }
    if let Some(same_day) = selection.same_day {
        if record.same_day != same_day {
            return false;
        }
    }
    if let Some(range) = selection.condition_range {
        if record.conditions < range.min || record.conditions > range.max {
            return false;
        }
    }
    true
}
