use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Appointment outcome as recorded by the upstream pre-processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Attended")]
    Attended,
    #[serde(rename = "Missed Appointment")]
    Missed,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Attended => "Attended",
            Status::Missed => "Missed Appointment",
        }
    }
}

/// One row of the appointments dataset. Immutable after load.
///
/// Age and days-waited buckets are pre-computed upstream; this core never
/// re-buckets continuous values.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRecord {
    pub gender: String,
    pub age_group: String,
    pub is_recurring: bool,
    pub same_day: bool,
    pub conditions: u32,
    pub status: Status,
    pub missed: bool,
    pub scheduled_date: NaiveDate,
    pub days_waited_range: String,
    pub neighbourhood: String,
}

/// Inclusive bounds for the condition-count slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRange {
    pub min: u32,
    pub max: u32,
}

/// Current value of every filter control, re-derived from the UI on each
/// event. `None` means the control sits on "All" (no constraint).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub recurring: Option<bool>,
    pub same_day: Option<bool>,
    pub condition_range: Option<ConditionRange>,
}

/// Filter-control metadata derived from the dataset at startup: dropdown
/// options (with the "All" wildcard prepended) and slider bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMeta {
    pub gender_options: Vec<String>,
    pub age_group_options: Vec<String>,
    pub condition_min: u32,
    pub condition_max: u32,
}

/// One of the three headline cards above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCard {
    pub title: String,
    pub value: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// A single plotted series. For pies, `x` carries slice labels and `y`
/// slice values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

/// Legend placement, plotly-style fractional coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub orientation: String,
    pub x: f64,
    pub y: f64,
    pub x_anchor: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
    pub l: u32,
    pub r: u32,
}

/// Abstract chart description consumed by the rendering layer. Not a
/// rendered image; the frontend maps this onto its plotting library.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    pub series: Vec<Series>,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    /// Grouped-bar layout marker for multi-series bar charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<String>,
    /// Donut hole fraction for pie charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    /// Time-range selector buttons for line charts (e.g. "1w", "1m").
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub range_buttons: Vec<String>,
}

/// Full recomputation output for one filter event: three cards, five charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub cards: Vec<SummaryCard>,
    pub charts: Vec<ChartSpec>,
}

/// Configuration stored in ~/.apptdash/config.json. Every field has a
/// default so a missing file means "run with defaults", not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub dataset_path: String,
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: "data/appointments.csv".to_string(),
            listen_addr: "127.0.0.1:8050".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_deserializes_to_wildcards() {
        let sel: FilterSelection = serde_json::from_str("{}").unwrap();
        assert_eq!(sel, FilterSelection::default());
    }

    #[test]
    fn selection_accepts_partial_payload() {
        let sel: FilterSelection =
            serde_json::from_str(r#"{"gender":"Male","conditionRange":{"min":1,"max":3}}"#)
                .unwrap();
        assert_eq!(sel.gender.as_deref(), Some("Male"));
        assert_eq!(sel.condition_range, Some(ConditionRange { min: 1, max: 3 }));
        assert_eq!(sel.recurring, None);
    }

    #[test]
    fn status_serializes_with_dataset_labels() {
        assert_eq!(
            serde_json::to_string(&Status::Missed).unwrap(),
            "\"Missed Appointment\""
        );
        assert_eq!(Status::Attended.label(), "Attended");
    }

    #[test]
    fn config_defaults_apply_to_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8050");
        assert_eq!(config.dataset_path, "data/appointments.csv");
    }
}
