//! In-memory latency rollups for the recompute pipeline.
//!
//! Each pass records how long the filter, aggregate, and present stages took
//! (plus the total), into a bounded sample window per stage. p50/p95/max
//! rollups are served over the diagnostics endpoint; nothing is persisted.

use std::sync::{Mutex, OnceLock};

use chrono::Utc;

const MAX_SAMPLES_PER_STAGE: usize = 256;

/// Per-stage budgets in milliseconds. The total budget is what matters for
/// the UI feeling synchronous; the stage budgets localize a violation.
const FILTER_BUDGET_MS: u128 = 10;
const AGGREGATE_BUDGET_MS: u128 = 25;
const PRESENT_BUDGET_MS: u128 = 10;
pub const PASS_BUDGET_MS: u128 = 50;

const STAGE_COUNT: usize = 4;
const STAGE_NAMES: [&str; STAGE_COUNT] = ["filter", "aggregate", "present", "total"];
const STAGE_BUDGETS_MS: [u128; STAGE_COUNT] = [
    FILTER_BUDGET_MS,
    AGGREGATE_BUDGET_MS,
    PRESENT_BUDGET_MS,
    PASS_BUDGET_MS,
];

/// Stage timings for one recomputation pass.
#[derive(Debug, Clone, Copy)]
pub struct PassTimings {
    pub filter_ms: u128,
    pub aggregate_ms: u128,
    pub present_ms: u128,
    pub total_ms: u128,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRollup {
    pub stage: String,
    pub sample_count: usize,
    pub p50_ms: u128,
    pub p95_ms: u128,
    pub max_ms: u128,
    pub budget_ms: u128,
    pub budget_violations: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyRollupsPayload {
    pub generated_at: String,
    pub stages: Vec<StageRollup>,
}

#[derive(Debug, Default)]
struct StageWindow {
    samples_ms: Vec<u128>,
    next: usize,
    budget_violations: u64,
}

impl StageWindow {
    fn push(&mut self, elapsed_ms: u128, budget_ms: u128) {
        if elapsed_ms > budget_ms {
            self.budget_violations += 1;
        }
        if self.samples_ms.len() < MAX_SAMPLES_PER_STAGE {
            self.samples_ms.push(elapsed_ms);
        } else {
            // Ring overwrite once the window is full.
            self.samples_ms[self.next] = elapsed_ms;
        }
        self.next = (self.next + 1) % MAX_SAMPLES_PER_STAGE;
    }
}

#[derive(Default)]
struct LatencyRecorder {
    windows: Mutex<[StageWindow; STAGE_COUNT]>,
}

impl LatencyRecorder {
    fn global() -> &'static Self {
        static RECORDER: OnceLock<LatencyRecorder> = OnceLock::new();
        RECORDER.get_or_init(Self::default)
    }
}

/// Record one pass worth of stage timings.
pub fn record_pass(timings: PassTimings) {
    let recorder = LatencyRecorder::global();
    let mut windows = match recorder.windows.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };
    let samples = [
        timings.filter_ms,
        timings.aggregate_ms,
        timings.present_ms,
        timings.total_ms,
    ];
    for (index, elapsed_ms) in samples.into_iter().enumerate() {
        windows[index].push(elapsed_ms, STAGE_BUDGETS_MS[index]);
    }
}

/// Snapshot the rollups for the diagnostics endpoint.
pub fn snapshot() -> LatencyRollupsPayload {
    let recorder = LatencyRecorder::global();
    let windows = match recorder.windows.lock() {
        Ok(guard) => guard,
        Err(_) => {
            return LatencyRollupsPayload {
                generated_at: Utc::now().to_rfc3339(),
                stages: Vec::new(),
            }
        }
    };

    let stages = windows
        .iter()
        .enumerate()
        .map(|(index, window)| {
            let mut values = window.samples_ms.clone();
            values.sort_unstable();
            StageRollup {
                stage: STAGE_NAMES[index].to_string(),
                sample_count: values.len(),
                p50_ms: percentile(&values, 50),
                p95_ms: percentile(&values, 95),
                max_ms: values.last().copied().unwrap_or(0),
                budget_ms: STAGE_BUDGETS_MS[index],
                budget_violations: window.budget_violations,
            }
        })
        .collect();

    LatencyRollupsPayload {
        generated_at: Utc::now().to_rfc3339(),
        stages,
    }
}

/// Nearest-rank percentile over sorted values; 0 for an empty window.
fn percentile(sorted: &[u128], pct: usize) -> u128 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (pct * sorted.len()).div_ceil(100);
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index]
}
