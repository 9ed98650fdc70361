//! HTTP surface: serves the dashboard page and the JSON API the page talks
//! to. Handlers are thin wrappers over the dashboard service. All state is
//! read-only, so every request computes against its own filtered subset and
//! no locking is needed anywhere on this path.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::latency::{self, LatencyRollupsPayload};
use crate::services::dashboard::build_dashboard;
use crate::state::AppState;
use crate::types::{DashboardData, FilterMeta, FilterSelection};

/// Bind the configured address and serve until ctrl-c.
pub async fn serve(state: Arc<AppState>) -> Result<(), String> {
    let addr = state.config.listen_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    log::info!("appointments dashboard listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard_page))
        .route("/api/meta", get(get_meta))
        .route("/api/dashboard", post(post_dashboard))
        .route("/api/latency", get(get_latency))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        log::warn!("failed to install ctrl-c handler; running without shutdown signal");
        std::future::pending::<()>().await;
    }
    log::info!("shutdown signal received");
}

async fn serve_dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_PAGE_HTML)
}

/// Filter-control metadata the page builds its controls from.
async fn get_meta(State(state): State<Arc<AppState>>) -> Json<FilterMeta> {
    Json(state.meta.clone())
}

/// One recomputation pass: selection in, cards and chart specs out.
async fn post_dashboard(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<FilterSelection>,
) -> Json<DashboardData> {
    Json(build_dashboard(&state.dataset, &selection))
}

async fn get_latency() -> Json<LatencyRollupsPayload> {
    Json(latency::snapshot())
}

/// Minimal embedded shell. Fetches control metadata, posts the selection on
/// every control change, and hands the returned chart specs to Plotly.
const DASHBOARD_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Appointments Dashboard</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  body { font-family: "Segoe UI", Roboto, Helvetica, sans-serif; margin: 0; display: flex; }
  #sidebar { background: #212529; color: #eee; width: 220px; min-height: 100vh; padding: 20px; }
  #sidebar label { display: block; margin: 16px 0 4px; font-size: 14px; }
  #sidebar select, #sidebar input { width: 100%; }
  #main { flex: 1; padding: 16px; }
  h3 { text-align: center; }
  #cards { display: flex; gap: 12px; margin-bottom: 12px; }
  .card { flex: 1; border: 1px solid #ddd; border-radius: 8px; padding: 12px; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
  .card h6 { margin: 0; color: #555; }
  .card h2 { margin: 4px 0 0; }
  #charts { display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px; }
  .chart { height: 300px; }
</style>
</head>
<body>
<div id="sidebar">
  <h5>Filters</h5><hr>
  <label>Gender</label><select id="gender"></select>
  <label>Age Group</label><select id="ageGroup"></select>
  <label>Recurring Patient</label><select id="recurring">
    <option value="">All</option><option value="true">Yes</option><option value="false">No</option>
  </select>
  <label>Same Day Appointment</label><select id="sameDay">
    <option value="">All</option><option value="true">Yes</option><option value="false">No</option>
  </select>
  <label>Conditions (min / max)</label>
  <input id="condMin" type="number" step="1"> <input id="condMax" type="number" step="1">
</div>
<div id="main">
  <h3>📊 Appointments Dashboard</h3>
  <div id="cards"></div>
  <div id="charts"></div>
</div>
<script>
const controls = ["gender", "ageGroup", "recurring", "sameDay", "condMin", "condMax"];

function selection() {
  const val = id => document.getElementById(id).value;
  const sel = {};
  if (val("gender") !== "All") sel.gender = val("gender");
  if (val("ageGroup") !== "All") sel.ageGroup = val("ageGroup");
  if (val("recurring") !== "") sel.recurring = val("recurring") === "true";
  if (val("sameDay") !== "") sel.sameDay = val("sameDay") === "true";
  if (val("condMin") !== "" && val("condMax") !== "") {
    sel.conditionRange = { min: Number(val("condMin")), max: Number(val("condMax")) };
  }
  return sel;
}

function trace(spec, s) {
  if (spec.kind === "pie") return { type: "pie", labels: s.x, values: s.y, hole: spec.hole };
  if (spec.kind === "line") return { type: "scatter", mode: "lines", name: s.name, x: s.x, y: s.y };
  return { type: "bar", name: s.name, x: s.x, y: s.y, marker: s.color ? { color: s.color } : {} };
}

function layout(spec) {
  const l = { title: { text: spec.title, font: { size: 14 } }, margin: spec.margin, barmode: spec.barMode };
  if (spec.legend) l.legend = { orientation: spec.legend.orientation, x: spec.legend.x,
    y: spec.legend.y, xanchor: spec.legend.xAnchor, font: { size: spec.legend.fontSize } };
  if (spec.xTitle) l.xaxis = { title: { text: spec.xTitle } };
  if (spec.yTitle) l.yaxis = { title: { text: spec.yTitle } };
  if (spec.rangeButtons && spec.rangeButtons.length) {
    l.xaxis = Object.assign(l.xaxis || {}, { rangeselector: { buttons: [
      { count: 7, label: "1w", step: "day", stepmode: "backward" },
      { count: 1, label: "1m", step: "month", stepmode: "backward" },
      { count: 6, label: "6m", step: "month", stepmode: "backward" },
      { step: "all" },
    ] } });
  }
  return l;
}

async function refresh() {
  const res = await fetch("/api/dashboard", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(selection()),
  });
  const data = await res.json();
  document.getElementById("cards").innerHTML = data.cards.map(c =>
    `<div class="card"><h6>${c.icon} ${c.title}</h6><h2>${c.value}</h2></div>`).join("");
  const container = document.getElementById("charts");
  if (container.children.length !== data.charts.length) {
    container.innerHTML = data.charts.map((_, i) => `<div class="chart" id="chart-${i}"></div>`).join("");
  }
  data.charts.forEach((spec, i) => {
    Plotly.react(`chart-${i}`, spec.series.map(s => trace(spec, s)), layout(spec),
      { displayModeBar: false, responsive: true });
  });
}

async function init() {
  const meta = await (await fetch("/api/meta")).json();
  const fill = (id, options) => {
    document.getElementById(id).innerHTML =
      options.map(o => `<option value="${o}">${o}</option>`).join("");
  };
  fill("gender", meta.genderOptions);
  fill("ageGroup", meta.ageGroupOptions);
  document.getElementById("condMin").value = meta.conditionMin;
  document.getElementById("condMax").value = meta.conditionMax;
  controls.forEach(id => document.getElementById(id).addEventListener("change", refresh));
  await refresh();
}

init();
</script>
</body>
</html>"#;
