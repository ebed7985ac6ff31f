//! Zonal analysis handler.
//!
//! `POST /analyze` takes a GeoJSON polygon, an optional time selector, and
//! an optional layer list, and returns zonal statistics per layer plus a
//! condition outlook. Unlike the tile proxy this endpoint reports real HTTP
//! errors for bad requests; only per-layer upstream trouble degrades to a
//! `null` layer entry with a warning, so one flaky product does not sink
//! the whole analysis.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::future::join_all;
use metrics::{counter, histogram};
use ocean_common::{LayerId, OceanError, Polygon, ResolvedTime, TimeSelector};
use outlook::classify;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time_resolve::probe_pixel;
use tracing::{instrument, warn};
use zonal_sampler::SampleReport;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// GeoJSON Polygon, or a Feature wrapping one
    pub polygon: serde_json::Value,
    /// Time selector: "latest", "today", "-1d".."-3d", or "YYYY-MM-DD"
    #[serde(default)]
    pub time: Option<String>,
    /// Layers to analyze; defaults to all configured layers
    #[serde(default)]
    pub layers: Option<Vec<String>>,
}

/// One layer's analysis in the response.
#[derive(Debug, Serialize)]
struct LayerAnalysis {
    #[serde(flatten)]
    report: SampleReport,
    time: ResolvedTimeView,
}

#[derive(Debug, Serialize)]
struct ResolvedTimeView {
    token: String,
    date: chrono::NaiveDate,
    fallback_depth: u8,
    label: String,
}

impl From<ResolvedTime> for ResolvedTimeView {
    fn from(t: ResolvedTime) -> Self {
        Self {
            label: t.label(),
            token: t.token,
            date: t.date,
            fallback_depth: t.fallback_depth,
        }
    }
}

/// Request-level metadata: what time the analysis actually ran against and
/// how much of the sampling grid the polygon covered, plus per-layer
/// warnings for degraded entries.
#[derive(Debug, Serialize)]
struct ResponseMeta {
    coverage_pct: Option<f64>,
    resolved_time: Option<String>,
    fallback_depth: Option<u8>,
    warnings: Vec<String>,
}

impl ResponseMeta {
    fn new() -> Self {
        Self {
            coverage_pct: None,
            resolved_time: None,
            fallback_depth: None,
            warnings: Vec::new(),
        }
    }

    /// Record the first successful layer. All layers share one polygon and
    /// one selector, so the first resolution speaks for the request.
    fn record(&mut self, coverage: f64, time: &ResolvedTimeView) {
        if self.resolved_time.is_some() {
            return;
        }
        self.coverage_pct = Some(coverage * 100.0);
        self.resolved_time = Some(time.token.clone());
        self.fallback_depth = Some(time.fallback_depth);
    }
}

#[instrument(skip(state, request))]
pub async fn analyze_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let started = Instant::now();
    let response = match run_analysis(&state, request).await {
        Ok(body) => {
            counter!("ocean_analyze_total", "status" => "ok").increment(1);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            counter!("ocean_analyze_total", "status" => "error").increment(1);
            error_response(e)
        }
    };
    histogram!("ocean_analyze_duration_seconds").record(started.elapsed().as_secs_f64());
    response
}

async fn run_analysis(
    state: &AppState,
    request: AnalyzeRequest,
) -> Result<serde_json::Value, OceanError> {
    let polygon = Polygon::from_geojson(&request.polygon)?;
    let selector = TimeSelector::parse(request.time.as_deref().unwrap_or(""))?;
    let layer_ids = requested_layers(state, request.layers)?;

    // One representative probe point for the whole zone
    let (lon, lat) = polygon.bbox().center();
    let probe_point = probe_pixel(lon, lat);

    let analyses = join_all(layer_ids.iter().map(|&id| {
        let polygon = &polygon;
        let probe_point = &probe_point;
        let selector = &selector;
        async move {
            let result = analyze_layer(state, id, selector, polygon, probe_point).await;
            (id, result)
        }
    }))
    .await;

    let mut layers = serde_json::Map::new();
    let mut meta = ResponseMeta::new();
    let mut sst_stats = None;
    let mut chl_stats = None;

    for (id, result) in analyses {
        match result {
            Ok(analysis) => {
                match id {
                    LayerId::Sst => sst_stats = Some(analysis.report.stats.clone()),
                    LayerId::Chl => chl_stats = Some(analysis.report.stats.clone()),
                }
                meta.record(analysis.report.coverage, &analysis.time);
                let value = serde_json::to_value(&analysis)
                    .map_err(|e| OceanError::Internal(e.to_string()))?;
                layers.insert(id.to_string(), value);
            }
            Err(e) => {
                warn!(layer = %id, error = %e, "layer analysis failed");
                meta.warnings.push(format!("{}: {}", id, e));
                layers.insert(id.to_string(), serde_json::Value::Null);
            }
        }
    }

    let outlook = classify(sst_stats.as_ref(), chl_stats.as_ref(), &state.thresholds);

    Ok(json!({
        "layers": layers,
        "outlook": outlook,
        "meta": meta,
    }))
}

async fn analyze_layer(
    state: &AppState,
    id: LayerId,
    selector: &TimeSelector,
    polygon: &Polygon,
    probe_point: &ocean_common::TilePixel,
) -> Result<LayerAnalysis, OceanError> {
    let spec = state.layers.get(id)?;
    let resolved = state.resolver.resolve(selector, spec, probe_point).await?;
    let report = state.sampler.sample_zone(spec, polygon, &resolved).await?;
    Ok(LayerAnalysis {
        report,
        time: resolved.into(),
    })
}

fn requested_layers(
    state: &AppState,
    layers: Option<Vec<String>>,
) -> Result<Vec<LayerId>, OceanError> {
    match layers {
        None => Ok(state.layers.ids()),
        Some(names) => {
            if names.is_empty() {
                return Err(OceanError::InvalidParameter {
                    param: "layers".to_string(),
                    message: "layer list must not be empty".to_string(),
                });
            }
            let mut ids = Vec::with_capacity(names.len());
            for name in names {
                let id = LayerId::from_str(&name)?;
                state.layers.get(id)?;
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Ok(ids)
        }
    }
}

fn error_response(e: OceanError) -> Response {
    let status = StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": e.to_string(),
            }
        })),
    )
        .into_response()
}
