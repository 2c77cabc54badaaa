use crate::infra::AppState;
use crate::report::{build_response, split_load, OrgReportResponse};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use org_compliance::analysis::{AnalysisPolicy, ComplianceReport, PolicyError};
use org_compliance::error::AppError;
use org_compliance::loader::EmployeeLoader;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct OrgReportRequest {
    pub(crate) employees_csv: String,
    #[serde(default)]
    pub(crate) max_depth: Option<usize>,
    #[serde(default)]
    pub(crate) min_ratio: Option<f64>,
    #[serde(default)]
    pub(crate) max_ratio: Option<f64>,
}

impl OrgReportRequest {
    fn policy(&self, base: AnalysisPolicy) -> Result<AnalysisPolicy, PolicyError> {
        AnalysisPolicy::checked(
            self.min_ratio.unwrap_or(base.min_salary_ratio()),
            self.max_ratio.unwrap_or(base.max_salary_ratio()),
            self.max_depth.unwrap_or(base.max_reporting_depth()),
        )
    }
}

pub(crate) fn org_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/org/report", post(org_report_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn org_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<OrgReportRequest>,
) -> Result<Json<OrgReportResponse>, AppError> {
    let policy = payload.policy(state.policy)?;
    let load = EmployeeLoader::from_reader(Cursor::new(payload.employees_csv.into_bytes()))?;
    let (index, skipped) = split_load(load);
    // Runs on a runtime worker thread; keep the analyses on it.
    let report = ComplianceReport::generate(&index, &policy);

    Ok(Json(build_response(&report, skipped)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const CHAIN_CSV: &str = "Id,firstName,lastName,salary,managerId\n\
1,Root,Ceo,300000,\n\
2,A,One,200000,1\n\
3,B,Two,150000,2\n\
4,C,Three,110000,3\n\
5,D,Four,85000,4\n\
6,E,Five,65000,5\n";

    fn test_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            policy: AnalysisPolicy::default(),
        }
    }

    fn app(ready: bool) -> Router {
        org_routes().layer(Extension(test_state(ready)))
    }

    async fn post_report(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/org/report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");

        let response = app(true).oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    #[tokio::test]
    async fn report_endpoint_flags_deep_reporting_line() {
        let (status, body) = post_report(json!({ "employees_csv": CHAIN_CSV })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["employee_count"], 6);
        assert_eq!(body["depth_findings"][0]["employee_id"], 6);
        assert_eq!(body["depth_findings"][0]["chain_end"]["kind"], "root");
        assert_eq!(
            body["depth_findings"][0]["message"],
            "E Five has a reporting line which is too long by 1 levels"
        );
        assert!(body["skipped_rows"].as_array().expect("array").is_empty());
    }

    #[tokio::test]
    async fn report_endpoint_honours_request_overrides() {
        let (status, body) = post_report(json!({
            "employees_csv": CHAIN_CSV,
            "max_depth": 3,
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["max_reporting_depth"], 3);
        assert_eq!(body["depth_findings"].as_array().expect("array").len(), 2);
    }

    #[tokio::test]
    async fn inverted_band_is_a_bad_request() {
        let (status, body) = post_report(json!({
            "employees_csv": CHAIN_CSV,
            "min_ratio": 2.0,
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "policy error: minimum salary ratio 2 must not exceed maximum salary ratio 1.5"
        );

        let (status, _) = post_report(json!({
            "employees_csv": CHAIN_CSV,
            "max_ratio": 0.0,
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_endpoint_applies_requested_band() {
        let (status, body) = post_report(json!({
            "employees_csv": CHAIN_CSV,
            "min_ratio": 1.0,
            "max_ratio": 2.0,
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["min_salary_ratio"], 1.0);
        assert_eq!(body["max_salary_ratio"], 2.0);
    }

    #[tokio::test]
    async fn empty_csv_is_a_bad_request() {
        let (status, body) = post_report(json!({ "employees_csv": "" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "load error: employee file is empty");
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let request = Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .expect("request builds");
        let response = app(false).oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");
        let response = app(true).oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
