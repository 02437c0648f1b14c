use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    AppState, build_app,
    config::AppConfig,
    db::{Dataset, DbError, DbResult, MemoryStore, ReportRepo},
    middleware::REQUEST_ID_HEADER,
    models::{Booking, Payment, ServiceCategory, ServiceListing, ServiceProvider, User},
    reports::ReportWindow,
};

// =============================================================================
// Fixtures
// =============================================================================

fn payment(at: &str, amount: f64, commission: f64, status: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "paymentDateTime": at,
        "paymentAmount": amount,
        "commissionAmount": commission,
        "paymentStatus": status,
    })
}

fn booking(at: &str, status: &str) -> Value {
    json!({ "id": Uuid::new_v4(), "bookingDateTime": at, "bookingStatus": status })
}

fn created(at: &str) -> Value {
    json!({ "id": Uuid::new_v4(), "createdAt": at })
}

/// A small marketplace spanning January and February 2024.
fn marketplace() -> Dataset {
    let plumbing = Uuid::new_v4();
    let cleaning = Uuid::new_v4();
    let gardening = Uuid::new_v4();

    let dataset = json!({
        "payments": [
            payment("2024-01-05T10:00:00Z", 100.0, 10.0, "Completed"),
            payment("2024-01-06T10:00:00Z", 999.0, 99.0, "Pending"),
            payment("2024-01-20T15:30:00Z", 50.0, 5.0, "Completed"),
            payment("2024-02-10T09:00:00Z", 30.0, 3.0, "Completed"),
        ],
        "bookings": [
            booking("2024-01-01T09:00:00Z", "Completed"),
            booking("2024-01-02T09:00:00Z", "Completed"),
            booking("2024-01-03T09:00:00Z", "Completed"),
            booking("2024-01-04T09:00:00Z", "Completed"),
            booking("2024-01-05T09:00:00Z", "Completed"),
            booking("2024-01-08T09:00:00Z", "Cancelled"),
            booking("2024-01-09T09:00:00Z", "Cancelled"),
            booking("2024-01-10T09:00:00Z", "Cancelled"),
        ],
        "users": [
            created("2024-01-01T08:00:00Z"),
            created("2024-01-02T08:00:00Z"),
            created("2024-01-02T18:00:00Z"),
        ],
        "providers": [created("2024-01-03T12:00:00Z")],
        "categories": [
            { "id": plumbing, "categoryName": "Plumbing" },
            { "id": cleaning, "categoryName": "Cleaning" },
            { "id": gardening, "categoryName": "Gardening" },
        ],
        "listings": [
            { "id": Uuid::new_v4(), "categoryId": cleaning },
            { "id": Uuid::new_v4(), "categoryId": cleaning },
            { "id": Uuid::new_v4(), "categoryId": plumbing },
            { "id": Uuid::new_v4() },
        ],
    });

    serde_json::from_value(dataset).unwrap()
}

/// Record source that is always down.
struct UnavailableRepo;

#[async_trait]
impl ReportRepo for UnavailableRepo {
    async fn completed_payments(&self, _: &ReportWindow) -> DbResult<Vec<Payment>> {
        Err(DbError::Internal("connection refused".into()))
    }
    async fn bookings(&self, _: &ReportWindow) -> DbResult<Vec<Booking>> {
        Err(DbError::Internal("connection refused".into()))
    }
    async fn users(&self, _: &ReportWindow) -> DbResult<Vec<User>> {
        Err(DbError::Internal("connection refused".into()))
    }
    async fn providers(&self, _: &ReportWindow) -> DbResult<Vec<ServiceProvider>> {
        Err(DbError::Internal("connection refused".into()))
    }
    async fn categories(&self) -> DbResult<Vec<ServiceCategory>> {
        Err(DbError::Internal("connection refused".into()))
    }
    async fn listings(&self) -> DbResult<Vec<ServiceListing>> {
        Err(DbError::Internal("connection refused".into()))
    }
    async fn ping(&self) -> DbResult<()> {
        Err(DbError::Internal("connection refused".into()))
    }
}

/// Record source that answers too slowly for a one-second request timeout.
struct SlowRepo(MemoryStore);

#[async_trait]
impl ReportRepo for SlowRepo {
    async fn completed_payments(&self, window: &ReportWindow) -> DbResult<Vec<Payment>> {
        self.0.completed_payments(window).await
    }
    async fn bookings(&self, window: &ReportWindow) -> DbResult<Vec<Booking>> {
        self.0.bookings(window).await
    }
    async fn users(&self, window: &ReportWindow) -> DbResult<Vec<User>> {
        self.0.users(window).await
    }
    async fn providers(&self, window: &ReportWindow) -> DbResult<Vec<ServiceProvider>> {
        self.0.providers(window).await
    }
    async fn categories(&self) -> DbResult<Vec<ServiceCategory>> {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        self.0.categories().await
    }
    async fn listings(&self) -> DbResult<Vec<ServiceListing>> {
        self.0.listings().await
    }
    async fn ping(&self) -> DbResult<()> {
        self.0.ping().await
    }
}

// =============================================================================
// Harness
// =============================================================================

struct TestHarness {
    app: Router,
}

impl TestHarness {
    fn with_repo(config: AppConfig, repo: Arc<dyn ReportRepo>) -> Self {
        let state = AppState::new(config.clone(), repo).unwrap();
        Self {
            app: build_app(&config, state),
        }
    }

    fn new() -> Self {
        Self::with_repo(AppConfig::default(), Arc::new(MemoryStore::new(marketplace())))
    }

    fn from_toml(toml: &str) -> Self {
        let config = AppConfig::from_str(toml).unwrap();
        Self::with_repo(config, Arc::new(MemoryStore::new(marketplace())))
    }

    async fn get_raw(&self, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, HeaderMap, String) {
        let mut builder = Request::builder().method("GET").uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.get_raw(uri, &[]).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

fn assert_aligned(data: &Value) {
    let labels = data["labels"].as_array().unwrap().len();
    for dataset in data["datasets"].as_array().unwrap() {
        assert_eq!(
            dataset["data"].as_array().unwrap().len(),
            labels,
            "dataset {} is not aligned with labels",
            dataset["label"]
        );
    }
    assert_eq!(data["tableData"].as_array().unwrap().len(), labels);
}

// =============================================================================
// Envelope and alignment
// =============================================================================

#[rstest]
#[case::revenue("revenue")]
#[case::bookings("bookings")]
#[case::users("users")]
#[case::providers("providers")]
#[tokio::test]
async fn test_bucketed_reports_are_aligned(
    #[case] report: &str,
    #[values("daily", "weekly", "monthly", "yearly", "total")] time_frame: &str,
) {
    let harness = TestHarness::new();
    let (status, body) = harness
        .get_json(&format!(
            "/api/reports/{report}?timeFrame={time_frame}&startDate=2024-01-01&endDate=2024-02-29"
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_aligned(&body["data"]);
    assert_eq!(body["data"]["tableHeaders"][0], "Period");
}

#[rstest]
#[case::revenue("revenue")]
#[case::bookings("bookings")]
#[case::users("users")]
#[case::providers("providers")]
#[tokio::test]
async fn test_missing_params_rejected(#[case] report: &str) {
    let harness = TestHarness::new();
    let (status, body) = harness
        .get_json(&format!("/api/reports/{report}?timeFrame=daily&startDate=2024-01-01"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Please provide timeFrame, startDate, and endDate parameters"
    );
    assert!(body["requestId"].is_string());
}

#[rstest]
#[case::reversed("startDate=2024-02-01&endDate=2024-01-01", "endDate must be on or after startDate")]
#[case::malformed_start("startDate=01/02/2024&endDate=2024-01-31", "startDate")]
#[case::malformed_end("startDate=2024-01-01&endDate=2024-13-01", "endDate")]
#[tokio::test]
async fn test_invalid_window_rejected(#[case] query: &str, #[case] expected: &str) {
    let harness = TestHarness::new();
    let (status, body) = harness
        .get_json(&format!("/api/reports/revenue?timeFrame=daily&{query}"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains(expected), "unexpected message: {message}");
}

#[rstest]
#[case::repeated_time_frame(
    "/api/reports/users?timeFrame=daily&timeFrame=weekly&startDate=2024-01-01&endDate=2024-01-02"
)]
#[case::repeated_format("/api/reports/categories?format=json&format=csv")]
#[tokio::test]
async fn test_unparseable_query_uses_error_envelope(#[case] uri: &str) {
    let harness = TestHarness::new();
    let (status, headers, body) = harness.get_raw(uri, &[]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("duplicate field"));
    assert!(body["requestId"].is_string());
}

// =============================================================================
// Report contents
// =============================================================================

#[tokio::test]
async fn test_revenue_monthly() {
    let harness = TestHarness::new();
    let (status, body) = harness
        .get_json("/api/reports/revenue?timeFrame=monthly&startDate=2024-01-15&endDate=2024-03-10")
        .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["labels"], json!(["Jan 2024", "Feb 2024", "Mar 2024"]));
    assert_eq!(data["datasets"][0]["label"], "Revenue");
    assert_eq!(data["datasets"][0]["data"], json!([50.0, 30.0, 0.0]));
    assert_eq!(data["datasets"][0]["backgroundColor"], "rgba(54, 162, 235, 1)");
    assert_eq!(data["datasets"][1]["label"], "Commission");
    assert_eq!(data["datasets"][1]["borderColor"], "rgba(255, 99, 132, 1)");
    assert_eq!(data["datasets"][1]["borderWidth"], 1);
    assert_eq!(
        data["tableHeaders"],
        json!(["Period", "Revenue", "Commission", "Payments"])
    );
    assert_eq!(data["tableData"][0]["payments"], 1);
    assert_eq!(data["summary"]["totalRevenue"], 80.0);
    assert_eq!(data["summary"]["totalPayments"], 2);
    assert_eq!(data["summary"]["averageRevenue"], 40.0);
}

#[tokio::test]
async fn test_bookings_weekly_completion_rate() {
    let harness = TestHarness::new();
    let (_, body) = harness
        .get_json("/api/reports/bookings?timeFrame=weekly&startDate=2024-01-01&endDate=2024-01-10")
        .await;

    let data = &body["data"];
    assert_eq!(data["labels"], json!(["Week 1", "Week 2"]));
    assert_eq!(data["datasets"][0]["data"], json!([5, 3]));
    assert_eq!(data["datasets"][1]["data"], json!([5, 0]));
    assert_eq!(data["datasets"][2]["data"], json!([0, 3]));
    assert_eq!(data["summary"]["completionRate"], "62.50%");
    assert_eq!(data["summary"]["totalBookings"], 8);
}

#[tokio::test]
async fn test_users_daily_growth() {
    let harness = TestHarness::new();
    let (_, body) = harness
        .get_json("/api/reports/users?timeFrame=daily&startDate=2024-01-01&endDate=2024-01-03")
        .await;

    let data = &body["data"];
    assert_eq!(
        data["labels"],
        json!(["2024-01-01", "2024-01-02", "2024-01-03"])
    );
    assert_eq!(data["datasets"][0]["data"], json!([1, 2, 0]));
    assert_eq!(data["summary"]["totalNewUsers"], 3);
    assert_eq!(data["summary"]["averageGrowthPerPeriod"], "1.00");
    assert_eq!(data["summary"]["dateRange"], "2024-01-01 to 2024-01-03");
}

#[tokio::test]
async fn test_unknown_time_frame_is_single_total_bucket() {
    let harness = TestHarness::new();
    let (_, body) = harness
        .get_json("/api/reports/providers?timeFrame=hourly&startDate=2024-01-01&endDate=2024-12-31")
        .await;

    assert_eq!(body["data"]["labels"], json!(["Total"]));
    assert_eq!(body["data"]["datasets"][0]["data"], json!([1]));
}

#[tokio::test]
async fn test_empty_window_is_all_zero() {
    let harness = TestHarness::new();
    let (status, body) = harness
        .get_json("/api/reports/revenue?timeFrame=daily&startDate=2023-06-01&endDate=2023-06-03")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["datasets"][0]["data"], json!([0.0, 0.0, 0.0]));
    assert_eq!(body["data"]["summary"]["totalRevenue"], 0.0);
    assert_eq!(body["data"]["summary"]["averageRevenue"], 0.0);
}

#[tokio::test]
async fn test_categories_distribution() {
    let harness = TestHarness::new();
    let (status, body) = harness.get_json("/api/reports/categories").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["labels"], json!(["Cleaning", "Plumbing"]));
    assert_eq!(data["tableHeaders"], json!(["Category", "Listings"]));
    assert_eq!(data["tableData"][0], json!({ "name": "Cleaning", "count": 2 }));
    assert_eq!(data["summary"]["totalCategories"], 3);
    assert_eq!(data["summary"]["totalListings"], 3);
    assert_eq!(data["summary"]["averageListingsPerCategory"], "1.00");
}

#[tokio::test]
async fn test_services_distribution() {
    let harness = TestHarness::new();
    let (_, body) = harness.get_json("/api/reports/services").await;

    let data = &body["data"];
    assert_eq!(data["labels"], json!(["Cleaning", "Plumbing", "Uncategorized"]));
    assert_eq!(data["datasets"][0]["label"], "Services");
    assert_eq!(data["summary"]["totalServices"], 4);
    assert_eq!(data["summary"]["mostPopularCategory"], "Cleaning");
}

#[tokio::test]
async fn test_configured_offset_shifts_buckets() {
    let harness = TestHarness::from_toml("[reports]\nutc_offset = \"+10:00\"\n");
    let (_, body) = harness
        .get_json("/api/reports/users?timeFrame=daily&startDate=2024-01-03&endDate=2024-01-03")
        .await;

    // 2024-01-02T18:00Z is already Jan 3 at +10:00
    assert_eq!(body["data"]["labels"], json!(["2024-01-03"]));
    assert_eq!(body["data"]["datasets"][0]["data"], json!([1]));
}

#[tokio::test]
async fn test_bucket_limit() {
    let harness = TestHarness::from_toml("[reports]\nmax_buckets = 10\n");
    let (status, body) = harness
        .get_json("/api/reports/users?timeFrame=daily&startDate=2024-01-01&endDate=2024-12-31")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("10"));
}

// =============================================================================
// Export formats
// =============================================================================

#[cfg(feature = "csv-export")]
#[tokio::test]
async fn test_csv_export() {
    let harness = TestHarness::new();
    let (status, headers, body) = harness
        .get_raw(
            "/api/reports/revenue?timeFrame=monthly&startDate=2024-01-01&endDate=2024-02-29&format=csv",
            &[],
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "text/csv; charset=utf-8");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"revenue-report.csv\""
    );

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines[0], "Period,Revenue,Commission,Payments");
    assert_eq!(lines[1], "Jan 2024,150.0,15.0,2");
    assert_eq!(lines[2], "Feb 2024,30.0,3.0,1");
}

#[cfg(feature = "csv-export")]
#[tokio::test]
async fn test_csv_export_of_distribution() {
    let harness = TestHarness::new();
    let (_, _, body) = harness
        .get_raw("/api/reports/categories?format=csv", &[])
        .await;

    assert_eq!(body.lines().collect::<Vec<_>>(), ["Category,Listings", "Cleaning,2", "Plumbing,1"]);
}

#[tokio::test]
async fn test_unsupported_format() {
    let harness = TestHarness::new();
    let (status, body) = harness.get_json("/api/reports/services?format=xml").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// =============================================================================
// Failures, request ids and health
// =============================================================================

#[rstest]
#[case::revenue("/api/reports/revenue?timeFrame=daily&startDate=2024-01-01&endDate=2024-01-02")]
#[case::categories("/api/reports/categories")]
#[tokio::test]
async fn test_record_source_failure_is_opaque(#[case] uri: &str) {
    let harness = TestHarness::with_repo(AppConfig::default(), Arc::new(UnavailableRepo));
    let (status, body) = harness.get_json(uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Server Error");
}

#[rstest]
#[case::listed("http://dashboard.local", true)]
#[case::unlisted("http://elsewhere.local", false)]
#[tokio::test]
async fn test_dashboard_cors(#[case] origin: &str, #[case] allowed: bool) {
    let harness =
        TestHarness::from_toml("[server.cors]\nallowed_origins = [\"http://dashboard.local\"]\n");
    let (status, headers, _) = harness
        .get_raw("/api/reports/categories", &[("Origin", origin)])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        allowed.then_some(origin)
    );
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let config = AppConfig::from_str("[server]\ntimeout_secs = 1\n").unwrap();
    let harness =
        TestHarness::with_repo(config, Arc::new(SlowRepo(MemoryStore::new(marketplace()))));

    let (status, headers, _) = harness.get_raw("/api/reports/categories", &[]).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert!(headers.contains_key(REQUEST_ID_HEADER));

    let (status, _) = harness
        .get_json("/api/reports/users?timeFrame=daily&startDate=2024-01-01&endDate=2024-01-03")
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let harness = TestHarness::new();
    let (status, headers, body) = harness
        .get_raw("/api/reports/revenue", &[(REQUEST_ID_HEADER, "trace-me")])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers[REQUEST_ID_HEADER], "trace-me");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["requestId"], "trace-me");
}

#[tokio::test]
async fn test_request_id_generated_on_success() {
    let harness = TestHarness::new();
    let (status, headers, _) = harness.get_raw("/api/reports/categories", &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_health() {
    let (status, body) = TestHarness::new().get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = TestHarness::new().get_json("/health/live").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_unavailable_source() {
    let harness = TestHarness::with_repo(AppConfig::default(), Arc::new(UnavailableRepo));
    let (status, body) = harness.get_json("/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["records"], false);
}

#[cfg(feature = "utoipa")]
#[tokio::test]
async fn test_openapi_document_served() {
    let (status, body) = TestHarness::new().get_json("/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/reports/revenue"].is_object());
}
