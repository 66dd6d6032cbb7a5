//! HTTP request handlers

use axum::{
    Router,
    routing::{get, post},
};
use loadline_api::paths;

pub mod feedback;
pub mod flights;
pub mod health;

use crate::state::AppState;

/// Build all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(paths::HEALTH, get(health::health_check))
        .route(paths::FLIGHTS, get(flights::list_flights))
        .route(paths::FLIGHT_BY_ID, get(flights::get_flight))
        .route(paths::HISTORICAL, get(flights::historical))
        .route(paths::SUMMARY, get(flights::summary))
        .route(paths::FEEDBACK, post(feedback::submit_feedback))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use loadline_core::{FlightCatalog, catalog::FlightData};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{AppState, ServerConfig, app};

    fn flight(id: &str, number: &str, from: &str, to: &str, utilization: f64, risk: &str) -> Value {
        json!({
            "id": id,
            "flightNumber": number,
            "flightDate": "2025-01-12",
            "from": from,
            "to": to,
            "currentPounds": 450.0 * utilization,
            "maxPounds": 45000.0,
            "currentCubicFeet": 34.0 * utilization,
            "maxCubicFeet": 3400.0,
            "utilizationPercent": utilization,
            "riskLevel": risk,
            "sortTime": "2025-01-12T08:00:00Z"
        })
    }

    fn test_app() -> axum::Router {
        let data: FlightData = serde_json::from_value(json!({
            "flights": [
                flight("f1", "LAX-ORD-2847", "LAX", "ORD", 97.5, "critical"),
                flight("f2", "LAX-ORD-1101", "LAX", "ORD", 42.0, "low"),
                flight("f3", "DFW-ATL-0310", "DFW", "ATL", 88.0, "high"),
            ],
            "historicalData": [
                {"date": "01/10", "pounds": 40000.0, "cubicFeet": 3000.0, "route": "LAX → ORD"},
                {"date": "01/11", "pounds": 41000.0, "cubicFeet": 3100.0, "route": "LAX → ORD"},
                {"date": "01/11", "pounds": 20000.0, "cubicFeet": 1500.0, "route": "DFW → ATL"},
                {"date": "01/13", "pounds": 42000.0, "cubicFeet": 3200.0, "predicted": true, "route": "LAX → ORD"}
            ]
        }))
        .unwrap();
        app(AppState::from_catalog(
            ServerConfig::default(),
            FlightCatalog::new(data),
        ))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_loaded_flights() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["flights_loaded"], 3);
    }

    #[tokio::test]
    async fn flights_are_filtered_and_sorted() {
        let (status, body) = get_json("/logistics/data/flights?route_from=lax&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["flights"].as_array().unwrap().len(), 1);
        assert_eq!(body["flights"][0]["id"], "f1");
        assert_eq!(body["query"]["route_from"], "lax");

        let (_, body) = get_json("/logistics/data/flights?utilization=near_capacity").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["flights"][0]["flightNumber"], "DFW-ATL-0310");
    }

    #[tokio::test]
    async fn invalid_query_is_a_validation_error() {
        let (status, body) = get_json("/logistics/data/flights?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");
        assert_eq!(body["error"]["detail"][0]["field"], "limit");

        let (status, body) = get_json("/logistics/data/flights?limit=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");
    }

    #[tokio::test]
    async fn lookup_normalizes_flight_numbers() {
        let (status, body) = get_json("/logistics/data/flights/lax-ord-2847").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flight"]["id"], "f1");

        let (status, body) = get_json("/logistics/data/flights/ZZZ-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flight"], Value::Null);
        assert_eq!(body["error"], "Flight ZZZ-1 not found");
    }

    #[tokio::test]
    async fn historical_scopes_to_route() {
        let (status, body) =
            get_json("/logistics/data/historical?route_from=LAX&route_to=ORD&include_predictions=false")
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["routes"], json!(["LAX → ORD"]));

        let (_, body) = get_json("/logistics/data/historical?days=1").await;
        let dates: Vec<&str> = body["historicalData"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["01/10", "01/11"]);
    }

    #[tokio::test]
    async fn summary_counts_risk() {
        let (_, body) = get_json("/logistics/data/summary").await;
        assert_eq!(body["totalFlights"], 3);
        assert_eq!(body["flightsAtRisk"], 2);
        assert_eq!(body["underUtilizedFlights"], 1);
        assert_eq!(body["airports"], json!(["ATL", "DFW", "LAX", "ORD"]));
    }

    #[tokio::test]
    async fn feedback_is_acknowledged() {
        let payload = json!({
            "flightId": "f1",
            "flightNumber": "LAX-ORD-2847",
            "votes": {"rec-1": "up", "rec-2": "down"},
            "comment": "Second one is not feasible",
            "timestamp": "2025-01-12T09:30:00Z"
        });
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logistics/feedback")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "received");
        assert_eq!(body["votesReceived"], 2);
    }
}
