//! REST client for the logistics data API
//!
//! [`RestFlightSource`] is the production [`FlightDataSource`]: every call is
//! one HTTP request, with an optional bearer token on each.

use std::time::Duration;

use async_trait::async_trait;
use loadline_core::{
    CoreError, Feedback, Flight, FlightDataSource, FlightQuery, HistoricalPoint, Route,
    catalog::DEFAULT_HISTORY_DAYS, config::DataConfig, source::FeedbackReceipt,
};
use reqwest::{Client, Response, Url, header};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    ApiError, paths,
    requests::{FlightsQueryParams, HistoricalQueryParams},
    responses::{FlightLookupResponse, FlightsResponse, HistoricalResponse},
};

#[derive(Debug, Clone)]
pub struct RestFlightSource {
    client: Client,
    base_url: String,
    history_days: usize,
}

impl RestFlightSource {
    /// Client without authentication and a 30 second timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::build(base_url.into(), None, Duration::from_secs(30))
    }

    pub fn from_config(config: &DataConfig) -> Result<Self, ApiError> {
        Self::build(
            config.base_url.clone(),
            config.bearer_token.as_deref(),
            config.request_timeout,
        )
    }

    fn build(base_url: String, bearer_token: Option<&str>, timeout: Duration) -> Result<Self, ApiError> {
        // Fail on a bad base URL now rather than on the first fetch
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut headers = header::HeaderMap::new();
        if let Some(token) = bearer_token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
        })
    }

    /// Days of history requested per route for unscoped charts
    pub fn with_history_days(mut self, days: usize) -> Self {
        self.history_days = days;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    async fn get_json<T, Q>(&self, url: Url, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        decode(response).await
    }

    pub async fn flights(&self, params: &FlightsQueryParams) -> Result<FlightsResponse, ApiError> {
        self.get_json(self.endpoint(paths::FLIGHTS)?, params).await
    }

    pub async fn historical(
        &self,
        params: &HistoricalQueryParams,
    ) -> Result<HistoricalResponse, ApiError> {
        self.get_json(self.endpoint(paths::HISTORICAL)?, params).await
    }

    pub async fn lookup(&self, flight_id: &str) -> Result<FlightLookupResponse, ApiError> {
        let mut url = self.endpoint(paths::FLIGHTS)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .push(flight_id.trim());
        self.get_json(url, &[] as &[(&str, &str)]).await
    }

    pub async fn summary(&self) -> Result<loadline_core::catalog::CatalogSummary, ApiError> {
        self.get_json(self.endpoint(paths::SUMMARY)?, &[] as &[(&str, &str)])
            .await
    }

    pub async fn feedback(&self, feedback: &Feedback) -> Result<FeedbackReceipt, ApiError> {
        let url = self.endpoint(paths::FEEDBACK)?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(feedback).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ApiError::Upstream {
            status: status.as_u16(),
            message: text,
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl FlightDataSource for RestFlightSource {
    async fn query_flights(&self, query: &FlightQuery) -> loadline_core::Result<Vec<Flight>> {
        let params = FlightsQueryParams::from(query);
        let response = self
            .flights(&params)
            .await
            .map_err(|e| CoreError::fetch_failed("query_flights", e))?;
        Ok(response.flights)
    }

    async fn query_historical(
        &self,
        route: Option<&Route>,
    ) -> loadline_core::Result<Vec<HistoricalPoint>> {
        let params = HistoricalQueryParams::for_route(route, self.history_days);
        let response = self
            .historical(&params)
            .await
            .map_err(|e| CoreError::fetch_failed("query_historical", e))?;
        Ok(response.historical_data)
    }

    async fn flight_by_number(&self, flight_number: &str) -> loadline_core::Result<Option<Flight>> {
        let response = self
            .lookup(flight_number)
            .await
            .map_err(|e| CoreError::fetch_failed("flight_by_number", e))?;
        if let Some(error) = &response.error {
            tracing::debug!("Lookup of {} returned: {}", flight_number, error);
        }
        Ok(response.flight)
    }

    async fn submit_feedback(&self, feedback: &Feedback) -> loadline_core::Result<FeedbackReceipt> {
        self.feedback(feedback)
            .await
            .map_err(|e| CoreError::feedback_failed(feedback.flight_id.clone(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoints_join_under_base_path() {
        let source = RestFlightSource::new("http://localhost:8000/api/").unwrap();
        assert_eq!(source.base_url(), "http://localhost:8000/api");
        assert_eq!(
            source.endpoint(paths::HISTORICAL).unwrap().as_str(),
            "http://localhost:8000/api/logistics/data/historical"
        );
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        let err = RestFlightSource::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn config_token_is_accepted() {
        let config = DataConfig {
            bearer_token: Some("abc123".to_string()),
            ..Default::default()
        };
        let source = RestFlightSource::from_config(&config).unwrap();
        assert_eq!(source.base_url(), "http://localhost:8000");
    }
}
