use insight_core::{InsightError, RawFinancialRecord, ServiceConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = "FinancialMLBot/1.0";
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const LIVE_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the company data API (`GET {base_url}?id=..&api_key=..`).
#[derive(Clone)]
pub struct CompanyClient {
    client: Client,
    base_url: String,
    api_key: String,
    /// 429 responses wait `backoff * 2^attempt`, network errors `backoff * 2`
    backoff: Duration,
}

impl CompanyClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            backoff: Duration::from_secs(1),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.api_base_url.clone(), config.api_key.clone())
    }

    /// Override the retry backoff unit.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn request(&self, company_id: &str, timeout: Duration) -> RequestBuilder {
        self.client
            .get(&self.base_url)
            .query(&[("id", company_id), ("api_key", self.api_key.as_str())])
            .timeout(timeout)
    }

    /// Fetch the raw company payload, retrying rate limits, server errors and
    /// network failures up to three times.
    ///
    /// A 200 response whose body is not JSON, or has no `data` section, is
    /// returned as `InvalidData` straight away.
    pub async fn fetch_company_json(&self, company_id: &str) -> Result<Value, InsightError> {
        for attempt in 0..MAX_ATTEMPTS {
            let last_attempt = attempt + 1 == MAX_ATTEMPTS;

            match self.request(company_id, REQUEST_TIMEOUT).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    let body = response.text().await.map_err(|e| {
                        InsightError::ApiError(format!("Failed to read body for {}: {}", company_id, e))
                    })?;
                    return parse_payload(company_id, &body);
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let wait = self.backoff * 2u32.pow(attempt);
                    tracing::warn!(
                        "Rate limited fetching {}, waiting {:?} before retry {}/{}",
                        company_id,
                        wait,
                        attempt + 1,
                        MAX_ATTEMPTS
                    );
                    if !last_attempt {
                        tokio::time::sleep(wait).await;
                    }
                }
                Ok(response) => {
                    tracing::error!("API Error {} for {}", response.status(), company_id);
                }
                Err(e) => {
                    tracing::error!("Network error fetching {}: {}", company_id, e);
                    if !last_attempt {
                        tokio::time::sleep(self.backoff * 2).await;
                    }
                }
            }
        }

        Err(InsightError::ApiError(format!(
            "No data for {} after {} attempts",
            company_id, MAX_ATTEMPTS
        )))
    }

    /// Fetch and parse the payload into a [`RawFinancialRecord`].
    pub async fn fetch_company_details(&self, company_id: &str) -> Result<RawFinancialRecord, InsightError> {
        let payload = self.fetch_company_json(company_id).await?;
        RawFinancialRecord::from_json(payload)
    }

    /// Single attempt used on the read path. Transport failures and non-2xx
    /// statuses are `ApiError`; an unparseable body is `InvalidData`.
    pub async fn fetch_live(&self, company_id: &str) -> Result<Value, InsightError> {
        let response = self
            .request(company_id, LIVE_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| InsightError::ApiError(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| InsightError::InvalidData(format!("Invalid JSON for {}: {}", company_id, e)))
    }
}

fn parse_payload(company_id: &str, body: &str) -> Result<Value, InsightError> {
    let payload: Value = serde_json::from_str(body).map_err(|e| {
        tracing::warn!("Invalid JSON received for {}", company_id);
        InsightError::InvalidData(e.to_string())
    })?;

    match payload.as_object() {
        Some(map) if map.contains_key("data") => Ok(payload),
        _ => {
            tracing::warn!("Invalid JSON received for {}", company_id);
            Err(InsightError::InvalidData(format!(
                "payload for {} has no data section",
                company_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/server/api/company.php";

    fn client(server: &MockServer) -> CompanyClient {
        CompanyClient::new(format!("{}{}", server.uri(), ENDPOINT), "test-key")
            .with_backoff(Duration::from_millis(1))
    }

    fn payload() -> Value {
        json!({
            "company": {"id": "TCS", "company_name": "Tata Consultancy", "roe_3_years": 45},
            "data": {
                "profitandloss": [{"sales": 100, "net_profit": 10}, {"sales": 120, "net_profit": 12}],
                "balancesheet": [{"borrowings": 0}]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ENDPOINT))
            .and(query_param("id", "TCS"))
            .and(query_param("api_key", "test-key"))
            .and(header("user-agent", USER_AGENT))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
            .expect(1)
            .mount(&server)
            .await;

        let value = client(&server).fetch_company_json("TCS").await.unwrap();
        assert_eq!(value, payload());
    }

    #[tokio::test]
    async fn test_fetch_details_parses_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
            .mount(&server)
            .await;

        let record = client(&server).fetch_company_details("TCS").await.unwrap();
        assert_eq!(record.company.id().as_deref(), Some("TCS"));
        assert_eq!(record.data.profit_and_loss.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_data_section_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"company": {"id": "X"}})))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).fetch_company_json("X").await.unwrap_err();
        assert!(matches!(err, InsightError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).fetch_company_json("X").await.unwrap_err();
        assert!(matches!(err, InsightError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
            .expect(1)
            .mount(&server)
            .await;

        let value = client(&server).fetch_company_json("TCS").await.unwrap();
        assert_eq!(value["company"]["id"], "TCS");
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server).fetch_company_json("X").await.unwrap_err();
        assert!(matches!(err, InsightError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_network_error_is_api_error() {
        let client = CompanyClient::new("http://127.0.0.1:1/company.php", "")
            .with_backoff(Duration::from_millis(1));
        let err = client.fetch_company_json("X").await.unwrap_err();
        assert!(matches!(err, InsightError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_fetch_live_passes_payload_through() {
        let server = MockServer::start().await;
        let body = json!({"company": {"id": "X"}, "extra": [1, 2, 3]});
        Mock::given(method("GET"))
            .and(query_param("id", "X"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).fetch_live("X").await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_fetch_live_does_not_retry_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).fetch_live("X").await.unwrap_err();
        assert!(matches!(err, InsightError::ApiError(_)));
    }
}
