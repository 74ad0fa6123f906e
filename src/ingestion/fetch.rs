//! Fetch functions - page through the FDC food listing endpoint

use crate::config::PageLimit;
use crate::error::{IngestError, Result};
use crate::ingestion::types::FoodRecord;
use reqwest::Client;
use tracing::{debug, info};

/// Client for the FDC `foods/list` endpoint
#[derive(Debug, Clone)]
pub struct FdcClient {
    client: Client,
    base_url: String,
    api_key: String,
    data_types: Vec<String>,
}

impl FdcClient {
    pub fn new(client: Client, base_url: &str, api_key: &str, data_types: Vec<String>) -> Self {
        FdcClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            data_types,
        }
    }

    fn list_url(&self) -> String {
        format!("{}/foods/list", self.base_url)
    }

    /// Fetch one page (numbered from 1)
    pub async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<FoodRecord>> {
        let url = self.list_url();

        let mut query: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("pageSize", page_size.to_string()),
            ("pageNumber", page.to_string()),
        ];
        for data_type in &self.data_types {
            query.push(("dataType", data_type.clone()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::HttpStatus {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let foods: Vec<FoodRecord> =
            serde_json::from_str(&body).map_err(|e| IngestError::MalformedResponse {
                page,
                message: e.to_string(),
            })?;

        debug!("Page {} returned {} foods", page, foods.len());

        Ok(foods)
    }

    /// Fetch pages in order and concatenate them
    pub async fn fetch_all(&self, limit: PageLimit, page_size: u32) -> Result<(Vec<FoodRecord>, u32)> {
        let mut all_foods = Vec::new();
        let mut pages = 0;

        match limit {
            PageLimit::Pages(total_pages) => {
                for page in 1..=total_pages {
                    info!("Fetching page {}/{}...", page, total_pages);
                    let foods = self.fetch_page(page, page_size).await?;
                    all_foods.extend(foods);
                    pages += 1;
                }
            }
            PageLimit::UntilEmpty => {
                let mut page = 1;
                loop {
                    info!("Fetching page {}...", page);
                    let foods = self.fetch_page(page, page_size).await?;
                    pages += 1;
                    if foods.is_empty() {
                        info!("Page {} is empty, stopping", page);
                        break;
                    }
                    all_foods.extend(foods);
                    page += 1;
                }
            }
        }

        info!("Fetched {} foods from {} pages", all_foods.len(), pages);

        Ok((all_foods, pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::utils::http_client;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_of(start: i64, count: i64) -> Value {
        let foods: Vec<Value> = (start..start + count)
            .map(|id| json!({"fdcId": id, "description": format!("Food {}", id)}))
            .collect();
        Value::Array(foods)
    }

    fn client_for(server: &MockServer) -> FdcClient {
        FdcClient::new(
            http_client().unwrap(),
            &server.uri(),
            "test-key",
            vec!["Foundation".to_string(), "SR Legacy".to_string()],
        )
    }

    #[tokio::test]
    async fn test_fetch_page_sends_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/list"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("pageSize", "200"))
            .and(query_param("pageNumber", "3"))
            .and(query_param("dataType", "Foundation"))
            .and(query_param("dataType", "SR Legacy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "fdcId": 170567,
                    "description": "Almonds",
                    "foodPortions": [{"measureUnit": "cup", "amount": 1, "gramWeight": 143}],
                    "foodNutrients": [{"nutrientId": 1003, "amount": 21.15}]
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let foods = client_for(&server).fetch_page(3, 200).await.unwrap();

        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].fdc_id, 170567);
        assert_eq!(foods[0].description.as_deref(), Some("Almonds"));
        assert_eq!(foods[0].food_portions.as_ref().map(Vec::len), Some(1));
        assert_eq!(foods[0].food_nutrients.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_fetch_all_concatenates_in_page_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/list"))
            .and(query_param("pageNumber", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(1, 200)))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/foods/list"))
            .and(query_param("pageNumber", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(201, 200)))
            .expect(1)
            .mount(&server)
            .await;

        let (foods, pages) = client_for(&server)
            .fetch_all(PageLimit::Pages(2), 200)
            .await
            .unwrap();

        assert_eq!(pages, 2);
        assert_eq!(foods.len(), 400);
        let ids: Vec<i64> = foods.iter().map(|f| f.fdc_id).collect();
        assert_eq!(ids, (1..=400).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_fetch_all_until_empty_page() {
        let server = MockServer::start().await;

        for (page, body) in [("1", page_of(1, 2)), ("2", page_of(3, 1)), ("3", json!([]))] {
            Mock::given(method("GET"))
                .and(path("/foods/list"))
                .and(query_param("pageNumber", page))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .expect(1)
                .mount(&server)
                .await;
        }

        let (foods, pages) = client_for(&server)
            .fetch_all(PageLimit::UntilEmpty, 2)
            .await
            .unwrap();

        assert_eq!(pages, 3);
        assert_eq!(foods.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_aborts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/list"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API_KEY_INVALID"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_all(PageLimit::Pages(5), 200)
            .await
            .unwrap_err();

        match err {
            IngestError::HttpStatus { status, body, .. } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API_KEY_INVALID");
            }
            other => panic!("Expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_malformed_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_page(1, 200).await.unwrap_err();
        assert!(matches!(err, IngestError::MalformedResponse { page: 1, .. }));
    }

    #[tokio::test]
    async fn test_fetch_page_missing_fdc_id_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"description": "x"}])))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_page(1, 200).await.unwrap_err();
        assert!(matches!(err, IngestError::MalformedResponse { .. }));
    }
}
