use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    StatusCode,
};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{
    api::{CatalogObject, CommerceApi, InventoryCountsPage, OrdersPage},
    config::Config,
    error::{ApiError, ApiErrors, Result},
    filter::OrderFilter,
};

/// A blocking Square REST client covering the calls a sales report needs.
pub struct SquareClient {
    http: Client,
    base_url: String,
}

impl SquareClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Client`] if the HTTP client cannot be built,
    /// or [`crate::Error::Config`] if the token is not a valid header value.
    pub fn new(config: &Config) -> Result<Self> {
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.access_token.expose_secret()))
                .map_err(|_| {
                    crate::Error::Config("SQUARE_ACCESS_TOKEN contains invalid characters".into())
                })?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            "square-version",
            HeaderValue::from_str(&config.api_version).map_err(|_| {
                crate::Error::Config(format!("invalid SQUARE_VERSION {:?}", config.api_version))
            })?,
        );
        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn post<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &Value,
    ) -> std::result::Result<T, ApiErrors> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, %body, "POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| ApiErrors::synthesized("HTTP_ERROR", "TRANSPORT", e))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ApiErrors::synthesized("HTTP_ERROR", "READ_BODY", e))?;
        interpret(status, &text)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    errors: Vec<ApiError>,
    #[serde(flatten)]
    body: T,
}

#[derive(Deserialize)]
struct ErrorsOnly {
    #[serde(default)]
    errors: Vec<ApiError>,
}

/// Turns a raw response into either its decoded body or the error list it
/// carries. An empty successful body decodes as `T::default()`.
fn interpret<T: DeserializeOwned + Default>(
    status: StatusCode,
    text: &str,
) -> std::result::Result<T, ApiErrors> {
    if !status.is_success() {
        return match serde_json::from_str::<ErrorsOnly>(text) {
            Ok(parsed) if !parsed.errors.is_empty() => Err(ApiErrors(parsed.errors)),
            _ => Err(ApiErrors::synthesized(
                "API_ERROR",
                status.as_str(),
                format!("{status}: {}", text.trim()),
            )),
        };
    }
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    let envelope: Envelope<T> = serde_json::from_str(text)
        .map_err(|e| ApiErrors::synthesized("PARSE_ERROR", "INVALID_RESPONSE", e))?;
    if envelope.errors.is_empty() {
        Ok(envelope.body)
    } else {
        Err(ApiErrors(envelope.errors))
    }
}

#[derive(Default, Deserialize)]
struct CatalogBatch {
    #[serde(default)]
    objects: Vec<CatalogObject>,
}

impl CommerceApi for SquareClient {
    #[instrument(skip(self, filter), fields(location = %filter.location_id))]
    fn search_orders(
        &self,
        filter: &OrderFilter,
        cursor: Option<&str>,
    ) -> std::result::Result<OrdersPage, ApiErrors> {
        self.post("/v2/orders/search", &search_orders_body(filter, cursor))
    }

    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    fn batch_retrieve_catalog_objects(
        &self,
        ids: &[String],
    ) -> std::result::Result<Vec<CatalogObject>, ApiErrors> {
        let body = json!({ "object_ids": ids, "include_related_objects": false });
        let batch: CatalogBatch = self.post("/v2/catalog/batch-retrieve", &body)?;
        Ok(batch.objects)
    }

    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    fn batch_retrieve_inventory_counts(
        &self,
        ids: &[String],
        location_id: &str,
        cursor: Option<&str>,
    ) -> std::result::Result<InventoryCountsPage, ApiErrors> {
        let mut body = json!({
            "catalog_object_ids": ids,
            "location_ids": [location_id],
            "states": ["IN_STOCK"],
        });
        if let Some(cursor) = cursor {
            body["cursor"] = json!(cursor);
        }
        self.post("/v2/inventory/counts/batch-retrieve", &body)
    }
}

fn search_orders_body(filter: &OrderFilter, cursor: Option<&str>) -> Value {
    let mut query_filter = json!({
        "state_filter": { "states": filter.states },
        "date_time_filter": {
            "closed_at": {
                "start_at": filter.closed_at.start_rfc3339(),
                "end_at": filter.closed_at.end_rfc3339(),
            }
        },
    });
    if !filter.source_names.is_empty() {
        query_filter["source_filter"] = json!({ "source_names": filter.source_names });
    }
    let mut body = json!({
        "location_ids": [filter.location_id],
        "limit": filter.limit,
        "query": {
            "filter": query_filter,
            "sort": {
                "sort_field": filter.sort_field,
                "sort_order": filter.sort_order.as_str(),
            },
        },
    });
    if let Some(cursor) = cursor {
        body["cursor"] = json!(cursor);
    }
    body
}
