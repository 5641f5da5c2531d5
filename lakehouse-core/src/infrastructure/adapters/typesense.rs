// lakehouse-core/src/infrastructure/adapters/typesense.rs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::domain::search::{
    CollectionSchema, FacetCounts, FacetValue, FieldType, ProjectDocument, SearchHit, SearchQuery,
    SearchResponse,
};
use crate::error::LakehouseError;
use crate::infrastructure::error::{InfrastructureError, SearchError};
use crate::ports::search::SearchEngine;

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";
const FACET_FIELDS: &str = "country,year";

fn search_err(e: SearchError) -> LakehouseError {
    LakehouseError::Infrastructure(InfrastructureError::Search(e))
}

pub struct TypesenseEngine {
    client: Client,
    base_url: String,
    api_key: String,
    collection: String,
}

impl TypesenseEngine {
    pub fn new(
        base_url: &str,
        api_key: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            collection: collection.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn collection_info(&self) -> Result<Option<Value>, LakehouseError> {
        let response = self
            .client
            .get(self.url(&format!("/collections/{}", self.collection)))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| search_err(SearchError::connection(e.to_string())))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<Value>()
                .await
                .map(Some)
                .map_err(|e| search_err(SearchError::parse(e.to_string()))),
            status => Err(search_err(SearchError::collection(format!(
                "GET collection returned {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )))),
        }
    }
}

pub fn schema_json(schema: &CollectionSchema) -> Value {
    let fields: Vec<Value> = schema
        .fields
        .iter()
        .map(|f| {
            let mut field = json!({
                "name": f.name,
                "type": match f.field_type {
                    FieldType::String => "string",
                    FieldType::Int64 => "int64",
                    FieldType::FloatArray => "float[]",
                },
                "facet": f.facet,
                "optional": f.optional,
            });
            if let Some(dims) = f.dimensions {
                field["num_dim"] = json!(dims);
            }
            field
        })
        .collect();
    json!({ "name": schema.name, "fields": fields })
}

/// Counts accepted lines of an import response. Rejections are returned as an error.
pub fn parse_import_result(body: &str) -> Result<usize, SearchError> {
    let mut accepted = 0;
    let mut errors = Vec::new();
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let value: Value =
            serde_json::from_str(line).map_err(|e| SearchError::parse(e.to_string()))?;
        if value.get("success").and_then(Value::as_bool) == Some(true) {
            accepted += 1;
        } else {
            errors.push(
                value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            );
        }
    }
    if errors.is_empty() {
        Ok(accepted)
    } else {
        Err(SearchError::bulk_index(format!(
            "{} documents rejected, first error: {}",
            errors.len(),
            errors[0]
        )))
    }
}

#[derive(Debug, Deserialize)]
struct TsHit {
    document: ProjectDocument,
    #[serde(default)]
    text_match: Option<u64>,
    #[serde(default)]
    vector_distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TsFacetCount {
    value: String,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct TsFacet {
    field_name: String,
    #[serde(default)]
    counts: Vec<TsFacetCount>,
}

#[derive(Debug, Deserialize)]
struct TsSearchResponse {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    hits: Vec<TsHit>,
    #[serde(default)]
    facet_counts: Vec<TsFacet>,
}

#[derive(Debug, Deserialize)]
struct TsMultiSearchResponse {
    results: Vec<Value>,
}

pub fn parse_search_response(body: Value) -> Result<SearchResponse, SearchError> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(SearchError::query(message.to_string()));
    }
    let raw: TsSearchResponse =
        serde_json::from_value(body).map_err(|e| SearchError::parse(e.to_string()))?;
    Ok(SearchResponse {
        found: raw.found,
        hits: raw
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                score: match (hit.vector_distance, hit.text_match) {
                    (Some(distance), _) => 1.0 - distance,
                    (None, Some(text_match)) => text_match as f64,
                    (None, None) => 0.0,
                },
                document: hit.document,
            })
            .collect(),
        facets: raw
            .facet_counts
            .into_iter()
            .map(|facet| FacetCounts {
                field: facet.field_name,
                counts: facet
                    .counts
                    .into_iter()
                    .map(|c| FacetValue {
                        value: c.value,
                        count: c.count,
                    })
                    .collect(),
            })
            .collect(),
    })
}

/// Search parameters shared by the GET and multi-search forms.
fn search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", query.text.clone()),
        ("query_by", "title,abstract".to_string()),
        ("facet_by", FACET_FIELDS.to_string()),
        ("per_page", query.limit.to_string()),
        ("exclude_fields", "embedding".to_string()),
    ];
    if let Some(filter) = query.filter_expression() {
        params.push(("filter_by", filter));
    }
    params
}

fn vector_query(vector: &[f32], k: usize) -> String {
    let values: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
    format!("embedding:([{}], k:{})", values.join(","), k)
}

#[async_trait]
impl SearchEngine for TypesenseEngine {
    #[instrument(skip_all, fields(collection = %schema.name))]
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<bool, LakehouseError> {
        if self.collection_info().await?.is_some() {
            debug!("Collection already present");
            return Ok(false);
        }

        let response = self
            .client
            .post(self.url("/collections"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&schema_json(schema))
            .send()
            .await
            .map_err(|e| search_err(SearchError::connection(e.to_string())))?;

        // Lost a creation race with another indexer
        if response.status() == StatusCode::CONFLICT {
            return Ok(false);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(search_err(SearchError::collection(format!(
                "create returned {}: {}",
                status, body
            ))));
        }
        info!("Search collection created");
        Ok(true)
    }

    #[instrument(skip_all, fields(documents = documents.len()))]
    async fn upsert_documents(
        &self,
        documents: &[ProjectDocument],
    ) -> Result<usize, LakehouseError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let mut body = String::new();
        for doc in documents {
            body.push_str(&serde_json::to_string(doc).map_err(InfrastructureError::Json)?);
            body.push('\n');
        }

        let response = self
            .client
            .post(self.url(&format!(
                "/collections/{}/documents/import?action=upsert",
                self.collection
            )))
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| search_err(SearchError::connection(e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| search_err(SearchError::connection(e.to_string())))?;
        if !status.is_success() {
            return Err(search_err(SearchError::bulk_index(format!(
                "import returned {}: {}",
                status, text
            ))));
        }
        parse_import_result(&text).map_err(search_err)
    }

    #[instrument(skip_all, fields(q = %query.text))]
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, LakehouseError> {
        let body: Value = match &query.vector {
            // Vectors do not fit in a query string
            Some(vector) => {
                let mut search: serde_json::Map<String, Value> = search_params(query)
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v)))
                    .collect();
                search.insert("collection".into(), json!(self.collection));
                search.insert(
                    "vector_query".into(),
                    json!(vector_query(vector, query.limit)),
                );
                let response = self
                    .client
                    .post(self.url("/multi_search"))
                    .header(API_KEY_HEADER, &self.api_key)
                    .json(&json!({ "searches": [Value::Object(search)] }))
                    .send()
                    .await
                    .map_err(|e| search_err(SearchError::connection(e.to_string())))?;
                let multi: TsMultiSearchResponse = response
                    .json()
                    .await
                    .map_err(|e| search_err(SearchError::parse(e.to_string())))?;
                multi
                    .results
                    .into_iter()
                    .next()
                    .ok_or_else(|| search_err(SearchError::parse("empty multi_search result")))?
            }
            None => {
                let response = self
                    .client
                    .get(self.url(&format!(
                        "/collections/{}/documents/search",
                        self.collection
                    )))
                    .header(API_KEY_HEADER, &self.api_key)
                    .query(&search_params(query))
                    .send()
                    .await
                    .map_err(|e| search_err(SearchError::connection(e.to_string())))?;
                response
                    .json()
                    .await
                    .map_err(|e| search_err(SearchError::parse(e.to_string())))?
            }
        };
        parse_search_response(body).map_err(search_err)
    }

    async fn count_documents(&self) -> Result<u64, LakehouseError> {
        Ok(self
            .collection_info()
            .await?
            .and_then(|info| info.get("num_documents").and_then(Value::as_u64))
            .unwrap_or(0))
    }

    fn engine_name(&self) -> &str {
        "typesense"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_schema_json_marks_facets_and_vector() {
        let schema = CollectionSchema::projects("projects", Some(384));

        let value = schema_json(&schema);

        let fields = value["fields"].as_array().unwrap();
        let country = fields.iter().find(|f| f["name"] == "country").unwrap();
        assert_eq!(country["facet"], json!(true));
        let embedding = fields.iter().find(|f| f["name"] == "embedding").unwrap();
        assert_eq!(embedding["type"], json!("float[]"));
        assert_eq!(embedding["num_dim"], json!(384));
    }

    #[test]
    fn test_import_result_reports_rejections() {
        assert_eq!(
            parse_import_result("{\"success\":true}\n{\"success\":true}\n").unwrap(),
            2
        );
        let err = parse_import_result(
            "{\"success\":true}\n{\"success\":false,\"error\":\"Bad field year\"}\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Bad field year"));
    }

    #[test]
    fn test_search_response_maps_hits_and_facets() -> Result<()> {
        let body = json!({
            "found": 1,
            "hits": [{
                "document": {"id": "P1", "project_id": "P1", "title": "Solar", "abstract": "", "country": "DE", "year": 2022},
                "text_match": 578730123365187705u64
            }],
            "facet_counts": [{"field_name": "country", "counts": [{"value": "DE", "count": 1}]}]
        });

        let response = parse_search_response(body)?;

        assert_eq!(response.found, 1);
        assert_eq!(response.hits[0].document.country.as_deref(), Some("DE"));
        assert_eq!(response.facets[0].counts[0].count, 1);
        Ok(())
    }

    #[test]
    fn test_search_params_include_filter() -> Result<()> {
        let query = SearchQuery::new("hydrogen", Some("fr"), None, 5)?;
        let params = search_params(&query);
        assert!(params.contains(&("filter_by", "country:=`FR`".to_string())));
        assert!(params.contains(&("per_page", "5".to_string())));
        assert_eq!(vector_query(&[0.5, 1.0], 3), "embedding:([0.5,1], k:3)");
        Ok(())
    }
}
