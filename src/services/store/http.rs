use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::{DocumentStore, Filter, Scan, StoreError};

/// REST client for the managed document store.
///
/// Handles all communication with the store: point reads and writes of
/// relationship records, and the profile range scans behind the feed.
pub struct HttpStore {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
}

impl HttpStore {
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("X-Store-Key", &self.api_key)
            .header("X-Store-Project", &self.project_id)
    }

    /// Map a non-success status onto the store error taxonomy. `target`
    /// names the record or collection for diagnostics.
    fn status_error(status: StatusCode, target: &str) -> StoreError {
        match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(target.to_string()),
            StatusCode::CONFLICT => StoreError::AlreadyExists(target.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
            other => StoreError::Api(format!("{target}: {other}")),
        }
    }
}

/// Render a scan as the store's query-string dialect.
///
/// Resuming a descending scan "strictly after" a sort-key value means
/// strictly below it, hence `lessThan`.
pub(crate) fn scan_queries(scan: &Scan) -> Vec<String> {
    let mut queries = Vec::new();

    for filter in &scan.filters {
        match filter {
            Filter::Eq(field, value) => {
                queries.push(format!("equal(\"{field}\", {value})"));
            }
            Filter::Contains(field, value) => {
                queries.push(format!("contains(\"{field}\", {value})"));
            }
        }
    }

    if let Some(field) = scan.order_desc {
        queries.push(format!("orderDesc(\"{field}\")"));
        if let Some(after) = &scan.start_after {
            queries.push(format!("lessThan(\"{field}\", {after})"));
        }
    }

    if let Some(limit) = scan.limit {
        queries.push(format!("limit({limit})"));
    }

    queries
}

/// Strip store bookkeeping fields from a returned document, keeping `$id`
/// so callers can recover the record key.
fn clean_document(doc: &Value) -> Value {
    let id = doc.get("$id").cloned();
    let body = doc.get("data").unwrap_or(doc);

    let mut fields = match body.as_object() {
        Some(fields) => fields.clone(),
        None => return body.clone(),
    };
    fields.retain(|key, _| !key.starts_with('$'));
    if let Some(id) = id {
        fields.insert("$id".to_string(), id);
    }
    Value::Object(fields)
}

#[async_trait::async_trait]
impl DocumentStore for HttpStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let url = self.document_url(collection, id);
        let response = self.request(reqwest::Method::GET, &url).send().await?;

        if !response.status().is_success() {
            return Err(Self::status_error(
                response.status(),
                &format!("{collection}/{id}"),
            ));
        }

        let doc: Value = response.json().await?;
        Ok(clean_document(&doc))
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let url = self.collection_url(collection);

        let mut payload = doc;
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("$id".to_string(), Value::String(id.to_string()));
        }

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(
                response.status(),
                &format!("{collection}/{id}"),
            ));
        }

        tracing::debug!("Created document {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let response = self.request(reqwest::Method::DELETE, &url).send().await?;

        if !response.status().is_success() {
            return Err(Self::status_error(
                response.status(),
                &format!("{collection}/{id}"),
            ));
        }

        tracing::debug!("Deleted document {}/{}", collection, id);
        Ok(())
    }

    async fn scan(&self, collection: &str, scan: Scan) -> Result<Vec<Value>, StoreError> {
        let queries_json = serde_json::to_string(&scan_queries(&scan))
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let url = format!(
            "{}?query={}",
            self.collection_url(collection),
            urlencoding::encode(&queries_json)
        );

        let response = self.request(reqwest::Method::GET, &url).send().await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), collection));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);
        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

        tracing::debug!(
            "Scanned {} documents from {} (total: {})",
            documents.len(),
            collection,
            total
        );

        Ok(documents.iter().map(clean_document).collect())
    }

    async fn health(&self) -> Result<(), StoreError> {
        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        let response = self.request(reqwest::Method::GET, &url).send().await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), "health"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_for(server: &mockito::Server) -> HttpStore {
        HttpStore::new(
            server.url(),
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
        )
    }

    #[test]
    fn test_scan_query_rendering() {
        let scan = Scan::new()
            .eq("onboardingCompleted", true)
            .eq("fromUid", "u1")
            .order_desc("updatedAt")
            .start_after(1700000000000i64)
            .limit(75);

        assert_eq!(
            scan_queries(&scan),
            vec![
                "equal(\"onboardingCompleted\", true)",
                "equal(\"fromUid\", \"u1\")",
                "orderDesc(\"updatedAt\")",
                "lessThan(\"updatedAt\", 1700000000000)",
                "limit(75)",
            ]
        );
    }

    #[test]
    fn test_clean_document_strips_bookkeeping() {
        let doc = json!({
            "$id": "u1",
            "$collectionId": "profiles",
            "$permissions": [],
            "displayName": "Avery",
        });

        let cleaned = clean_document(&doc);
        assert_eq!(cleaned, json!({"$id": "u1", "displayName": "Avery"}));
    }

    #[tokio::test]
    async fn test_insert_conflict_maps_to_already_exists() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/databases/test_db/collections/matches/documents")
            .match_header("X-Store-Key", "test_key")
            .with_status(409)
            .with_body("{}")
            .create_async()
            .await;

        let store = store_for(&server);
        let err = store
            .insert("matches", "a_b", json!({"members": ["a", "b"]}))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_missing_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/databases/test_db/collections/likes/documents/a_b")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let store = store_for(&server);
        let err = store.delete("likes", "a_b").await.unwrap_err();

        assert!(err.is_not_found());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_scan_parses_documents() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "total": 1,
            "documents": [
                {"$id": "u1", "$collectionId": "profiles", "displayName": "Avery"}
            ]
        });
        let mock = server
            .mock("GET", "/databases/test_db/collections/profiles/documents")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let store = store_for(&server);
        let docs = store
            .scan("profiles", Scan::new().order_desc("updatedAt").limit(10))
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0], json!({"$id": "u1", "displayName": "Avery"}));
        mock.assert_async().await;
    }
}
