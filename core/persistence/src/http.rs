//! FILENAME: core/persistence/src/http.rs
//! PURPOSE: `MatrixStore` backed by the study server REST API.
//! CONTEXT: Endpoints are relative to `{base_url}/v1/studies/{study_id}`; the
//! matrix location inside the study is passed as the `path` query parameter.

use std::time::Duration;

use engine::{PendingUpdate, TimeMetadata};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::{ImportFile, MatrixData, MatrixStore, PersistenceError};

pub struct HttpMatrixStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpMatrixStore {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PersistenceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpMatrixStore {
            client,
            base_url,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, study_id: &str, resource: &str) -> String {
        format!("{}/v1/studies/{}/{}", self.base_url, study_id, resource)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Maps non-success statuses to errors, keeping the response body as message.
    async fn check(response: Response) -> Result<Response, PersistenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let message = response.text().await.unwrap_or_default();
        log::warn!("{} -> {}: {}", url, status, message);
        if status == StatusCode::NOT_FOUND {
            return Err(PersistenceError::NotFound(url));
        }
        Err(PersistenceError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl MatrixStore for HttpMatrixStore {
    async fn fetch_matrix(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<MatrixData, PersistenceError> {
        let url = self.endpoint(study_id, "raw");
        log::debug!("GET {} path={}", url, path);
        let response = self
            .request(Method::GET, &url)
            .query(&[("path", path), ("formatted", "true")])
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<MatrixData>().await?)
    }

    async fn fetch_time_index(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<TimeMetadata, PersistenceError> {
        let url = self.endpoint(study_id, "matrixindex");
        log::debug!("GET {} path={}", url, path);
        let response = self
            .request(Method::GET, &url)
            .query(&[("path", path)])
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<TimeMetadata>().await?)
    }

    async fn flush_edits(
        &self,
        study_id: &str,
        path: &str,
        updates: &[PendingUpdate],
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(study_id, "matrix");
        log::debug!("PUT {} path={} updates={}", url, path, updates.len());
        let response = self
            .request(Method::PUT, &url)
            .query(&[("path", path)])
            .json(updates)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn import_file(
        &self,
        file: &ImportFile,
        study_id: &str,
        path: &str,
    ) -> Result<(), PersistenceError> {
        let url = self.endpoint(study_id, "raw");
        log::debug!("PUT {} path={} file={} ({} bytes)", url, path, file.name, file.bytes.len());
        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let response = self
            .request(Method::PUT, &url)
            .query(&[("path", path), ("create_missing", "true")])
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let store = HttpMatrixStore::with_client(Client::new(), "http://localhost:8080/api/", None);
        assert_eq!(store.base_url(), "http://localhost:8080/api");
        assert_eq!(
            store.endpoint("study-1", "raw"),
            "http://localhost:8080/api/v1/studies/study-1/raw"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let store = HttpMatrixStore::new(
            "http://127.0.0.1:9",
            Some("token".to_string()),
            Duration::from_millis(500),
        )
        .unwrap();
        let result = store.fetch_matrix("study", "input/load/series/load_fr").await;
        assert!(matches!(result, Err(PersistenceError::Http(_))));
    }
}
