//! HTTP implementation of the note service backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use notarium_core::{
    ChildrenStatus, CreateFileRequest, CreateNoteRequest, Error, FileId, FileStore, NeuralFile,
    Note, NoteId, NoteStore, PillarRequest, PinContext, Result, UpdateFileRequest,
    UpdateNoteRequest,
};

use crate::config::BackendConfig;

/// Note service backend speaking the REST surface over HTTP.
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a backend with the given configuration.
    pub fn new(config: BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        debug!(base_url = %config.base_url, "Initializing HTTP backend");

        Self { client, config }
    }

    /// Create from environment variables (see [`BackendConfig::from_env`]).
    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(Error::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.authed(self.client.get(self.url(path))).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_json<B: Serialize + ?Sized>(&self, builder: RequestBuilder, body: &B) -> Result<Response> {
        let response = self.authed(builder.json(body)).send().await?;
        Self::check(response).await
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.authed(builder).send().await?;
        Self::check(response).await
    }
}

#[derive(Serialize)]
struct PinRequest {
    position: i32,
    context: PinContext,
}

#[derive(Serialize)]
struct DeleteManyRequest<'a> {
    note_ids: &'a [NoteId],
}

#[derive(Serialize)]
struct UpdateTitleRequest<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct UpdateContentRequest<'a> {
    description: &'a [String],
}

/// Response from the pillar generation endpoint.
#[derive(Deserialize)]
struct PillarResponse {
    #[serde(default)]
    pillars: Vec<String>,
}

#[async_trait]
impl NoteStore for HttpBackend {
    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "list_children", note_id = parent_id))]
    async fn list_children(&self, parent_id: NoteId) -> Result<Vec<Note>> {
        let start = Instant::now();
        let notes: Vec<Note> = self.get_json(&format!("/notes/children/{}", parent_id)).await?;
        debug!(
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Children listed"
        );
        Ok(notes)
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "list_file_notes"))]
    async fn list_file_notes(&self, file_id: FileId) -> Result<Vec<Note>> {
        let start = Instant::now();
        let notes: Vec<Note> = self.get_json(&format!("/notes/file/{}", file_id)).await?;
        debug!(
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "File notes listed"
        );
        Ok(notes)
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "list_recent"))]
    async fn list_recent(&self) -> Result<Vec<Note>> {
        self.get_json("/notes/recent").await
    }

    async fn fetch(&self, id: NoteId) -> Result<Note> {
        self.get_json(&format!("/notes/id/{}", id)).await
    }

    async fn children_count(&self, id: NoteId) -> Result<ChildrenStatus> {
        self.get_json(&format!("/notes/{}/children-count", id)).await
    }

    #[instrument(skip(self, req), fields(subsystem = "client", component = "http", op = "create"))]
    async fn create(&self, req: CreateNoteRequest) -> Result<Note> {
        let response = self.send_json(self.client.post(self.url("/notes")), &req).await?;
        Ok(response.json::<Note>().await?)
    }

    #[instrument(skip(self, req), fields(subsystem = "client", component = "http", op = "update", note_id = id))]
    async fn update(&self, id: NoteId, req: UpdateNoteRequest) -> Result<Note> {
        let response = self
            .send_json(self.client.put(self.url(&format!("/notes/{}", id))), &req)
            .await?;
        Ok(response.json::<Note>().await?)
    }

    async fn update_title(&self, id: NoteId, title: &str) -> Result<()> {
        self.send_json(
            self.client.put(self.url(&format!("/notes/{}/update-title", id))),
            &UpdateTitleRequest { title },
        )
        .await?;
        Ok(())
    }

    async fn update_description(&self, id: NoteId, blocks: &[String]) -> Result<()> {
        self.send_json(
            self.client.put(self.url(&format!("/notes/{}/update-content", id))),
            &UpdateContentRequest { description: blocks },
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "delete", note_id = id))]
    async fn delete(&self, id: NoteId) -> Result<()> {
        self.send_empty(self.client.delete(self.url(&format!("/notes/{}", id)))).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "delete_many", result_count = ids.len()))]
    async fn delete_many(&self, ids: &[NoteId]) -> Result<()> {
        self.send_json(
            self.client.delete(self.url("/notes/multiple")),
            &DeleteManyRequest { note_ids: ids },
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "pin", note_id = id))]
    async fn pin(&self, id: NoteId, position: i32, context: PinContext) -> Result<()> {
        self.send_json(
            self.client.post(self.url(&format!("/notes/{}/pin", id))),
            &PinRequest { position, context },
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "unpin", note_id = id))]
    async fn unpin(&self, id: NoteId) -> Result<()> {
        self.send_empty(self.client.post(self.url(&format!("/notes/{}/unpin", id)))).await?;
        Ok(())
    }
}

#[async_trait]
impl FileStore for HttpBackend {
    async fn list_files(&self) -> Result<Vec<NeuralFile>> {
        self.get_json("/neuralfiles").await
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "fetch_file", file_id = id))]
    async fn fetch_file(&self, id: FileId) -> Result<NeuralFile> {
        self.get_json(&format!("/neuralfiles/{}", id)).await
    }

    async fn create_file(&self, req: CreateFileRequest) -> Result<NeuralFile> {
        let response = self
            .send_json(self.client.post(self.url("/neuralfiles")), &req)
            .await?;
        Ok(response.json::<NeuralFile>().await?)
    }

    #[instrument(skip(self, req), fields(subsystem = "client", component = "http", op = "update_file", file_id = id))]
    async fn update_file(&self, id: FileId, req: UpdateFileRequest) -> Result<NeuralFile> {
        let response = self
            .send_json(self.client.put(self.url(&format!("/neuralfiles/{}", id))), &req)
            .await?;
        Ok(response.json::<NeuralFile>().await?)
    }

    async fn delete_file(&self, id: FileId) -> Result<()> {
        self.send_empty(self.client.delete(self.url(&format!("/neuralfiles/{}", id)))).await?;
        Ok(())
    }

    #[instrument(skip(self, req), fields(subsystem = "client", component = "http", op = "generate_pillars"))]
    async fn generate_pillars(&self, req: PillarRequest) -> Result<Vec<String>> {
        let start = Instant::now();
        // Pillar generation goes through the AI subsystem; give it the long
        // timeout instead of the CRUD one.
        let builder = self
            .client
            .post(self.url("/chat-algorithm/generate-subdomains"))
            .timeout(Duration::from_secs(self.config.pillar_timeout_secs));
        let response = self.send_json(builder, &req).await?;
        let parsed: PillarResponse = response.json().await?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(result_count = parsed.pillars.len(), duration_ms = elapsed, "Pillars generated");
        if elapsed > 10_000 {
            warn!(duration_ms = elapsed, slow = true, "Slow pillar generation");
        }
        Ok(parsed.pillars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let backend = HttpBackend::new(BackendConfig::new("http://host:8001/api"));
        assert_eq!(backend.url("/notes/recent"), "http://host:8001/api/notes/recent");
    }

    #[test]
    fn test_pin_request_serialization() {
        let req = PinRequest {
            position: 2,
            context: PinContext::File,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"position":2,"context":"file"}"#);
    }

    #[test]
    fn test_delete_many_request_serialization() {
        let ids = vec![1, 2, 3];
        let req = DeleteManyRequest { note_ids: &ids };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"note_ids":[1,2,3]}"#);
    }

    #[test]
    fn test_pillar_response_tolerates_missing_field() {
        let parsed: PillarResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.pillars.is_empty());
    }

    #[test]
    fn test_from_env_defaults() {
        // No env vars set in the test environment for these keys.
        let backend = HttpBackend::new(BackendConfig::default());
        assert_eq!(backend.base_url(), notarium_core::defaults::BASE_URL);
    }
}
