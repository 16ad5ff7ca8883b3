//! REST transport and the HTTP gateway.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use campus_core::defaults::SESSION_COOKIE_NAME;
use campus_core::{
    ActionMethod, Body, EntityDescriptor, Error, FormValue, MultipartField, Payload, Record,
    RecordId, RemoteGateway, Result,
};

use crate::config::ClientConfig;
use crate::envelope;

/// Requests slower than this are logged at warn level.
const SLOW_REQUEST_MS: u64 = 3000;

/// Thin wrapper over `reqwest` that knows the base URL, the session cookie and
/// how the API reports errors.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and return the decoded body (`Null` when empty).
    pub async fn send(&self, method: Method, path: &str, body: Option<&Payload>) -> Result<Value> {
        let url = self.config.url(path);
        let start = Instant::now();

        let mut request = self.client.request(method.clone(), &url);
        if let Some(cookie) = &self.config.session_cookie {
            request = request.header(
                reqwest::header::COOKIE,
                format!("{}={}", SESSION_COOKIE_NAME, cookie),
            );
        }
        request = match body.map(Payload::body) {
            Some(Body::Json(json)) => request.json(&json),
            Some(Body::Multipart(parts)) => request.multipart(to_form(parts)?),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::Request(format!("{} {} failed: {}", method, path, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("Failed to read response: {}", e)))?;
        let elapsed = start.elapsed().as_millis() as u64;

        debug!(%method, path, status = status.as_u16(), duration_ms = elapsed, "Request complete");
        if elapsed > SLOW_REQUEST_MS {
            warn!(%method, path, duration_ms = elapsed, slow = true, "Slow API request");
        }

        let json = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(json) => json,
                Err(_) if status.is_success() => {
                    debug!(path, "Non-JSON success body ignored");
                    Value::Null
                }
                Err(_) => Value::String(text.clone()),
            }
        };

        if status.is_success() {
            return Ok(json);
        }

        let message = envelope::error_message(&json)
            .or_else(|| json.as_str().map(str::to_string))
            .unwrap_or_default();
        warn!(%method, path, status = status.as_u16(), error = %message, "API request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized(if message.is_empty() {
                path.to_string()
            } else {
                message
            }),
            StatusCode::NOT_FOUND if message.is_empty() => Error::NotFound(path.to_string()),
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, payload: &Payload) -> Result<Value> {
        self.send(Method::POST, path, Some(payload)).await
    }

    pub async fn put(&self, path: &str, payload: &Payload) -> Result<Value> {
        self.send(Method::PUT, path, Some(payload)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, None).await
    }
}

/// Convert flattened parts into a `reqwest` form.
fn to_form(parts: Vec<MultipartField>) -> Result<Form> {
    parts
        .into_iter()
        .try_fold(Form::new(), |form, field| match field.value {
            FormValue::Text(text) => Ok(form.text(field.name, text)),
            FormValue::File(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)
                    .map_err(|e| Error::Internal(format!("Failed to create multipart: {}", e)))?;
                Ok(form.part(field.name, part))
            }
        })
}

/// [`RemoteGateway`] over the REST API for one entity.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    api: ApiClient,
    descriptor: &'static EntityDescriptor,
}

impl HttpGateway {
    pub fn new(api: ApiClient, descriptor: &'static EntityDescriptor) -> Self {
        Self { api, descriptor }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http_gateway", op = "get_all", entity = self.descriptor.path))]
    async fn get_all(&self) -> Result<Vec<Record>> {
        self.descriptor
            .ensure(self.descriptor.operations.get_all, "get_all")?;
        let body = self.api.get(&self.descriptor.list_path()).await?;
        let records = envelope::unwrap_list(body, self.descriptor.path)?;
        debug!(record_count = records.len(), "Collection fetched");
        Ok(records)
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http_gateway", op = "get_by_id", entity = self.descriptor.path, record_id = %id))]
    async fn get_by_id(&self, id: &RecordId) -> Result<Record> {
        self.descriptor
            .ensure(self.descriptor.operations.get_by_id, "get_by_id")?;
        let body = self.api.get(&self.descriptor.item_path(id)).await?;
        envelope::unwrap_record(body)
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.descriptor.path, id)))
    }

    #[instrument(skip(self, payload), fields(subsystem = "client", component = "http_gateway", op = "create", entity = self.descriptor.path, multipart = payload.is_multipart()))]
    async fn create(&self, payload: &Payload) -> Result<Option<Record>> {
        self.descriptor
            .ensure(self.descriptor.operations.create, "create")?;
        let body = self.api.post(&self.descriptor.create_path(), payload).await?;
        let created = envelope::unwrap_record(body);
        debug!(echoed = created.is_some(), "Record created");
        Ok(created)
    }

    #[instrument(skip(self, payload), fields(subsystem = "client", component = "http_gateway", op = "update", entity = self.descriptor.path, record_id = %id, multipart = payload.is_multipart()))]
    async fn update(&self, id: &RecordId, payload: &Payload) -> Result<Option<Record>> {
        self.descriptor
            .ensure(self.descriptor.operations.update, "update")?;
        let body = self.api.put(&self.descriptor.update_path(id), payload).await?;
        let updated = envelope::unwrap_record(body);
        debug!(echoed = updated.is_some(), "Record updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http_gateway", op = "delete", entity = self.descriptor.path, record_id = %id))]
    async fn delete(&self, id: &RecordId) -> Result<()> {
        self.descriptor
            .ensure(self.descriptor.operations.delete, "delete")?;
        self.api.delete(&self.descriptor.delete_path(id)).await?;
        debug!("Record deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http_gateway", op = "action", entity = self.descriptor.path, record_id = %id))]
    async fn action(&self, name: &str, id: &RecordId) -> Result<Option<Record>> {
        let action = self
            .descriptor
            .action(name)
            .ok_or_else(|| self.descriptor.unsupported(name))?;
        let method = match action.method {
            ActionMethod::Post => Method::POST,
            ActionMethod::Put => Method::PUT,
            ActionMethod::Patch => Method::PATCH,
        };
        let empty = Payload::from_fields(&Record::new());
        let body = self
            .api
            .send(method, &self.descriptor.action_path(action, id), Some(&empty))
            .await?;
        Ok(envelope::unwrap_record(body))
    }
}
