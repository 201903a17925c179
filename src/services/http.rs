// src/services/http.rs
//! REST client for the remote equipment service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{CreateEquipmentRequest, Equipment, EquipmentId, UpdateEquipmentRequest};
use crate::query_builders::SearchParams;

use super::EquipmentService;

const EQUIPMENT_RESOURCE: &str = "/equipos-powerplate";

pub struct HttpEquipmentService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpEquipmentService {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> ConsoleResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> ConsoleResult<Self> {
        Self::new(
            &config.base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, EQUIPMENT_RESOURCE, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ConsoleResult<T> {
        let mut request = request.header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_detail(status, &body);
        log::warn!("Equipment service answered {}: {}", status, message);
        match status {
            StatusCode::NOT_FOUND => Err(ConsoleError::NotFound(message)),
            _ => Err(ConsoleError::Service(message)),
        }
    }
}

/// Message carried by an error response: the `detail` field when the body
/// has one, otherwise the raw body, otherwise the status reason.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

#[async_trait]
impl EquipmentService for HttpEquipmentService {
    async fn search(&self, params: &SearchParams) -> ConsoleResult<Vec<Equipment>> {
        let pairs = params.to_query_pairs();
        log::debug!("Searching equipment with {:?}", pairs);
        self.send(self.client.get(self.url("/buscar/")).query(&pairs)).await
    }

    async fn create(&self, data: &CreateEquipmentRequest) -> ConsoleResult<Equipment> {
        self.send(self.client.post(self.url("/")).json(data)).await
    }

    async fn update(&self, id: EquipmentId, data: &UpdateEquipmentRequest) -> ConsoleResult<Equipment> {
        self.send(self.client.put(self.url(&format!("/{}", id))).json(data)).await
    }

    async fn to_maintenance(&self, id: EquipmentId) -> ConsoleResult<Equipment> {
        self.send(self.client.post(self.url(&format!("/{}/mantenimiento", id)))).await
    }

    async fn activate(&self, id: EquipmentId) -> ConsoleResult<Equipment> {
        self.send(self.client.post(self.url(&format!("/{}/activar", id)))).await
    }
}
