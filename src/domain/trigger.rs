use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An inbound webhook call as handed to the engine by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query_params: HashMap<String, String>,
    pub body: Value,
}

impl WebhookRequest {
    pub fn new(method: impl Into<String>, body: Value) -> Self {
        WebhookRequest {
            method: method.into(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            body,
        }
    }

    /// A plain POST with the given JSON body.
    pub fn post(body: Value) -> Self {
        Self::new("POST", body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }
}
