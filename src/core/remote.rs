//! Remote backend API client
//!
//! Read-only access to the per-collection listing endpoints. Collections
//! are fetched as raw JSON and mirrored locally; tolerant deserialization
//! into record types happens at query time in the store.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::entities::CollectionKind;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no se pudo inicializar el cliente HTTP: {0}")]
    Client(String),

    #[error("error de red consultando {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("el backend respondió {status} para {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("respuesta inesperada de {endpoint}: se esperaba una lista")]
    UnexpectedShape { endpoint: String },
}

pub struct RemoteClient {
    base: String,
    token: Option<String>,
    http: reqwest::blocking::Client,
}

impl RemoteClient {
    pub fn new(base: impl Into<String>, token: Option<String>) -> Result<Self, RemoteError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    /// Listing endpoint per collection, as the backend spells them
    pub fn endpoint(kind: CollectionKind) -> &'static str {
        match kind {
            CollectionKind::Stock => "/products/",
            CollectionKind::Suppliers => "/suppliers/",
            CollectionKind::Sales => "/sales/",
            CollectionKind::Purchases => "/purchases/",
            CollectionKind::Orders => "/orders/",
            CollectionKind::CashMovements => "/cash-movements/",
        }
    }

    /// Fetch one collection as raw records. Accepts both response shapes
    /// the backend produced over time: a bare array, or `{"results": []}`.
    pub fn fetch_collection(&self, kind: CollectionKind) -> Result<Vec<Value>, RemoteError> {
        let endpoint = Self::endpoint(kind).to_string();
        let url = format!("{}{}", self.base, endpoint);

        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(|source| RemoteError::Http {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status { endpoint, status });
        }

        let body: Value = response.json().map_err(|source| RemoteError::Http {
            endpoint: endpoint.clone(),
            source,
        })?;

        extract_items(body).ok_or(RemoteError::UnexpectedShape { endpoint })
    }
}

/// Pull the record list out of either historical response shape
pub(crate) fn extract_items(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_items_bare_array() {
        let items = extract_items(serde_json::json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_extract_items_paginated_shape() {
        let items =
            extract_items(serde_json::json!({"count": 1, "results": [{"id": 7}]})).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_extract_items_rejects_scalars() {
        assert!(extract_items(serde_json::json!("nope")).is_none());
        assert!(extract_items(serde_json::json!({"data": []})).is_none());
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(RemoteClient::endpoint(CollectionKind::Stock), "/products/");
        assert_eq!(
            RemoteClient::endpoint(CollectionKind::CashMovements),
            "/cash-movements/"
        );
    }
}
