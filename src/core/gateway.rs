//! Active-query gateway
//!
//! The backend keeps at most one "active query" snapshot per user: the
//! last run query with its type, standard date range and result envelope,
//! so a consultation can be restored on revisit. Everything here is
//! best-effort at the engine boundary: a failed save or load never
//! affects the in-memory result the user is already looking at.

use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::result::QueryResult;

/// The backend-durable snapshot of the last run query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveQuerySnapshot {
    pub query_type: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub results_data: QueryResult,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no se pudo inicializar el cliente HTTP: {0}")]
    Client(String),

    #[error("error de red en {endpoint}: {source}")]
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
}

/// Persistence seam for the active query
pub trait ActiveQueryGateway {
    /// The current snapshot, if any. Absence is not an error.
    fn load(&self) -> Result<Option<ActiveQuerySnapshot>, GatewayError>;

    /// Upsert the snapshot. Implementations retry once before giving up.
    fn save(&self, snapshot: &ActiveQuerySnapshot) -> Result<(), GatewayError>;

    /// Clear the stored snapshot
    fn clear(&self) -> Result<(), GatewayError>;
}

/// HTTP implementation against the backend's `/user-queries/` endpoints
pub struct HttpGateway {
    base: String,
    token: Option<String>,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct StoredQuery {
    id: i64,
}

impl HttpGateway {
    pub fn new(base: impl Into<String>, token: Option<String>) -> Result<Self, GatewayError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    fn request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
    ) -> reqwest::blocking::RequestBuilder {
        let url = format!("{}{}", self.base, endpoint);
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Find the id of the stored query for this type, if one exists
    fn find_existing(&self, query_type: &str) -> Result<Option<i64>, GatewayError> {
        let endpoint = format!("/user-queries/?query_type={}", query_type);
        let response = self
            .request(reqwest::Method::GET, &endpoint)
            .send()
            .map_err(|source| GatewayError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(GatewayError::Status {
                endpoint,
                status: response.status(),
            });
        }
        let body: serde_json::Value =
            response.json().map_err(|source| GatewayError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        let items = crate::core::remote::extract_items(body).unwrap_or_default();
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<StoredQuery>(item).ok())
            .map(|stored| stored.id)
            .next())
    }

    fn upsert(&self, snapshot: &ActiveQuerySnapshot) -> Result<(), GatewayError> {
        let (method, endpoint) = match self.find_existing(&snapshot.query_type)? {
            Some(id) => (reqwest::Method::PATCH, format!("/user-queries/{}/", id)),
            None => (reqwest::Method::POST, "/user-queries/".to_string()),
        };
        let response = self
            .request(method, &endpoint)
            .json(snapshot)
            .send()
            .map_err(|source| GatewayError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(GatewayError::Status {
                endpoint,
                status: response.status(),
            });
        }
        Ok(())
    }
}

impl ActiveQueryGateway for HttpGateway {
    fn load(&self) -> Result<Option<ActiveQuerySnapshot>, GatewayError> {
        let endpoint = "/user-queries/active_query/";
        let response = self
            .request(reqwest::Method::GET, endpoint)
            .send()
            .map_err(|source| GatewayError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;
        // No stored snapshot for this user
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status: response.status(),
            });
        }
        let snapshot = response
            .json::<ActiveQuerySnapshot>()
            .map_err(|source| GatewayError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &ActiveQuerySnapshot) -> Result<(), GatewayError> {
        match self.upsert(snapshot) {
            Ok(()) => Ok(()),
            Err(first) => {
                // Retry once, then give up; callers log, users never see it
                tracing::warn!(error = %first, "fallo guardando la consulta activa, reintentando");
                self.upsert(snapshot)
            }
        }
    }

    fn clear(&self) -> Result<(), GatewayError> {
        let endpoint = "/user-queries/clear_active_query/";
        let response = self
            .request(reqwest::Method::POST, endpoint)
            .send()
            .map_err(|source| GatewayError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status: response.status(),
            });
        }
        Ok(())
    }
}

/// In-memory gateway for tests
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: RefCell<Option<ActiveQuerySnapshot>>,
    saves: RefCell<usize>,
}

impl MemoryGateway {
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl ActiveQueryGateway for MemoryGateway {
    fn load(&self) -> Result<Option<ActiveQuerySnapshot>, GatewayError> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, snapshot: &ActiveQuerySnapshot) -> Result<(), GatewayError> {
        *self.saves.borrow_mut() += 1;
        *self.state.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), GatewayError> {
        *self.state.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::result::{QueryResult, SummaryValue};

    fn snapshot() -> ActiveQuerySnapshot {
        let mut result = QueryResult::new("Reporte de Ventas");
        result.summary_entry("totalSales", SummaryValue::Count(1));
        ActiveQuerySnapshot {
            query_type: "ventas".to_string(),
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-06-30".to_string()),
            results_data: result,
        }
    }

    #[test]
    fn test_memory_gateway_round_trip() {
        let gateway = MemoryGateway::default();
        assert!(gateway.load().unwrap().is_none());

        gateway.save(&snapshot()).unwrap();
        let loaded = gateway.load().unwrap().unwrap();
        assert_eq!(loaded.query_type, "ventas");
        assert_eq!(loaded.results_data.title, "Reporte de Ventas");

        gateway.clear().unwrap();
        assert!(gateway.load().unwrap().is_none());
    }

    #[test]
    fn test_snapshot_serialization_shape() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(json["query_type"], "ventas");
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["results_data"]["summary"]["totalSales"], 1);
    }

    #[test]
    fn test_snapshot_deserializes_without_dates() {
        let snapshot: ActiveQuerySnapshot = serde_json::from_str(
            r#"{"query_type": "stock",
                "results_data": {"title": "Estado del Stock", "summary": {}, "data": []}}"#,
        )
        .unwrap();
        assert!(snapshot.start_date.is_none());
        assert_eq!(snapshot.results_data.title, "Estado del Stock");
    }
}
