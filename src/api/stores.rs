//! Store list fetching.

use serde::Deserialize;

use super::{client::ApiClient, error::ApiError};
use crate::models::Store;

/// `GET /stores` answers either a bare array or an envelope with an
/// `objects` field; both shapes are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoresResponse {
    Envelope {
        objects: Vec<Store>,
        #[serde(default)]
        #[allow(dead_code)]
        total: Option<u64>,
    },
    Bare(Vec<Store>),
}

impl StoresResponse {
    fn into_stores(self) -> Vec<Store> {
        match self {
            StoresResponse::Envelope { objects, .. } => objects,
            StoresResponse::Bare(stores) => stores,
        }
    }
}

/// Fetch the list of upload destinations.
pub async fn list_stores(client: &ApiClient) -> Result<Vec<Store>, ApiError> {
    let resp = client.get("/stores").send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }
    let stores = resp.json::<StoresResponse>().await?.into_stores();
    tracing::info!("store list loaded: {} stores", stores.len());
    Ok(stores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape_unwraps_objects() {
        let resp: StoresResponse = serde_json::from_value(serde_json::json!({
            "objects": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}],
            "total": 2
        }))
        .unwrap();
        let stores = resp.into_stores();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].id, 1);
        assert_eq!(stores[1].name, "B");
    }

    #[test]
    fn bare_array_shape_parses() {
        let resp: StoresResponse =
            serde_json::from_value(serde_json::json!([{"id": 7, "name": "Main"}])).unwrap();
        let stores = resp.into_stores();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].id, 7);
    }
}
