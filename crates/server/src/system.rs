//! Service metadata endpoints.

use api_types::system::{Health, ServiceInfo};
use axum::Json;

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "saldo".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
    })
}
