// src/common/response.rs

use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Envelope padrão de sucesso: `{ status, data, message?, count?, total_count? }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    #[schema(value_type = String, example = "success")]
    pub status: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
            message: None,
            count: None,
            total_count: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn ok(self) -> (StatusCode, Json<Self>) {
        (StatusCode::OK, Json(self))
    }

    pub fn created(self) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Json(self))
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            count: Some(count),
            ..Envelope::new(data)
        }
    }

    pub fn page(data: Vec<T>, total_count: i64) -> Self {
        Self {
            total_count: Some(total_count),
            ..Envelope::list(data)
        }
    }
}
