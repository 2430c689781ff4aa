use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::{collections::BTreeMap, sync::LazyLock};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Catálogo usado quando o erro vira resposta sem passar por um handler
// (ex.: rejeição do middleware de autenticação).
static FALLBACK_I18N: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("JSON malformado: {0}")]
    MalformedJson(String),

    // Segmento de rota que não é um ID válido (ex.: /api/materials/abc)
    #[error("Caminho inválido: {0}")]
    InvalidPath(String),

    #[error("Material {0} não encontrado")]
    MaterialNotFound(i64),

    #[error("Fornecedor {0} não encontrado")]
    SupplierNotFound(i64),

    // Regra de negócio: fornecedor com materiais não pode ser removido
    #[error("Fornecedor possui {0} materiais associados")]
    SupplierHasMaterials(i64),

    #[error("Valor duplicado para {field}: {value}")]
    DuplicateValue { field: &'static str, value: String },

    #[error("Token inválido")]
    InvalidToken,

    #[error("Operação inválida: {operation}")]
    InvalidOperation {
        operation: String,
        allowed: &'static str,
    },

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// O erro pronto para o cliente: status HTTP + mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    /// Fornecedor inexistente referenciado por um material: erro de validação do campo.
    pub fn unknown_supplier(supplier_id: i64) -> Self {
        let mut errors = validator::ValidationErrors::new();
        errors.add("supplier_id", crate::services::validation::supplier_not_found(supplier_id));
        AppError::ValidationError(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedJson(_)
            | AppError::InvalidPath(_)
            | AppError::SupplierHasMaterials(_)
            | AppError::InvalidOperation { .. } => StatusCode::BAD_REQUEST,
            AppError::MaterialNotFound(_) | AppError::SupplierNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateValue { .. } => StatusCode::CONFLICT,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Traduz o erro para o idioma do cliente.
    /// Erros internos só são detalhados no log.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status_code();
        let lang = locale.0.as_str();

        let (error, details) = match &self {
            AppError::ValidationError(errors) => (
                i18n.translate(lang, "error.validation", &[]),
                Some(validation_details(errors, lang, i18n)),
            ),
            AppError::MalformedJson(detail) => (
                i18n.translate(lang, "error.malformed_json", &[("detail", detail.clone())]),
                None,
            ),
            AppError::InvalidPath(detail) => (
                i18n.translate(lang, "error.invalid_path", &[("detail", detail.clone())]),
                None,
            ),
            AppError::MaterialNotFound(_) => (i18n.translate(lang, "error.material_not_found", &[]), None),
            AppError::SupplierNotFound(_) => (i18n.translate(lang, "error.supplier_not_found", &[]), None),
            AppError::SupplierHasMaterials(count) => (
                i18n.translate(lang, "error.supplier_has_materials", &[("count", count.to_string())]),
                None,
            ),
            AppError::DuplicateValue { field, value } => (
                i18n.translate(
                    lang,
                    "error.duplicate_value",
                    &[("field", field.to_string()), ("value", value.clone())],
                ),
                None,
            ),
            AppError::InvalidToken => (i18n.translate(lang, "error.invalid_token", &[]), None),
            AppError::InvalidOperation { operation, allowed } => (
                i18n.translate(
                    lang,
                    "error.invalid_operation",
                    &[("operation", operation.clone()), ("allowed", allowed.to_string())],
                ),
                None,
            ),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", self);
                (i18n.translate(lang, "error.internal", &[]), None)
            }
        };

        ApiError { status, error, details }
    }
}

// Agrupa as mensagens por campo: { "buy_price": ["..."], "type": ["..."] }
fn validation_details(errors: &validator::ValidationErrors, lang: &str, i18n: &I18nStore) -> Value {
    let mut details: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (field, field_errors) in errors.field_errors() {
        let field = field.to_string();
        let messages = field_errors
            .iter()
            .map(|e| {
                let key = format!("field.{}", e.code);
                if !i18n.has(&key) {
                    return e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                }

                let mut params = vec![("field", field.clone())];
                for (name, value) in &e.params {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    params.push((&**name, value));
                }
                i18n.translate(lang, &key, &params)
            })
            .collect();
        details.insert(field, messages);
    }

    let map: Map<String, Value> = details
        .into_iter()
        .map(|(field, msgs)| (field, json!(msgs)))
        .collect();
    Value::Object(map)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "status": "error",
            "error": self.error,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &FALLBACK_I18N).into_response()
    }
}
