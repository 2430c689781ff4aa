// src/handlers/rpc.rs
//
// Superfície JSON-RPC (estilo Odoo): um POST por recurso, a operação vem em
// `params.operation`. Reaproveita os mesmos serviços das rotas REST; a resposta
// é sempre HTTP 200 e o sucesso/erro vai dentro de `result`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    config::AppState,
    handlers::materials::{json_body, path_id},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        material::{MaterialListParams, MaterialPayload},
        supplier::{SupplierGetParams, SupplierListParams, SupplierPayload},
    },
    services::validation,
};

const COLLECTION_OPERATIONS: &str = "\"list\" or \"create\"";
const RECORD_OPERATIONS: &str = "\"get\", \"update\", or \"delete\"";

#[derive(Debug, Deserialize, ToSchema)]
pub struct RpcRequest {
    #[schema(example = "2.0")]
    pub jsonrpc: Option<String>,
    #[schema(example = "call")]
    pub method: Option<String>,
    /// `operation` + campos/filtros da operação
    #[serde(default)]
    #[schema(value_type = Object)]
    pub params: Value,
    #[schema(value_type = Option<Object>)]
    pub id: Option<Value>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct RpcResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RpcResponse {
    #[schema(value_type = String, example = "2.0")]
    pub jsonrpc: &'static str,
    #[schema(value_type = Option<Object>)]
    pub id: Value,
    pub result: RpcResult,
}

impl RpcResult {
    fn ok(data: impl Serialize) -> Result<Self, AppError> {
        let data = serde_json::to_value(data).map_err(|e| AppError::InternalServerError(e.into()))?;
        Ok(Self {
            success: true,
            data: Some(data),
            ..Default::default()
        })
    }

    fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

// Requisição já desmontada: id de correlação + params como objeto.
struct Call {
    id: Value,
    params: Map<String, Value>,
}

impl Call {
    fn parse(payload: Result<Json<RpcRequest>, JsonRejection>) -> Result<Self, (Value, AppError)> {
        let request = json_body(payload).map_err(|e| (Value::Null, e))?;
        if request.jsonrpc.as_deref() != Some("2.0") || request.method.as_deref() != Some("call") {
            // Tolerado: só `params` importa
            tracing::debug!(jsonrpc = ?request.jsonrpc, method = ?request.method, "envelope JSON-RPC fora do padrão");
        }
        let id = request.id.unwrap_or(Value::Null);
        let params = match request.params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let err = AppError::MalformedJson(format!("params must be an object, got {other}"));
                return Err((id, err));
            }
        };
        Ok(Self { id, params })
    }

    fn operation<'a>(&'a self, default: &'a str) -> &'a str {
        self.params
            .get("operation")
            .and_then(Value::as_str)
            .unwrap_or(default)
    }

    // Os mesmos structs das rotas REST; `operation` e chaves extras são ignoradas.
    fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|e| AppError::MalformedJson(e.to_string()))
    }
}

// Erros viram `success: false` com a mensagem já traduzida; o HTTP continua 200.
fn respond(id: Value, outcome: Result<RpcResult, AppError>, locale: &Locale, i18n: &I18nStore) -> Json<RpcResponse> {
    let result = outcome.unwrap_or_else(|err| {
        let api = err.to_api_error(locale, i18n);
        RpcResult {
            success: false,
            error: Some(api.error),
            details: api.details,
            ..Default::default()
        }
    });

    Json(RpcResponse {
        jsonrpc: "2.0",
        id,
        result,
    })
}

fn invalid_operation(operation: &str, allowed: &'static str) -> AppError {
    AppError::InvalidOperation {
        operation: operation.to_string(),
        allowed,
    }
}

// ---
// Despacho por operação
// ---

async fn dispatch_materials(app_state: &AppState, locale: &Locale, call: &Call) -> Result<RpcResult, AppError> {
    let service = &app_state.material_service;

    match call.operation("list") {
        "list" => {
            let page = service.list(&call.decode::<MaterialListParams>()?).await?;
            let count = page.items.len();
            let mut result = RpcResult::ok(page.items)?;
            result.count = Some(count);
            result.total_count = Some(page.total_count);
            Ok(result)
        }
        "create" => {
            let material = service.create(&call.decode::<MaterialPayload>()?).await?;
            let message = app_state.i18n_store.translate(&locale.0, "success.material_created", &[]);
            Ok(RpcResult::ok(material)?.with_message(message))
        }
        other => Err(invalid_operation(other, COLLECTION_OPERATIONS)),
    }
}

async fn dispatch_material(app_state: &AppState, locale: &Locale, call: &Call, id: i64) -> Result<RpcResult, AppError> {
    let service = &app_state.material_service;
    let i18n = &app_state.i18n_store;

    match call.operation("get") {
        "get" => RpcResult::ok(service.get(id).await?),
        "update" => {
            let material = service.update(id, &call.decode::<MaterialPayload>()?).await?;
            let message = i18n.translate(&locale.0, "success.material_updated", &[]);
            Ok(RpcResult::ok(material)?.with_message(message))
        }
        "delete" => {
            let material = service.delete(id).await?;
            let message = i18n.translate(&locale.0, "success.material_deleted", &[("name", material.name.clone())]);
            Ok(RpcResult::ok(material)?.with_message(message))
        }
        other => Err(invalid_operation(other, RECORD_OPERATIONS)),
    }
}

async fn dispatch_suppliers(app_state: &AppState, locale: &Locale, call: &Call) -> Result<RpcResult, AppError> {
    let service = &app_state.supplier_service;

    match call.operation("list") {
        "list" => {
            let suppliers = service.list(&call.decode::<SupplierListParams>()?).await?;
            let count = suppliers.len();
            let mut result = RpcResult::ok(suppliers)?;
            result.count = Some(count);
            Ok(result)
        }
        "create" => {
            let supplier = service.create(&call.decode::<SupplierPayload>()?).await?;
            let message = app_state.i18n_store.translate(&locale.0, "success.supplier_created", &[]);
            Ok(RpcResult::ok(supplier)?.with_message(message))
        }
        other => Err(invalid_operation(other, COLLECTION_OPERATIONS)),
    }
}

async fn dispatch_supplier(app_state: &AppState, locale: &Locale, call: &Call, id: i64) -> Result<RpcResult, AppError> {
    let service = &app_state.supplier_service;
    let i18n = &app_state.i18n_store;

    match call.operation("get") {
        "get" => {
            let params = call.decode::<SupplierGetParams>()?;
            RpcResult::ok(service.get(id, validation::include_materials(&params)).await?)
        }
        "update" => {
            let supplier = service.update(id, &call.decode::<SupplierPayload>()?).await?;
            let message = i18n.translate(&locale.0, "success.supplier_updated", &[]);
            Ok(RpcResult::ok(supplier)?.with_message(message))
        }
        "delete" => {
            let supplier = service.delete(id).await?;
            let message = i18n.translate(&locale.0, "success.supplier_deleted", &[("name", supplier.name.clone())]);
            Ok(RpcResult::ok(supplier)?.with_message(message))
        }
        other => Err(invalid_operation(other, RECORD_OPERATIONS)),
    }
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/jsonrpc/materials",
    tag = "JSON-RPC",
    security(("api_jwt" = [])),
    request_body = RpcRequest,
    responses((status = 200, description = "operation: list (padrão) | create", body = RpcResponse))
)]
pub async fn materials_rpc(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    payload: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<RpcResponse> {
    let (rpc_id, outcome) = match Call::parse(payload) {
        Ok(call) => {
            tracing::debug!(user = %user.0.id, operation = call.operation("list"), "jsonrpc materials");
            let outcome = dispatch_materials(&app_state, &locale, &call).await;
            (call.id, outcome)
        }
        Err((rpc_id, err)) => (rpc_id, Err(err)),
    };
    respond(rpc_id, outcome, &locale, &app_state.i18n_store)
}

#[utoipa::path(
    post,
    path = "/jsonrpc/materials/{id}",
    tag = "JSON-RPC",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do material")),
    request_body = RpcRequest,
    responses((status = 200, description = "operation: get (padrão) | update | delete", body = RpcResponse))
)]
pub async fn material_rpc(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<RpcResponse> {
    let (rpc_id, outcome) = match (Call::parse(payload), path_id(path)) {
        (Ok(call), Ok(id)) => {
            tracing::debug!(user = %user.0.id, operation = call.operation("get"), id, "jsonrpc material");
            let outcome = dispatch_material(&app_state, &locale, &call, id).await;
            (call.id, outcome)
        }
        (Ok(call), Err(err)) => (call.id, Err(err)),
        (Err((rpc_id, err)), _) => (rpc_id, Err(err)),
    };
    respond(rpc_id, outcome, &locale, &app_state.i18n_store)
}

#[utoipa::path(
    post,
    path = "/jsonrpc/suppliers",
    tag = "JSON-RPC",
    security(("api_jwt" = [])),
    request_body = RpcRequest,
    responses((status = 200, description = "operation: list (padrão) | create", body = RpcResponse))
)]
pub async fn suppliers_rpc(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    payload: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<RpcResponse> {
    let (rpc_id, outcome) = match Call::parse(payload) {
        Ok(call) => {
            tracing::debug!(user = %user.0.id, operation = call.operation("list"), "jsonrpc suppliers");
            let outcome = dispatch_suppliers(&app_state, &locale, &call).await;
            (call.id, outcome)
        }
        Err((rpc_id, err)) => (rpc_id, Err(err)),
    };
    respond(rpc_id, outcome, &locale, &app_state.i18n_store)
}

#[utoipa::path(
    post,
    path = "/jsonrpc/suppliers/{id}",
    tag = "JSON-RPC",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do fornecedor")),
    request_body = RpcRequest,
    responses((status = 200, description = "operation: get (padrão) | update | delete", body = RpcResponse))
)]
pub async fn supplier_rpc(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<RpcResponse> {
    let (rpc_id, outcome) = match (Call::parse(payload), path_id(path)) {
        (Ok(call), Ok(id)) => {
            tracing::debug!(user = %user.0.id, operation = call.operation("get"), id, "jsonrpc supplier");
            let outcome = dispatch_supplier(&app_state, &locale, &call, id).await;
            (call.id, outcome)
        }
        (Ok(call), Err(err)) => (call.id, Err(err)),
        (Err((rpc_id, err)), _) => (rpc_id, Err(err)),
    };
    respond(rpc_id, outcome, &locale, &app_state.i18n_store)
}

#[utoipa::path(
    post,
    path = "/jsonrpc/suppliers/{id}/materials",
    tag = "JSON-RPC",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do fornecedor")),
    request_body = RpcRequest,
    responses((status = 200, description = "Materiais do fornecedor", body = RpcResponse))
)]
pub async fn supplier_materials_rpc(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RpcRequest>, JsonRejection>,
) -> Json<RpcResponse> {
    let (rpc_id, outcome) = match (Call::parse(payload), path_id(path)) {
        (Ok(call), Ok(id)) => {
            tracing::debug!(user = %user.0.id, id, "jsonrpc supplier materials");
            let outcome = async {
                let listing = app_state.supplier_service.list_materials_for(id).await?;
                let count = listing.materials.len();
                let mut result = RpcResult::ok(listing)?;
                result.count = Some(count);
                Ok::<_, AppError>(result)
            }
            .await;
            (call.id, outcome)
        }
        (Ok(call), Err(err)) => (call.id, Err(err)),
        (Err((rpc_id, err)), _) => (rpc_id, Err(err)),
    };
    respond(rpc_id, outcome, &locale, &app_state.i18n_store)
}
