// src/handlers/suppliers.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        error::{ApiError, AppError},
        response::Envelope,
    },
    config::AppState,
    handlers::materials::{json_body, path_id},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::supplier::{Supplier, SupplierGetParams, SupplierListParams, SupplierMaterials, SupplierPayload},
    services::validation,
};

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    security(("api_jwt" = [])),
    params(SupplierListParams),
    responses(
        (status = 200, description = "Fornecedores filtrados", body = Envelope<Vec<Supplier>>),
        (status = 400, description = "Filtro inválido")
    )
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<SupplierListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = app_state
        .supplier_service
        .list(&params)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Envelope::list(suppliers).ok())
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do fornecedor"), SupplierGetParams),
    responses(
        (status = 200, description = "Fornecedor (com materiais se pedido)", body = Envelope<Supplier>),
        (status = 404, description = "Fornecedor não encontrado")
    )
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    path: Result<Path<i64>, PathRejection>,
    Query(params): Query<SupplierGetParams>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = path_id(path).map_err(to_api)?;
    let supplier = app_state
        .supplier_service
        .get(id, validation::include_materials(&params))
        .await
        .map_err(to_api)?;

    Ok(Envelope::new(supplier).ok())
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    security(("api_jwt" = [])),
    request_body = SupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Envelope<Supplier>),
        (status = 400, description = "Erro de validação"),
        (status = 409, description = "Código ou nome já existe")
    )
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    payload: Result<Json<SupplierPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let payload = json_body(payload).map_err(to_api)?;
    let supplier = app_state
        .supplier_service
        .create(&payload)
        .await
        .map_err(to_api)?;

    tracing::debug!(user = %user.0.id, id = supplier.id, "create_supplier");
    let message = app_state.i18n_store.translate(&locale.0, "success.supplier_created", &[]);
    Ok(Envelope::new(supplier).with_message(message).created())
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do fornecedor")),
    request_body = SupplierPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Envelope<Supplier>),
        (status = 400, description = "Erro de validação"),
        (status = 404, description = "Fornecedor não encontrado"),
        (status = 409, description = "Código ou nome já existe")
    )
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SupplierPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = path_id(path).map_err(to_api)?;
    let payload = json_body(payload).map_err(to_api)?;
    let supplier = app_state
        .supplier_service
        .update(id, &payload)
        .await
        .map_err(to_api)?;

    tracing::debug!(user = %user.0.id, id, "update_supplier");
    let message = app_state.i18n_store.translate(&locale.0, "success.supplier_updated", &[]);
    Ok(Envelope::new(supplier).with_message(message).ok())
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor removido", body = Envelope<Supplier>),
        (status = 400, description = "Fornecedor ainda possui materiais"),
        (status = 404, description = "Fornecedor não encontrado")
    )
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = path_id(path).map_err(to_api)?;
    let deleted = app_state.supplier_service.delete(id).await.map_err(to_api)?;

    tracing::debug!(user = %user.0.id, id, "delete_supplier");
    let message = app_state.i18n_store.translate(
        &locale.0,
        "success.supplier_deleted",
        &[("name", deleted.name.clone())],
    );
    Ok(Envelope::new(deleted).with_message(message).ok())
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}/materials",
    tag = "Suppliers",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Materiais do fornecedor", body = Envelope<SupplierMaterials>),
        (status = 404, description = "Fornecedor não encontrado")
    )
)]
pub async fn list_supplier_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = path_id(path).map_err(to_api)?;
    let listing = app_state
        .supplier_service
        .list_materials_for(id)
        .await
        .map_err(to_api)?;

    let count = listing.materials.len();
    let mut envelope = Envelope::new(listing);
    envelope.count = Some(count);
    Ok(envelope.ok())
}
