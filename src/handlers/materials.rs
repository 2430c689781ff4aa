// src/handlers/materials.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::material::{Material, MaterialListParams, MaterialPayload},
};

/// Corpo JSON inválido vira 400 no idioma do cliente, em vez da rejeição padrão do axum.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::MalformedJson(rejection.body_text()))
}

/// ID de rota que não é um inteiro também vira 400 no envelope de erro.
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|rejection| match rejection {
        PathRejection::FailedToDeserializePathParams(inner) => {
            AppError::InvalidPath(inner.kind().to_string())
        }
        other => AppError::InvalidPath(other.body_text()),
    })
}

// ---
// Handler: list_materials
// ---
#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Materials",
    security(("api_jwt" = [])),
    params(MaterialListParams),
    responses(
        (status = 200, description = "Materiais filtrados e paginados", body = Envelope<Vec<Material>>),
        (status = 400, description = "Filtro inválido"),
        (status = 401, description = "Token ausente ou inválido")
    )
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<MaterialListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .material_service
        .list(&params)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Envelope::page(page.items, page.total_count).ok())
}

// ---
// Handler: get_material
// ---
#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    tag = "Materials",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do material")),
    responses(
        (status = 200, description = "Material encontrado", body = Envelope<Material>),
        (status = 404, description = "Material não encontrado")
    )
)]
pub async fn get_material(
    State(app_state): State<AppState>,
    locale: Locale,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = path_id(path).map_err(to_api)?;
    let material = app_state.material_service.get(id).await.map_err(to_api)?;

    Ok(Envelope::new(material).ok())
}

// ---
// Handler: create_material
// ---
#[utoipa::path(
    post,
    path = "/api/materials",
    tag = "Materials",
    security(("api_jwt" = [])),
    request_body = MaterialPayload,
    responses(
        (status = 201, description = "Material criado", body = Envelope<Material>),
        (status = 400, description = "Erro de validação (todas as violações por campo)"),
        (status = 409, description = "Código já existe")
    )
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    payload: Result<Json<MaterialPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let payload = json_body(payload).map_err(to_api)?;
    let material = app_state
        .material_service
        .create(&payload)
        .await
        .map_err(to_api)?;

    tracing::debug!(user = %user.0.id, id = material.id, "create_material");
    let message = app_state.i18n_store.translate(&locale.0, "success.material_created", &[]);
    Ok(Envelope::new(material).with_message(message).created())
}

// ---
// Handler: update_material (merge parcial)
// ---
#[utoipa::path(
    put,
    path = "/api/materials/{id}",
    tag = "Materials",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do material")),
    request_body = MaterialPayload,
    responses(
        (status = 200, description = "Material atualizado", body = Envelope<Material>),
        (status = 400, description = "Erro de validação"),
        (status = 404, description = "Material não encontrado"),
        (status = 409, description = "Código já existe")
    )
)]
pub async fn update_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MaterialPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = path_id(path).map_err(to_api)?;
    let payload = json_body(payload).map_err(to_api)?;
    let material = app_state
        .material_service
        .update(id, &payload)
        .await
        .map_err(to_api)?;

    tracing::debug!(user = %user.0.id, id, "update_material");
    let message = app_state.i18n_store.translate(&locale.0, "success.material_updated", &[]);
    Ok(Envelope::new(material).with_message(message).ok())
}

// ---
// Handler: delete_material
// ---
#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    tag = "Materials",
    security(("api_jwt" = [])),
    params(("id" = i64, Path, description = "ID do material")),
    responses(
        (status = 200, description = "Material removido (retorna o registro removido)", body = Envelope<Material>),
        (status = 404, description = "Material não encontrado")
    )
)]
pub async fn delete_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = path_id(path).map_err(to_api)?;
    let deleted = app_state.material_service.delete(id).await.map_err(to_api)?;

    tracing::debug!(user = %user.0.id, id, "delete_material");
    let message = app_state.i18n_store.translate(
        &locale.0,
        "success.material_deleted",
        &[("name", deleted.name.clone())],
    );
    Ok(Envelope::new(deleted).with_message(message).ok())
}
