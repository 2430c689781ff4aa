// src/db/material_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{map_constraint_error, MaterialRepository};
use crate::{
    common::error::AppError,
    models::material::{
        ActiveFilter, Material, MaterialChanges, MaterialFilter, MaterialPage, NewMaterial,
    },
};

// Colunas de leitura: o nome do fornecedor vem sempre do JOIN.
const SELECT_MATERIAL: &str = r#"
    SELECT m.id, m.code, m.name, m.material_type, m.buy_price, m.supplier_id,
           s.name AS supplier_name, m.active, m.created_at, m.updated_at
    FROM materials m
    JOIN suppliers s ON s.id = m.supplier_id
"#;

#[derive(Clone)]
pub struct PgMaterialRepository {
    pool: PgPool,
}

impl PgMaterialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Monta o WHERE a partir do filtro tipado (equivalente ao "domain" do ORM).
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &MaterialFilter) {
    qb.push(" WHERE TRUE");

    if let Some(material_type) = filter.material_type {
        qb.push(" AND m.material_type = ").push_bind(material_type);
    }
    if let Some(supplier_id) = filter.supplier_id {
        qb.push(" AND m.supplier_id = ").push_bind(supplier_id);
    }
    if let ActiveFilter::Only(active) = filter.active {
        qb.push(" AND m.active = ").push_bind(active);
    }
}

#[async_trait]
impl MaterialRepository for PgMaterialRepository {
    async fn list(&self, filter: &MaterialFilter) -> Result<MaterialPage, AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM materials m");
        push_filters(&mut count_qb, filter);
        let total_count: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_MATERIAL);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY m.id ASC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if filter.offset > 0 {
            qb.push(" OFFSET ").push_bind(filter.offset);
        }

        let items = qb
            .build_query_as::<Material>()
            .fetch_all(&self.pool)
            .await?;

        Ok(MaterialPage { items, total_count })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Material>, AppError> {
        let sql = format!("{SELECT_MATERIAL} WHERE m.id = $1");
        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(material)
    }

    async fn create(&self, material: &NewMaterial) -> Result<Material, AppError> {
        sqlx::query_as::<_, Material>(
            r#"
            WITH inserted AS (
                INSERT INTO materials (code, name, material_type, buy_price, supplier_id, active)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.code, i.name, i.material_type, i.buy_price, i.supplier_id,
                   s.name AS supplier_name, i.active, i.created_at, i.updated_at
            FROM inserted i
            JOIN suppliers s ON s.id = i.supplier_id
            "#,
        )
        .bind(&material.code)
        .bind(&material.name)
        .bind(material.material_type)
        .bind(material.buy_price)
        .bind(material.supplier_id)
        .bind(material.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                &[("materials_code_key", "code", material.code.as_str())],
                Some(AppError::unknown_supplier(material.supplier_id)),
            )
        })
    }

    async fn update(&self, id: i64, changes: &MaterialChanges) -> Result<Option<Material>, AppError> {
        // COALESCE mantém o valor atual para os campos não enviados
        sqlx::query_as::<_, Material>(
            r#"
            WITH updated AS (
                UPDATE materials SET
                    code          = COALESCE($2, code),
                    name          = COALESCE($3, name),
                    material_type = COALESCE($4, material_type),
                    buy_price     = COALESCE($5, buy_price),
                    supplier_id   = COALESCE($6, supplier_id),
                    active        = COALESCE($7, active),
                    updated_at    = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT u.id, u.code, u.name, u.material_type, u.buy_price, u.supplier_id,
                   s.name AS supplier_name, u.active, u.created_at, u.updated_at
            FROM updated u
            JOIN suppliers s ON s.id = u.supplier_id
            "#,
        )
        .bind(id)
        .bind(changes.code.as_deref())
        .bind(changes.name.as_deref())
        .bind(changes.material_type)
        .bind(changes.buy_price)
        .bind(changes.supplier_id)
        .bind(changes.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                &[("materials_code_key", "code", changes.code.as_deref().unwrap_or_default())],
                changes.supplier_id.map(AppError::unknown_supplier),
            )
        })
    }

    async fn delete(&self, id: i64) -> Result<Option<Material>, AppError> {
        let material = sqlx::query_as::<_, Material>(
            r#"
            WITH deleted AS (
                DELETE FROM materials WHERE id = $1 RETURNING *
            )
            SELECT d.id, d.code, d.name, d.material_type, d.buy_price, d.supplier_id,
                   s.name AS supplier_name, d.active, d.created_at, d.updated_at
            FROM deleted d
            JOIN suppliers s ON s.id = d.supplier_id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(material)
    }

    async fn count_by_supplier(&self, supplier_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE supplier_id = $1")
            .bind(supplier_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
