// src/db/supplier_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{map_constraint_error, SupplierRepository};
use crate::{
    common::error::AppError,
    models::{
        material::ActiveFilter,
        supplier::{NewSupplier, Supplier, SupplierChanges, SupplierFilter},
    },
};

// `material_count` é agregado na leitura, nunca guardado na tabela.
const SELECT_SUPPLIER: &str = r#"
    SELECT s.id, s.code, s.name, s.email, s.phone, s.address, s.active,
           (SELECT COUNT(*) FROM materials m WHERE m.supplier_id = s.id) AS material_count,
           s.created_at, s.updated_at
    FROM suppliers s
"#;

#[derive(Clone)]
pub struct PgSupplierRepository {
    pool: PgPool,
}

impl PgSupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Escapa curingas do LIKE para que o filtro seja um "contém" literal.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl SupplierRepository for PgSupplierRepository {
    async fn list(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_SUPPLIER);
        qb.push(" WHERE TRUE");

        if let ActiveFilter::Only(active) = filter.active {
            qb.push(" AND s.active = ").push_bind(active);
        }
        if let Some(name) = &filter.name_contains {
            qb.push(" AND s.name ILIKE ").push_bind(like_pattern(name));
        }
        if let Some(code) = &filter.code_contains {
            qb.push(" AND s.code ILIKE ").push_bind(like_pattern(code));
        }
        qb.push(" ORDER BY s.id ASC");

        let suppliers = qb
            .build_query_as::<Supplier>()
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Supplier>, AppError> {
        let sql = format!("{SELECT_SUPPLIER} WHERE s.id = $1");
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, supplier: &NewSupplier) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (code, name, email, phone, address, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, code, name, email, phone, address, active,
                      0::BIGINT AS material_count, created_at, updated_at
            "#,
        )
        .bind(&supplier.code)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                &[
                    ("suppliers_code_key", "code", supplier.code.as_str()),
                    ("suppliers_name_key", "name", supplier.name.as_str()),
                ],
                None,
            )
        })
    }

    async fn update(&self, id: i64, changes: &SupplierChanges) -> Result<Option<Supplier>, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers s SET
                code       = COALESCE($2, code),
                name       = COALESCE($3, name),
                email      = COALESCE($4, email),
                phone      = COALESCE($5, phone),
                address    = COALESCE($6, address),
                active     = COALESCE($7, active),
                updated_at = NOW()
            WHERE s.id = $1
            RETURNING s.id, s.code, s.name, s.email, s.phone, s.address, s.active,
                      (SELECT COUNT(*) FROM materials m WHERE m.supplier_id = s.id) AS material_count,
                      s.created_at, s.updated_at
            "#,
        )
        .bind(id)
        .bind(changes.code.as_deref())
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.address.as_deref())
        .bind(changes.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                &[
                    ("suppliers_code_key", "code", changes.code.as_deref().unwrap_or_default()),
                    ("suppliers_name_key", "name", changes.name.as_deref().unwrap_or_default()),
                ],
                None,
            )
        })
    }

    async fn delete(&self, id: i64) -> Result<Option<Supplier>, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            DELETE FROM suppliers WHERE id = $1
            RETURNING id, code, name, email, phone, address, active,
                      0::BIGINT AS material_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            // Um material inserido entre a contagem e o DELETE cai na FK (RESTRICT)
            map_constraint_error(e, &[], Some(AppError::SupplierHasMaterials(1)))
        })
    }
}
