//! Postgres backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{DocumentStore, StoreError};
use crate::document::models::{
    DocumentStatus, GeneratedDocument, NewGeneratedDocument, StatusPatch,
};
use crate::template::models::{
    Clause, DocumentType, NewClause, NewDocumentType, NewTemplate, Template,
};
use crate::variables::Variables;

const TEMPLATE_COLUMNS: &str = "id, type_id, name, version, title, content, variables, active, is_default, created_at, updated_at";
const CLAUSE_COLUMNS: &str =
    "id, template_id, clause_number, title, content, order_index, required, variables, created_at";
const DOCUMENT_COLUMNS: &str = "id, template_id, rental_id, document_number, resolved_data, rendered_url, status, external_signature_ref, signed_at, expires_at, scope_id, created_by, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    template_id: Uuid,
    rental_id: Option<String>,
    document_number: String,
    resolved_data: Json<Variables>,
    rendered_url: Option<String>,
    status: String,
    external_signature_ref: Option<String>,
    signed_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    scope_id: String,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for GeneratedDocument {
    type Error = StoreError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<DocumentStatus>().map_err(StoreError::Corrupt)?;
        Ok(GeneratedDocument {
            id: row.id,
            template_id: row.template_id,
            rental_id: row.rental_id,
            document_number: row.document_number,
            resolved_data: row.resolved_data.0,
            rendered_url: row.rendered_url,
            status,
            external_signature_ref: row.external_signature_ref,
            signed_at: row.signed_at,
            expires_at: row.expires_at,
            scope_id: row.scope_id,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_document(row: Option<DocumentRow>) -> Result<Option<GeneratedDocument>, StoreError> {
    row.map(GeneratedDocument::try_from).transpose()
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and applies pending migrations.
    pub async fn from_pool(pool: PgPool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Document store migrations applied");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn list_document_types(&self) -> Result<Vec<DocumentType>, StoreError> {
        let types = sqlx::query_as::<_, DocumentType>(
            "SELECT id, name, category, active, created_at FROM document_types WHERE active ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    async fn find_document_type(&self, id: &Uuid) -> Result<Option<DocumentType>, StoreError> {
        let found = sqlx::query_as::<_, DocumentType>(
            "SELECT id, name, category, active, created_at FROM document_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn insert_document_type(
        &self,
        new: &NewDocumentType,
    ) -> Result<DocumentType, StoreError> {
        let created = sqlx::query_as::<_, DocumentType>(
            r#"
            INSERT INTO document_types (name, category)
            VALUES ($1, $2)
            RETURNING id, name, category, active, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.category)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_templates(&self) -> Result<Vec<Template>, StoreError> {
        let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM document_templates ORDER BY name");
        Ok(sqlx::query_as::<_, Template>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_templates_by_type(&self, type_id: &Uuid) -> Result<Vec<Template>, StoreError> {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM document_templates WHERE type_id = $1 AND active ORDER BY name"
        );
        Ok(sqlx::query_as::<_, Template>(&sql)
            .bind(type_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_default_template(
        &self,
        category: &str,
    ) -> Result<Option<Template>, StoreError> {
        let sql = format!(
            r#"
            SELECT {TEMPLATE_COLUMNS} FROM document_templates
            WHERE active AND is_default
              AND type_id IN (SELECT id FROM document_types WHERE category = $1 AND active)
            ORDER BY version DESC
            LIMIT 1
            "#
        );
        Ok(sqlx::query_as::<_, Template>(&sql)
            .bind(category)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError> {
        let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM document_templates WHERE name = $1");
        Ok(sqlx::query_as::<_, Template>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_template_by_id(&self, id: &Uuid) -> Result<Option<Template>, StoreError> {
        let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM document_templates WHERE id = $1");
        Ok(sqlx::query_as::<_, Template>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_template(&self, new: &NewTemplate) -> Result<Template, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO document_templates (type_id, name, version, title, content, variables, active, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Template>(&sql)
            .bind(new.type_id)
            .bind(&new.name)
            .bind(new.version)
            .bind(&new.title)
            .bind(&new.content)
            .bind(&new.variables)
            .bind(new.active)
            .bind(new.is_default)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_clauses(&self, template_id: &Uuid) -> Result<Vec<Clause>, StoreError> {
        let sql = format!(
            "SELECT {CLAUSE_COLUMNS} FROM template_clauses WHERE template_id = $1 ORDER BY order_index, clause_number"
        );
        Ok(sqlx::query_as::<_, Clause>(&sql)
            .bind(template_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_clauses(&self, template_id: &Uuid) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM template_clauses WHERE template_id = $1")
                .bind(template_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn insert_clause(&self, new: &NewClause) -> Result<Clause, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO template_clauses (template_id, clause_number, title, content, order_index, required, variables)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLAUSE_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Clause>(&sql)
            .bind(new.template_id)
            .bind(new.clause_number)
            .bind(&new.title)
            .bind(&new.content)
            .bind(new.order_index)
            .bind(new.required)
            .bind(&new.variables)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn insert_document(
        &self,
        new: &NewGeneratedDocument,
    ) -> Result<GeneratedDocument, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO generated_documents
                (template_id, rental_id, document_number, resolved_data, status, expires_at, scope_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(new.template_id)
            .bind(&new.rental_id)
            .bind(&new.document_number)
            .bind(Json(&new.resolved_data))
            .bind(new.status.as_str())
            .bind(new.expires_at)
            .bind(&new.scope_id)
            .bind(&new.created_by)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_document(&self, id: &Uuid) -> Result<Option<GeneratedDocument>, StoreError> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM generated_documents WHERE id = $1");
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        into_document(row)
    }

    async fn find_document_for_rental(
        &self,
        template_id: &Uuid,
        rental_id: &str,
    ) -> Result<Option<GeneratedDocument>, StoreError> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM generated_documents WHERE template_id = $1 AND rental_id = $2"
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(template_id)
            .bind(rental_id)
            .fetch_optional(&self.pool)
            .await?;
        into_document(row)
    }

    async fn list_documents_by_scope(
        &self,
        scope_id: &str,
    ) -> Result<Vec<GeneratedDocument>, StoreError> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM generated_documents WHERE scope_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(scope_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(GeneratedDocument::try_from).collect()
    }

    async fn update_document_status(
        &self,
        id: &Uuid,
        expected: DocumentStatus,
        next: DocumentStatus,
        patch: &StatusPatch,
    ) -> Result<Option<GeneratedDocument>, StoreError> {
        let sql = format!(
            r#"
            UPDATE generated_documents
            SET status = $3,
                external_signature_ref = COALESCE($4, external_signature_ref),
                rendered_url = COALESCE($5, rendered_url),
                signed_at = COALESCE($6, signed_at),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .bind(&patch.external_signature_ref)
            .bind(&patch.rendered_url)
            .bind(patch.signed_at)
            .fetch_optional(&self.pool)
            .await?;
        into_document(row)
    }

    async fn delete_document(&self, id: &Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM generated_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
