//! `PostgreSQL` implementation of the `DocumentRepository` trait.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

use trivia_core::error::DomainError;
use trivia_core::id::{Collection, RecordId};
use trivia_core::repository::{DocumentRepository, Filter, StoredDocument};

/// PostgreSQL-backed document repository.
#[derive(Debug, Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    /// Creates a new `PgDocumentRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("database error: {err}"))
}

/// Appends the SQL predicate for `filter` to `query`.
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Id(id) => {
            query.push("id = ").push_bind(id.as_uuid());
        }
        Filter::Eq(field, value) => {
            query
                .push("(body -> ")
                .push_bind(field.clone())
                .push(") = ")
                .push_bind(Json(value.clone()));
        }
        Filter::NotIn(field, values) => {
            query
                .push("((body -> ")
                .push_bind(field.clone())
                .push(") IS NULL OR NOT (")
                .push_bind(Json(Value::Array(values.clone())))
                .push(" @> jsonb_build_array(body -> ")
                .push_bind(field.clone())
                .push(")))");
        }
        Filter::ContainsAll(field, values) => {
            query
                .push("jsonb_typeof(body -> ")
                .push_bind(field.clone())
                .push(") = 'array' AND (body -> ")
                .push_bind(field.clone())
                .push(") @> ")
                .push_bind(Json(Value::Array(values.clone())));
        }
        Filter::Matches(body) => {
            query.push("body = ").push_bind(Json(body.clone()));
        }
        Filter::And(filters) => {
            if filters.is_empty() {
                query.push("TRUE");
                return;
            }
            for (i, inner) in filters.iter().enumerate() {
                if i > 0 {
                    query.push(" AND ");
                }
                query.push("(");
                push_filter(query, inner);
                query.push(")");
            }
        }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, body FROM documents WHERE collection = ",
        );
        query.push_bind(collection.as_str()).push(" AND (");
        push_filter(&mut query, filter);
        query.push(") ORDER BY seq");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        debug!(%collection, rows = rows.len(), "Loaded documents");

        rows.iter()
            .map(|row| {
                let id: Uuid = row.try_get("id").map_err(infrastructure)?;
                let Json(body): Json<Value> = row.try_get("body").map_err(infrastructure)?;
                Ok(StoredDocument {
                    id: RecordId::from(id),
                    body,
                })
            })
            .collect()
    }

    async fn insert_one(
        &self,
        collection: Collection,
        body: Value,
    ) -> Result<RecordId, DomainError> {
        let id = RecordId::new();
        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(collection.as_str())
            .bind(Json(body))
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        debug!(%collection, %id, "Inserted document");
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: RecordId,
        body: Value,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id.as_uuid())
            .bind(Json(body))
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::RecordNotFound { collection, id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sql_for(filter: &Filter) -> String {
        let mut query = QueryBuilder::<Postgres>::new("");
        push_filter(&mut query, filter);
        query.sql().to_owned()
    }

    #[test]
    fn test_eq_filter_compares_jsonb_field() {
        assert_eq!(sql_for(&Filter::eq("name", "Ann")), "(body -> $1) = $2");
    }

    #[test]
    fn test_and_filter_wraps_each_clause() {
        let filter = Filter::And(vec![
            Filter::eq("is_finished", false),
            Filter::Id(RecordId::new()),
        ]);

        assert_eq!(sql_for(&filter), "((body -> $1) = $2) AND (id = $3)");
    }

    #[test]
    fn test_empty_and_matches_everything() {
        assert_eq!(sql_for(&Filter::And(Vec::new())), "TRUE");
    }

    #[test]
    fn test_not_in_accepts_missing_field() {
        let sql = sql_for(&Filter::NotIn("question_code".into(), vec![json!("aa")]));

        assert!(sql.starts_with("((body -> $1) IS NULL OR NOT ($2 @> "));
    }
}
