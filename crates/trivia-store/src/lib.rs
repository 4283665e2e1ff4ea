//! PostgreSQL persistence for quiz records.
//!
//! Every record is a JSONB document in one `documents` table, tagged with
//! its collection. The schema lives in the workspace `migrations/`
//! directory and is applied through [`MIGRATOR`].

pub mod pg_document_repository;

pub use pg_document_repository::PgDocumentRepository;

/// Migrations for the document table.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
