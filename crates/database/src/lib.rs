//! # Cadastro Escolar Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database holding the school records.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic. It
//!   provides a clean, abstract API to the rest of the application, hiding
//!   the underlying SQL and database implementation details.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses
//!   a connection pool (`PgPool`) for concurrent database access.
//! - **Transactional enrollment:** The multi-step enrollment workflow
//!   (address resolve, student insert, one grade row per course) runs inside
//!   a single transaction, so a failure partway through never leaves partial
//!   rows behind.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the schema is up-to-date.
//! - `DbRepository`: The main struct that holds the connection pool and provides all
//!   the high-level data access methods (e.g., `matricular_aluno`).
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{
    Aluno, AlunoDetalhe, DbRepository, Disciplina, DisciplinaNota, DisciplinaResumo, Endereco,
    EnderecoResumo, NotaDisciplinaRow,
};
