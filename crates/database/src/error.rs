use thiserror::Error;

/// The failure taxonomy of the persistence layer.
///
/// The domain variants (`Conflict`, `AddressProcessing`, `StudentCreation`,
/// `InvalidCourseReference`) carry Portuguese display strings because they
/// flow straight into the `mensagem` field of error responses. The
/// infrastructure variants are only ever logged.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfig(String),

    #[error("Erro ao acessar o banco de dados: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Registro não encontrado.")]
    NotFound,

    /// Uniqueness violation, e.g. a duplicate matrícula or CEP.
    #[error("{0}")]
    Conflict(String),

    /// The address lookup/create step of the enrollment workflow failed;
    /// no student row was written.
    #[error("Erro ao processar endereço: {0}")]
    AddressProcessing(String),

    /// The student insert of the enrollment workflow failed for a reason
    /// other than a duplicate matrícula.
    #[error("Erro ao cadastrar aluno: {0}")]
    StudentCreation(String),

    /// A course id supplied at enrollment does not exist; the whole
    /// enrollment was rolled back.
    #[error("Disciplina com ID {0} não encontrada.")]
    InvalidCourseReference(i32),
}
