use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Campo inválido '{0}': {1}")]
    Validation(String, String),
}
