pub mod error;
pub mod payloads;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use payloads::{
    AlunoCreate, AlunoUpdate, DisciplinaCreate, DisciplinaUpdate, EnderecoCreate, EnderecoUpdate,
};
