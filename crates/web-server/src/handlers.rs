use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, State},
};
use core_types::{
    AlunoCreate, AlunoUpdate, DisciplinaCreate, DisciplinaUpdate, EnderecoCreate, EnderecoUpdate,
};
use database::{Aluno, AlunoDetalhe, DbError, Disciplina, DisciplinaResumo, Endereco};
use serde::Serialize;
use std::sync::Arc;

/// Response body for every successful create: the generated id plus a
/// human-readable confirmation.
#[derive(Debug, Serialize)]
pub struct CriadoResposta {
    pub id_criado: i32,
    pub mensagem: String,
}

/// Response body for successful updates and deletes.
#[derive(Debug, Serialize)]
pub struct MensagemResposta {
    pub mensagem: String,
}

fn mensagem(texto: impl Into<String>) -> Json<MensagemResposta> {
    Json(MensagemResposta {
        mensagem: texto.into(),
    })
}

// ==============================================================================
// Disciplinas
// ==============================================================================

/// # GET /disciplinas
/// Lists every course as the reduced `{id, disciplina}` projection.
pub async fn listar_disciplinas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DisciplinaResumo>>, AppError> {
    let disciplinas = state.db_repo.listar_disciplinas().await?;
    Ok(Json(disciplinas))
}

/// # GET /disciplina-por-id/:disciplina_id
/// Fetches one course, full fields; an unknown id yields an empty list.
pub async fn consultar_disciplina_por_id(
    Path(disciplina_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Disciplina>>, AppError> {
    let disciplinas = state.db_repo.get_disciplina_por_id(disciplina_id).await?;
    Ok(Json(disciplinas))
}

/// # GET /disciplina-por-semestre/:semestre
pub async fn consultar_disciplinas_por_semestre(
    Path(semestre): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Disciplina>>, AppError> {
    let disciplinas = state.db_repo.get_disciplinas_por_semestre(semestre).await?;
    Ok(Json(disciplinas))
}

/// # POST /inserir-disciplina/
pub async fn inserir_disciplina(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DisciplinaCreate>,
) -> Result<Json<CriadoResposta>, AppError> {
    payload.validar()?;
    let id_criado = state.db_repo.inserir_disciplina(&payload).await?;
    Ok(Json(CriadoResposta {
        id_criado,
        mensagem: "Disciplina cadastrada com sucesso".to_string(),
    }))
}

/// # PUT /atualizar-disciplina/:disciplina_id
/// Partial update: only the fields present in the body are applied.
pub async fn atualizar_disciplina(
    Path(disciplina_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DisciplinaUpdate>,
) -> Result<Json<MensagemResposta>, AppError> {
    payload.validar()?;
    state
        .db_repo
        .atualizar_disciplina(disciplina_id, &payload)
        .await?;
    Ok(mensagem("Disciplina atualizada com sucesso"))
}

/// # DELETE /deletar-disciplina/:disciplina_id
/// Answers 404 with a specific message when the course does not exist.
pub async fn deletar_disciplina(
    Path(disciplina_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MensagemResposta>, AppError> {
    state
        .db_repo
        .deletar_disciplina(disciplina_id)
        .await
        .map_err(|err| match err {
            DbError::NotFound => AppError::NotFound(format!(
                "Disciplina com ID {disciplina_id} não encontrada."
            )),
            other => AppError::Database(other),
        })?;
    Ok(mensagem(format!(
        "Disciplina com ID {disciplina_id} deletada com sucesso"
    )))
}

// ==============================================================================
// Enderecos
// ==============================================================================

/// # GET /enderecos-por-id/:endereco_id
pub async fn consultar_endereco_por_id(
    Path(endereco_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Endereco>>, AppError> {
    let enderecos = state.db_repo.get_endereco_por_id(endereco_id).await?;
    Ok(Json(enderecos))
}

/// # GET /enderecos-por-estado/:estado
/// Case-insensitive exact match on the state field.
pub async fn consultar_enderecos_por_estado(
    Path(estado): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Endereco>>, AppError> {
    let enderecos = state.db_repo.get_enderecos_por_estado(&estado).await?;
    Ok(Json(enderecos))
}

/// # POST /inserir-endereco/
pub async fn inserir_endereco(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnderecoCreate>,
) -> Result<Json<CriadoResposta>, AppError> {
    payload.validar()?;
    let id_criado = state.db_repo.inserir_endereco(&payload).await?;
    Ok(Json(CriadoResposta {
        id_criado,
        mensagem: "Endereço cadastrado com sucesso".to_string(),
    }))
}

/// # PUT /atualizar-enderecos/:endereco_id
pub async fn atualizar_endereco(
    Path(endereco_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnderecoUpdate>,
) -> Result<Json<MensagemResposta>, AppError> {
    payload.validar()?;
    state.db_repo.atualizar_endereco(endereco_id, &payload).await?;
    Ok(mensagem("Endereço atualizado com sucesso"))
}

// ==============================================================================
// Alunos
// ==============================================================================

/// # GET /consultar-alunos
pub async fn consultar_alunos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Aluno>>, AppError> {
    let alunos = state.db_repo.listar_alunos().await?;
    Ok(Json(alunos))
}

/// # GET /aluno-por-id/:aluno_id
pub async fn consultar_aluno_por_id(
    Path(aluno_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Aluno>>, AppError> {
    let alunos = state.db_repo.get_aluno_por_id(aluno_id).await?;
    Ok(Json(alunos))
}

/// # GET /alunos-por-nome/:nome
/// Case-insensitive substring search; no match yields an empty list.
pub async fn consultar_alunos_por_nome(
    Path(nome): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Aluno>>, AppError> {
    let alunos = state.db_repo.get_alunos_por_nome(&nome).await?;
    Ok(Json(alunos))
}

/// # POST /inserir-aluno/
/// Runs the enrollment workflow: validates the payload, then creates the
/// student with its address and one grade row per course, transactionally.
pub async fn inserir_aluno(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AlunoCreate>,
) -> Result<Json<CriadoResposta>, AppError> {
    payload.validar()?;
    let id_criado = state.db_repo.matricular_aluno(&payload).await?;
    Ok(Json(CriadoResposta {
        id_criado,
        mensagem: "Aluno cadastrado com sucesso".to_string(),
    }))
}

/// # PUT /atualizar-aluno/:aluno_id
pub async fn atualizar_aluno(
    Path(aluno_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AlunoUpdate>,
) -> Result<Json<MensagemResposta>, AppError> {
    payload.validar()?;
    state.db_repo.atualizar_aluno(aluno_id, &payload).await?;
    Ok(mensagem("Aluno atualizado com sucesso"))
}

/// # DELETE /deletar-alunos/:aluno_id
/// The schema cascades the delete to the student's grade rows.
pub async fn deletar_aluno(
    Path(aluno_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MensagemResposta>, AppError> {
    state
        .db_repo
        .deletar_aluno(aluno_id)
        .await
        .map_err(|err| match err {
            DbError::NotFound => {
                AppError::NotFound(format!("Aluno com ID {aluno_id} não encontrado."))
            }
            other => AppError::Database(other),
        })?;
    Ok(mensagem(format!(
        "Aluno com ID {aluno_id} deletado com sucesso"
    )))
}

/// # GET /aluno-detalhe-por-nome/:nome
/// The detail aggregation: students matching the name substring, each with
/// its address and course-grade list.
pub async fn detalhar_alunos_por_nome(
    Path(nome): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlunoDetalhe>>, AppError> {
    let detalhes = state.db_repo.detalhar_alunos_por_nome(&nome).await?;
    Ok(Json(detalhes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resposta_de_criacao_serializa_id_e_mensagem() {
        let resposta = CriadoResposta {
            id_criado: 12,
            mensagem: "Aluno cadastrado com sucesso".to_string(),
        };
        let json = serde_json::to_value(&resposta).unwrap();
        assert_eq!(json["id_criado"], 12);
        assert_eq!(json["mensagem"], "Aluno cadastrado com sucesso");
    }

    #[test]
    fn resposta_de_mensagem_tem_somente_o_campo_mensagem() {
        let json = serde_json::to_value(&MensagemResposta {
            mensagem: "Aluno atualizado com sucesso".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "mensagem": "Aluno atualizado com sucesso" })
        );
    }
}
