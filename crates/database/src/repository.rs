use crate::DbError;
use core_types::{
    AlunoCreate, AlunoUpdate, DisciplinaCreate, DisciplinaUpdate, EnderecoCreate, EnderecoUpdate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::Transaction;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A row from the `alunos` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Aluno {
    pub id: i32,
    pub matricula: String,
    pub nome: String,
    pub email: Option<String>,
    pub nome_mae: Option<String>,
    pub endereco_id: Option<i32>,
}

/// A row from the `enderecos` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Endereco {
    pub id: i32,
    pub cep: String,
    pub endereco: String,
    pub bairro: Option<String>,
    pub cidade: String,
    pub estado: String,
    pub regiao: Option<String>,
}

/// A row from the `disciplinas` table, full fields.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Disciplina {
    pub id: i32,
    pub disciplina: String,
    pub carga: i32,
    pub semestre: i32,
}

/// The reduced `{id, disciplina}` projection returned by `/disciplinas`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DisciplinaResumo {
    pub id: i32,
    pub disciplina: String,
}

/// The address sub-object of the student detail view (no surrogate id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnderecoResumo {
    pub cep: String,
    pub endereco: String,
    pub bairro: Option<String>,
    pub cidade: String,
    pub estado: String,
}

impl From<Endereco> for EnderecoResumo {
    fn from(endereco: Endereco) -> Self {
        Self {
            cep: endereco.cep,
            endereco: endereco.endereco,
            bairro: endereco.bairro,
            cidade: endereco.cidade,
            estado: endereco.estado,
        }
    }
}

/// One course-grade entry in the student detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisciplinaNota {
    pub disciplina_nome: String,
    pub carga: i32,
    pub semestre: i32,
    pub nota: Option<Decimal>,
}

/// A grade row LEFT-JOINed to its course. Every course field is optional
/// because the course may have been deleted since the grade was written.
#[derive(Debug, Clone, FromRow)]
pub struct NotaDisciplinaRow {
    pub nota: Option<Decimal>,
    pub disciplina_nome: Option<String>,
    pub carga: Option<i32>,
    pub semestre: Option<i32>,
}

/// The denormalized per-student view returned by `/aluno-detalhe-por-nome`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlunoDetalhe {
    pub id: i32,
    pub matricula: String,
    pub nome: String,
    pub email: Option<String>,
    pub nome_mae: Option<String>,
    pub endereco: Option<EnderecoResumo>,
    pub matriculas: Vec<DisciplinaNota>,
}

impl AlunoDetalhe {
    /// Assembles one detail entry from already-fetched rows. A grade row
    /// whose course no longer exists is skipped; a student without an
    /// address gets `endereco: null`.
    pub fn montar(
        aluno: Aluno,
        endereco: Option<Endereco>,
        linhas: Vec<NotaDisciplinaRow>,
    ) -> Self {
        let matriculas = linhas.into_iter().filter_map(DisciplinaNota::da_linha).collect();
        Self {
            id: aluno.id,
            matricula: aluno.matricula,
            nome: aluno.nome,
            email: aluno.email,
            nome_mae: aluno.nome_mae,
            endereco: endereco.map(EnderecoResumo::from),
            matriculas,
        }
    }
}

impl DisciplinaNota {
    fn da_linha(linha: NotaDisciplinaRow) -> Option<Self> {
        match (linha.disciplina_nome, linha.carga, linha.semestre) {
            (Some(disciplina_nome), Some(carga), Some(semestre)) => Some(Self {
                disciplina_nome,
                carga,
                semestre,
                nota: linha.nota,
            }),
            // The course behind this grade was deleted; omit the entry.
            _ => None,
        }
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==========================================================================
    // Disciplinas
    // ==========================================================================

    /// Fetches the id + name of every course, for listings and pickers.
    pub async fn listar_disciplinas(&self) -> Result<Vec<DisciplinaResumo>, DbError> {
        let disciplinas = sqlx::query_as::<_, DisciplinaResumo>(
            "SELECT id, disciplina FROM disciplinas ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(disciplinas)
    }

    /// Fetches one course by id, full fields. Returns an empty list (not an
    /// error) when the id does not exist.
    pub async fn get_disciplina_por_id(&self, disciplina_id: i32) -> Result<Vec<Disciplina>, DbError> {
        let disciplinas = sqlx::query_as::<_, Disciplina>(
            "SELECT id, disciplina, carga, semestre FROM disciplinas WHERE id = $1",
        )
        .bind(disciplina_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(disciplinas)
    }

    /// Fetches every course offered in the given semester.
    pub async fn get_disciplinas_por_semestre(&self, semestre: i32) -> Result<Vec<Disciplina>, DbError> {
        let disciplinas = sqlx::query_as::<_, Disciplina>(
            "SELECT id, disciplina, carga, semestre FROM disciplinas WHERE semestre = $1 ORDER BY id ASC",
        )
        .bind(semestre)
        .fetch_all(&self.pool)
        .await?;
        Ok(disciplinas)
    }

    /// Inserts a new course and returns its generated id.
    pub async fn inserir_disciplina(&self, payload: &DisciplinaCreate) -> Result<i32, DbError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO disciplinas (disciplina, carga, semestre) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&payload.disciplina)
        .bind(payload.carga)
        .bind(payload.semestre)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Applies a partial update: fields absent from the payload keep their
    /// stored values (COALESCE against the bound NULLs).
    pub async fn atualizar_disciplina(
        &self,
        disciplina_id: i32,
        payload: &DisciplinaUpdate,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE disciplinas SET
                disciplina = COALESCE($2, disciplina),
                carga      = COALESCE($3, carga),
                semestre   = COALESCE($4, semestre)
            WHERE id = $1
            "#,
        )
        .bind(disciplina_id)
        .bind(payload.disciplina.as_deref())
        .bind(payload.carga)
        .bind(payload.semestre)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes one course. Signals `NotFound` distinctly so the handler can
    /// answer 404; grade rows referencing the course are left in place and
    /// skipped by the detail view.
    pub async fn deletar_disciplina(&self, disciplina_id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM disciplinas WHERE id = $1")
            .bind(disciplina_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    // ==========================================================================
    // Enderecos
    // ==========================================================================

    /// Fetches one address by id, list-shaped (empty when absent).
    pub async fn get_endereco_por_id(&self, endereco_id: i32) -> Result<Vec<Endereco>, DbError> {
        let enderecos = sqlx::query_as::<_, Endereco>(
            "SELECT id, cep, endereco, bairro, cidade, estado, regiao FROM enderecos WHERE id = $1",
        )
        .bind(endereco_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(enderecos)
    }

    /// Fetches every address in a state; the match is case-insensitive exact.
    pub async fn get_enderecos_por_estado(&self, estado: &str) -> Result<Vec<Endereco>, DbError> {
        let enderecos = sqlx::query_as::<_, Endereco>(
            r#"
            SELECT id, cep, endereco, bairro, cidade, estado, regiao
            FROM enderecos
            WHERE LOWER(estado) = LOWER($1)
            ORDER BY id ASC
            "#,
        )
        .bind(estado)
        .fetch_all(&self.pool)
        .await?;
        Ok(enderecos)
    }

    /// Inserts a new address and returns its generated id. A duplicate CEP
    /// is a `Conflict`: addresses are shared by CEP, not duplicated.
    pub async fn inserir_endereco(&self, payload: &EnderecoCreate) -> Result<i32, DbError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO enderecos (cep, endereco, bairro, cidade, estado, regiao)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&payload.cep)
        .bind(&payload.endereco)
        .bind(payload.bairro.as_deref())
        .bind(&payload.cidade)
        .bind(&payload.estado)
        .bind(payload.regiao.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violacao_unicidade(&e) {
                DbError::Conflict(format!("CEP '{}' já cadastrado.", payload.cep))
            } else {
                e.into()
            }
        })?;
        Ok(id)
    }

    /// Partial address update, same COALESCE semantics as the other entities.
    pub async fn atualizar_endereco(
        &self,
        endereco_id: i32,
        payload: &EnderecoUpdate,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE enderecos SET
                cep      = COALESCE($2, cep),
                endereco = COALESCE($3, endereco),
                bairro   = COALESCE($4, bairro),
                cidade   = COALESCE($5, cidade),
                estado   = COALESCE($6, estado),
                regiao   = COALESCE($7, regiao)
            WHERE id = $1
            "#,
        )
        .bind(endereco_id)
        .bind(payload.cep.as_deref())
        .bind(payload.endereco.as_deref())
        .bind(payload.bairro.as_deref())
        .bind(payload.cidade.as_deref())
        .bind(payload.estado.as_deref())
        .bind(payload.regiao.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violacao_unicidade(&e) {
                DbError::Conflict("CEP já cadastrado para outro endereço.".to_string())
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    // ==========================================================================
    // Alunos
    // ==========================================================================

    /// Fetches every student, full fields.
    pub async fn listar_alunos(&self) -> Result<Vec<Aluno>, DbError> {
        let alunos = sqlx::query_as::<_, Aluno>(
            "SELECT id, matricula, nome, email, nome_mae, endereco_id FROM alunos ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(alunos)
    }

    /// Fetches one student by id, list-shaped (empty when absent).
    pub async fn get_aluno_por_id(&self, aluno_id: i32) -> Result<Vec<Aluno>, DbError> {
        let alunos = sqlx::query_as::<_, Aluno>(
            "SELECT id, matricula, nome, email, nome_mae, endereco_id FROM alunos WHERE id = $1",
        )
        .bind(aluno_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(alunos)
    }

    /// Case-insensitive substring search on the student name.
    pub async fn get_alunos_por_nome(&self, nome: &str) -> Result<Vec<Aluno>, DbError> {
        let alunos = sqlx::query_as::<_, Aluno>(
            r#"
            SELECT id, matricula, nome, email, nome_mae, endereco_id
            FROM alunos
            WHERE nome ILIKE '%' || $1 || '%'
            ORDER BY id ASC
            "#,
        )
        .bind(nome)
        .fetch_all(&self.pool)
        .await?;
        Ok(alunos)
    }

    /// The enrollment workflow. Runs as one transaction:
    ///
    /// 1. Get-or-create the address by CEP (race-safe through the unique
    ///    constraint: insert with `ON CONFLICT DO NOTHING`, then select).
    /// 2. Insert the student pointing at the resolved address.
    /// 3. For each course id, verify the course exists and insert one grade
    ///    row with `nota` unset.
    ///
    /// Any failure rolls the whole transaction back: no student, no grade
    /// rows, and no new address survive a partial run. A pre-existing
    /// address is never touched.
    pub async fn matricular_aluno(&self, payload: &AlunoCreate) -> Result<i32, DbError> {
        let mut tx = self.pool.begin().await?;

        let endereco_id = resolver_endereco(&mut tx, &payload.endereco_info).await?;

        let aluno_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO alunos (matricula, nome, email, nome_mae, endereco_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&payload.matricula)
        .bind(&payload.nome)
        .bind(payload.email.as_deref())
        .bind(payload.nome_mae.as_deref())
        .bind(endereco_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if violacao_unicidade(&e) {
                DbError::Conflict(format!("Matrícula '{}' já cadastrada.", payload.matricula))
            } else {
                DbError::StudentCreation(e.to_string())
            }
        })?;

        for &disciplina_id in &payload.disciplinas_ids {
            let existe: Option<i32> = sqlx::query_scalar("SELECT id FROM disciplinas WHERE id = $1")
                .bind(disciplina_id)
                .fetch_optional(&mut *tx)
                .await?;
            if existe.is_none() {
                // Dropping the transaction rolls back the student and every
                // grade row written so far in this call.
                return Err(DbError::InvalidCourseReference(disciplina_id));
            }
            sqlx::query(
                r#"
                INSERT INTO notas (aluno_id, disciplina_id)
                VALUES ($1, $2)
                ON CONFLICT (aluno_id, disciplina_id) DO NOTHING
                "#,
            )
            .bind(aluno_id)
            .bind(disciplina_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(aluno_id, matricula = %payload.matricula, "Aluno matriculado.");
        Ok(aluno_id)
    }

    /// Partial student update; only the fields present in the payload are
    /// applied.
    pub async fn atualizar_aluno(&self, aluno_id: i32, payload: &AlunoUpdate) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE alunos SET
                matricula   = COALESCE($2, matricula),
                nome        = COALESCE($3, nome),
                email       = COALESCE($4, email),
                nome_mae    = COALESCE($5, nome_mae),
                endereco_id = COALESCE($6, endereco_id)
            WHERE id = $1
            "#,
        )
        .bind(aluno_id)
        .bind(payload.matricula.as_deref())
        .bind(payload.nome.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.nome_mae.as_deref())
        .bind(payload.endereco_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violacao_unicidade(&e) {
                DbError::Conflict("Matrícula já cadastrada para outro aluno.".to_string())
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    /// Deletes one student; the schema cascades the delete to its grade
    /// rows. Signals `NotFound` when the id does not exist.
    pub async fn deletar_aluno(&self, aluno_id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM alunos WHERE id = $1")
            .bind(aluno_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// The detail aggregation: every student whose name contains the given
    /// substring, each with its address (if any) and its course-grade list.
    pub async fn detalhar_alunos_por_nome(&self, nome: &str) -> Result<Vec<AlunoDetalhe>, DbError> {
        let alunos = self.get_alunos_por_nome(nome).await?;

        let mut detalhes = Vec::with_capacity(alunos.len());
        for aluno in alunos {
            let endereco = match aluno.endereco_id {
                Some(endereco_id) => {
                    sqlx::query_as::<_, Endereco>(
                        "SELECT id, cep, endereco, bairro, cidade, estado, regiao FROM enderecos WHERE id = $1",
                    )
                    .bind(endereco_id)
                    .fetch_optional(&self.pool)
                    .await?
                }
                None => None,
            };

            let linhas = sqlx::query_as::<_, NotaDisciplinaRow>(
                r#"
                SELECT n.nota, d.disciplina AS disciplina_nome, d.carga, d.semestre
                FROM notas AS n
                LEFT JOIN disciplinas AS d ON d.id = n.disciplina_id
                WHERE n.aluno_id = $1
                ORDER BY n.id ASC
                "#,
            )
            .bind(aluno.id)
            .fetch_all(&self.pool)
            .await?;

            detalhes.push(AlunoDetalhe::montar(aluno, endereco, linhas));
        }

        Ok(detalhes)
    }
}

/// Resolves the address of an enrollment inside the caller's transaction:
/// insert-or-ignore keyed on the unique CEP, then fetch the surviving row.
/// Under two concurrent enrollments with the same new CEP, exactly one
/// insert wins and both selects observe the same row.
async fn resolver_endereco(
    tx: &mut Transaction<'_, Postgres>,
    info: &EnderecoCreate,
) -> Result<i32, DbError> {
    sqlx::query(
        r#"
        INSERT INTO enderecos (cep, endereco, bairro, cidade, estado, regiao)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (cep) DO NOTHING
        "#,
    )
    .bind(&info.cep)
    .bind(&info.endereco)
    .bind(info.bairro.as_deref())
    .bind(&info.cidade)
    .bind(&info.estado)
    .bind(info.regiao.as_deref())
    .execute(&mut **tx)
    .await
    .map_err(|e| DbError::AddressProcessing(e.to_string()))?;

    let endereco_id: i32 = sqlx::query_scalar("SELECT id FROM enderecos WHERE cep = $1")
        .bind(&info.cep)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| DbError::AddressProcessing(e.to_string()))?;

    Ok(endereco_id)
}

fn violacao_unicidade(err: &sqlx::Error) -> bool {
    match err {
        // 23505 is PostgreSQL's unique_violation SQLSTATE.
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
