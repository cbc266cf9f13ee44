//! Integration tests for the enrollment workflow and the detail view,
//! exercised against a live PostgreSQL instance.
//!
//! These are `#[ignore]`d by default because they need `DATABASE_URL`
//! pointing at a disposable database:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p database -- --ignored
//! ```

use core_types::{AlunoCreate, AlunoUpdate, DisciplinaCreate, EnderecoCreate};
use database::{DbError, DbRepository, connect, run_migrations};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

async fn repo() -> DbRepository {
    let pool = connect(5, Duration::from_secs(5))
        .await
        .expect("DATABASE_URL deve apontar para um PostgreSQL de teste");
    run_migrations(&pool).await.expect("migrations");
    DbRepository::new(pool)
}

/// Nanosecond suffix so each test run works with fresh matriculas and CEPs.
fn sufixo() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos()
}

fn payload_aluno(sufixo: u128, disciplinas_ids: Vec<i32>) -> AlunoCreate {
    AlunoCreate {
        matricula: format!("M{sufixo}"),
        nome: format!("Ana {sufixo}"),
        email: Some("ana@exemplo.com".to_string()),
        nome_mae: Some("Maria".to_string()),
        endereco_info: EnderecoCreate {
            cep: format!("CEP{sufixo}"),
            endereco: "Rua A".to_string(),
            bairro: None,
            cidade: "Rio".to_string(),
            estado: "RJ".to_string(),
            regiao: None,
        },
        disciplinas_ids,
    }
}

async fn nova_disciplina(repo: &DbRepository, nome: &str) -> i32 {
    repo.inserir_disciplina(&DisciplinaCreate {
        disciplina: nome.to_string(),
        carga: 60,
        semestre: 1,
    })
    .await
    .expect("inserir disciplina")
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn matricula_cria_aluno_endereco_e_notas() {
    let repo = repo().await;
    let s = sufixo();
    let d1 = nova_disciplina(&repo, &format!("Cálculo {s}")).await;
    let d2 = nova_disciplina(&repo, &format!("Física {s}")).await;

    let id = repo
        .matricular_aluno(&payload_aluno(s, vec![d1, d2]))
        .await
        .expect("matrícula válida");

    let detalhes = repo
        .detalhar_alunos_por_nome(&format!("Ana {s}"))
        .await
        .unwrap();
    assert_eq!(detalhes.len(), 1);
    assert_eq!(detalhes[0].id, id);
    assert_eq!(detalhes[0].matriculas.len(), 2);
    assert!(detalhes[0].matriculas.iter().all(|m| m.nota.is_none()));
    assert!(detalhes[0].endereco.is_some());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn disciplina_inexistente_desfaz_a_matricula_inteira() {
    let repo = repo().await;
    let s = sufixo();
    let d1 = nova_disciplina(&repo, &format!("Cálculo {s}")).await;

    let err = repo
        .matricular_aluno(&payload_aluno(s, vec![d1, i32::MAX]))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidCourseReference(id) if id == i32::MAX));

    // Full rollback: no student with that name survives.
    let alunos = repo.get_alunos_por_nome(&format!("Ana {s}")).await.unwrap();
    assert!(alunos.is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn cep_repetido_reaproveita_o_endereco() {
    let repo = repo().await;
    let s = sufixo();
    let d1 = nova_disciplina(&repo, &format!("Cálculo {s}")).await;

    let primeiro = payload_aluno(s, vec![d1]);
    let mut segundo = payload_aluno(s, vec![d1]);
    segundo.matricula = format!("M{s}-b");
    segundo.nome = format!("Bia {s}");
    // Same CEP on purpose: the second enrollment must reuse the row.
    segundo.endereco_info.cep = primeiro.endereco_info.cep.clone();

    let id_a = repo.matricular_aluno(&primeiro).await.unwrap();
    let id_b = repo.matricular_aluno(&segundo).await.unwrap();

    let aluno_a = repo.get_aluno_por_id(id_a).await.unwrap().remove(0);
    let aluno_b = repo.get_aluno_por_id(id_b).await.unwrap().remove(0);
    assert_eq!(aluno_a.endereco_id, aluno_b.endereco_id);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn matricula_duplicada_e_conflito() {
    let repo = repo().await;
    let s = sufixo();
    let d1 = nova_disciplina(&repo, &format!("Cálculo {s}")).await;

    repo.matricular_aluno(&payload_aluno(s, vec![d1])).await.unwrap();
    let err = repo
        .matricular_aluno(&payload_aluno(s, vec![d1]))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn update_parcial_preserva_os_demais_campos() {
    let repo = repo().await;
    let s = sufixo();
    let d1 = nova_disciplina(&repo, &format!("Cálculo {s}")).await;
    let id = repo.matricular_aluno(&payload_aluno(s, vec![d1])).await.unwrap();

    repo.atualizar_aluno(
        id,
        &AlunoUpdate {
            nome: Some(format!("Ana Maria {s}")),
            ..AlunoUpdate::default()
        },
    )
    .await
    .unwrap();

    let aluno = repo.get_aluno_por_id(id).await.unwrap().remove(0);
    assert_eq!(aluno.nome, format!("Ana Maria {s}"));
    assert_eq!(aluno.email.as_deref(), Some("ana@exemplo.com"));
    assert_eq!(aluno.nome_mae.as_deref(), Some("Maria"));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn deletar_disciplina_some_do_detalhe_do_aluno() {
    let repo = repo().await;
    let s = sufixo();
    let d1 = nova_disciplina(&repo, &format!("Cálculo {s}")).await;
    let d2 = nova_disciplina(&repo, &format!("Física {s}")).await;
    repo.matricular_aluno(&payload_aluno(s, vec![d1, d2])).await.unwrap();

    repo.deletar_disciplina(d2).await.unwrap();

    let detalhes = repo
        .detalhar_alunos_por_nome(&format!("Ana {s}"))
        .await
        .unwrap();
    assert_eq!(detalhes.len(), 1);
    // The grade row for the deleted course is silently skipped.
    assert_eq!(detalhes[0].matriculas.len(), 1);
}
