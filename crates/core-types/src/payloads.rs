use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Address fields accepted by `/inserir-endereco/` and embedded in the
/// enrollment payload as `endereco_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnderecoCreate {
    pub cep: String,
    pub endereco: String,
    pub bairro: Option<String>,
    pub cidade: String,
    pub estado: String,
    pub regiao: Option<String>,
}

impl EnderecoCreate {
    pub fn validar(&self) -> Result<(), CoreError> {
        obrigatorio("cep", &self.cep)?;
        obrigatorio("endereco", &self.endereco)?;
        obrigatorio("cidade", &self.cidade)?;
        obrigatorio("estado", &self.estado)?;
        Ok(())
    }
}

/// Partial address update: only the fields present in the request body
/// are applied; absent fields leave the stored values untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnderecoUpdate {
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub regiao: Option<String>,
}

impl EnderecoUpdate {
    pub fn validar(&self) -> Result<(), CoreError> {
        for (campo, valor) in [
            ("cep", &self.cep),
            ("endereco", &self.endereco),
            ("cidade", &self.cidade),
            ("estado", &self.estado),
        ] {
            if let Some(valor) = valor {
                obrigatorio(campo, valor)?;
            }
        }
        Ok(())
    }
}

/// Enrollment payload for `/inserir-aluno/`: the student's own fields, the
/// embedded address and the ids of the courses to enroll in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlunoCreate {
    pub matricula: String,
    pub nome: String,
    pub email: Option<String>,
    pub nome_mae: Option<String>,
    pub endereco_info: EnderecoCreate,
    pub disciplinas_ids: Vec<i32>,
}

impl AlunoCreate {
    pub fn validar(&self) -> Result<(), CoreError> {
        obrigatorio("matricula", &self.matricula)?;
        obrigatorio("nome", &self.nome)?;
        if let Some(email) = &self.email {
            email_plausivel(email)?;
        }
        self.endereco_info.validar()?;
        if self.disciplinas_ids.is_empty() {
            return Err(CoreError::Validation(
                "disciplinas_ids".to_string(),
                "informe ao menos uma disciplina".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial student update; `endereco_id` may point the student at another
/// already-existing address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlunoUpdate {
    pub matricula: Option<String>,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub nome_mae: Option<String>,
    pub endereco_id: Option<i32>,
}

impl AlunoUpdate {
    pub fn validar(&self) -> Result<(), CoreError> {
        if let Some(matricula) = &self.matricula {
            obrigatorio("matricula", matricula)?;
        }
        if let Some(nome) = &self.nome {
            obrigatorio("nome", nome)?;
        }
        if let Some(email) = &self.email {
            email_plausivel(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisciplinaCreate {
    pub disciplina: String,
    pub carga: i32,
    pub semestre: i32,
}

impl DisciplinaCreate {
    pub fn validar(&self) -> Result<(), CoreError> {
        obrigatorio("disciplina", &self.disciplina)?;
        positivo("carga", self.carga)?;
        positivo("semestre", self.semestre)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisciplinaUpdate {
    pub disciplina: Option<String>,
    pub carga: Option<i32>,
    pub semestre: Option<i32>,
}

impl DisciplinaUpdate {
    pub fn validar(&self) -> Result<(), CoreError> {
        if let Some(disciplina) = &self.disciplina {
            obrigatorio("disciplina", disciplina)?;
        }
        if let Some(carga) = self.carga {
            positivo("carga", carga)?;
        }
        if let Some(semestre) = self.semestre {
            positivo("semestre", semestre)?;
        }
        Ok(())
    }
}

fn obrigatorio(campo: &str, valor: &str) -> Result<(), CoreError> {
    if valor.trim().is_empty() {
        return Err(CoreError::Validation(
            campo.to_string(),
            "não pode ser vazio".to_string(),
        ));
    }
    Ok(())
}

fn positivo(campo: &str, valor: i32) -> Result<(), CoreError> {
    if valor <= 0 {
        return Err(CoreError::Validation(
            campo.to_string(),
            "deve ser um inteiro positivo".to_string(),
        ));
    }
    Ok(())
}

fn email_plausivel(email: &str) -> Result<(), CoreError> {
    let invalido = CoreError::Validation("email".to_string(), "endereço de e-mail inválido".to_string());
    let Some((local, dominio)) = email.split_once('@') else {
        return Err(invalido);
    };
    if local.is_empty() || dominio.is_empty() || !dominio.contains('.') {
        return Err(invalido);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endereco_valido() -> EnderecoCreate {
        EnderecoCreate {
            cep: "20000-000".to_string(),
            endereco: "Rua A".to_string(),
            bairro: None,
            cidade: "Rio".to_string(),
            estado: "RJ".to_string(),
            regiao: None,
        }
    }

    fn aluno_valido() -> AlunoCreate {
        AlunoCreate {
            matricula: "2024001".to_string(),
            nome: "Ana".to_string(),
            email: Some("ana@exemplo.com".to_string()),
            nome_mae: None,
            endereco_info: endereco_valido(),
            disciplinas_ids: vec![1, 2],
        }
    }

    #[test]
    fn aluno_completo_passa_na_validacao() {
        assert!(aluno_valido().validar().is_ok());
    }

    #[test]
    fn matricula_vazia_rejeitada() {
        let mut payload = aluno_valido();
        payload.matricula = "   ".to_string();
        let err = payload.validar().unwrap_err();
        assert!(err.to_string().contains("matricula"));
    }

    #[test]
    fn sem_disciplinas_rejeitado() {
        let mut payload = aluno_valido();
        payload.disciplinas_ids.clear();
        let err = payload.validar().unwrap_err();
        assert!(err.to_string().contains("disciplinas_ids"));
    }

    #[test]
    fn email_sem_arroba_rejeitado() {
        let mut payload = aluno_valido();
        payload.email = Some("ana.exemplo.com".to_string());
        assert!(payload.validar().is_err());
    }

    #[test]
    fn email_ausente_permitido() {
        let mut payload = aluno_valido();
        payload.email = None;
        assert!(payload.validar().is_ok());
    }

    #[test]
    fn endereco_sem_cidade_rejeitado() {
        let mut payload = aluno_valido();
        payload.endereco_info.cidade = String::new();
        assert!(payload.validar().is_err());
    }

    #[test]
    fn update_parcial_somente_nome_passa() {
        let payload = AlunoUpdate {
            nome: Some("Ana Maria".to_string()),
            ..AlunoUpdate::default()
        };
        assert!(payload.validar().is_ok());
    }

    #[test]
    fn update_com_nome_vazio_rejeitado() {
        let payload = AlunoUpdate {
            nome: Some(String::new()),
            ..AlunoUpdate::default()
        };
        assert!(payload.validar().is_err());
    }

    #[test]
    fn update_de_endereco_com_cep_vazio_rejeitado() {
        let payload = EnderecoUpdate {
            cep: Some("  ".to_string()),
            ..EnderecoUpdate::default()
        };
        assert!(payload.validar().is_err());
    }

    #[test]
    fn disciplina_com_carga_negativa_rejeitada() {
        let payload = DisciplinaCreate {
            disciplina: "Cálculo I".to_string(),
            carga: -60,
            semestre: 1,
        };
        assert!(payload.validar().is_err());
    }

    #[test]
    fn payload_de_matricula_desserializa_do_json() {
        let json = r#"{
            "matricula": "2024001",
            "nome": "Ana",
            "endereco_info": {
                "cep": "20000-000",
                "endereco": "Rua A",
                "cidade": "Rio",
                "estado": "RJ"
            },
            "disciplinas_ids": [1, 2]
        }"#;
        let payload: AlunoCreate = serde_json::from_str(json).unwrap();
        assert_eq!(payload.matricula, "2024001");
        assert_eq!(payload.disciplinas_ids, vec![1, 2]);
        assert!(payload.email.is_none());
        assert!(payload.endereco_info.bairro.is_none());
        assert!(payload.validar().is_ok());
    }
}
