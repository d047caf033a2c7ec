// src/models/user.rs
use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::FromRow;

// Representa um utilizador lido da tabela 'users' (credencial de login)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Option<NaiveDateTime>,
}

/// Linha da tabela 'perfis' (dados de exibição, separados da credencial).
#[derive(Debug, Clone, FromRow)]
pub struct Perfil {
    pub user_id: String,
    pub nome_completo: String,
    pub email: String,
}

/// Papel de acesso. Cada conta tem no máximo um; contas sem linha em
/// 'user_roles' ficam em `NaoAtribuido` e não entram em área nenhuma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Professor,
    Aluno,
    NaoAtribuido,
}

impl Role {
    /// Converte o valor guardado na DB. Valores desconhecidos caem em
    /// `NaoAtribuido` (não concedem nada).
    pub fn parse(valor: &str) -> Role {
        match valor.to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "professor" => Role::Professor,
            "aluno" => Role::Aluno,
            _ => Role::NaoAtribuido,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Professor => "professor",
            Role::Aluno => "aluno",
            Role::NaoAtribuido => "sem_papel",
        }
    }

    /// Nome legível para a interface.
    pub fn rotulo(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Professor => "Professor",
            Role::Aluno => "Aluno",
            Role::NaoAtribuido => "Sem papel",
        }
    }
}

// Struct para dados do formulário de login
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Linha da listagem de utilizadores do admin (perfil e papel já juntos).
#[derive(Debug, Clone, FromRow)]
pub struct UserComPapel {
    pub id: String,
    pub nome_completo: String,
    pub email: String,
    pub role: String, // vazio quando não atribuído
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aceita_os_tres_papeis() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("professor"), Role::Professor);
        assert_eq!(Role::parse("aluno"), Role::Aluno);
    }

    #[test]
    fn parse_ignora_maiusculas() {
        // a coluna tem COLLATE NOCASE, o parse acompanha
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("PROFESSOR"), Role::Professor);
    }

    #[test]
    fn parse_de_valor_desconhecido_nao_concede_nada() {
        assert_eq!(Role::parse(""), Role::NaoAtribuido);
        assert_eq!(Role::parse("diretor"), Role::NaoAtribuido);
    }
}
