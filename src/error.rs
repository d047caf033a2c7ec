// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Erro na sessão: {0}")]
    SessionError(String),

    // Email com UNIQUE na tabela users; o serviço traduz a violação para isto.
    #[error("Email já registado")]
    EmailDuplicado,

    #[error("{0}")]
    NotFound(String),

    #[error("Dados inválidos: {0}")]
    Invalido(String),

    #[error("Erro interno inesperado")]
    InternalServerError,

    #[error("Não autorizado")]
    Unauthorized,
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Loga o erro detalhado no servidor
        tracing::error!("Erro processado: {:?}", self);

        let (status, user_message) = match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao aceder aos dados.".to_string(),
            ),
            AppError::EnvVarError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro de configuração.".to_string(),
            ),
            AppError::PasswordHashingError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao processar credenciais.".to_string(),
            ),
            // Mensagem genérica de propósito: não revelar se o email existe
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Email ou senha inválidos.".to_string())
            }
            AppError::SessionError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro na gestão da sua sessão.".to_string(),
            ),
            AppError::EmailDuplicado => {
                (StatusCode::CONFLICT, "Este email já está registado.".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Invalido(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "Não tem permissão para esta operação.".to_string(),
            ),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ocorreu um erro inesperado.".to_string(),
            ),
        };

        // Retorna uma página HTML simples (ou poderia usar um template Askama de erro)
        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Erro</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Erro {status_code}</h1><p>{message}</p><a href="javascript:history.back()">Voltar</a></body></html>
         "#, status_code=status.as_u16(), message=user_message))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
