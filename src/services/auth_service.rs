// src/services/auth_service.rs
use crate::error::{AppError, AppResult};

/// Compara a senha submetida no login com o hash bcrypt guardado.
/// O bcrypt é lento de propósito, por isso corre fora do executor async.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    let verificacao =
        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &stored_hash))
            .await
            .map_err(|e| {
                tracing::error!("Task bloqueante de verificação abortou: {:?}", e);
                AppError::InternalServerError
            })?;
    verificacao.map_err(|e| {
        tracing::error!("bcrypt recusou o hash guardado: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera o hash bcrypt de uma senha nova (criação de contas).
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| {
            tracing::error!("Task bloqueante de hashing abortou: {:?}", e);
            AppError::InternalServerError
        })?;
    hash.map_err(|e| {
        tracing::error!("bcrypt falhou a gerar o hash: {:?}", e);
        AppError::PasswordHashingError
    })
}
