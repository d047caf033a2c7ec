// src/web/mw_auth.rs
use crate::{
    error::AppError,
    models::user::{Perfil, Role},
    services::user_service,
    state::AppState,
    templates::NavInfo,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Identidade da requisição atual, resolvida a cada pedido a partir da
/// sessão. Papel e perfil vêm sempre da base de dados, nunca da sessão,
/// para que alterações feitas pelo admin valham no pedido seguinte.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub perfil: Option<Perfil>,
}

impl CurrentUser {
    /// Nome para mostrar no cabeçalho: o do perfil, ou o email como recurso.
    pub fn nome_exibicao(&self) -> String {
        match &self.perfil {
            Some(perfil) if !perfil.nome_completo.trim().is_empty() => {
                perfil.nome_completo.clone()
            }
            _ => self.email.clone(),
        }
    }

    pub fn nav(&self) -> NavInfo {
        NavInfo::nova(self.nome_exibicao(), self.role)
    }
}

// Middleware que verifica se o utilizador está logado e resolve a identidade
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Tenta obter o 'user_id' da sessão
    match session.get::<String>("user_id").await {
        Ok(Some(user_id)) => {
            // Confirma que a conta ainda existe (pode ter sido apagada)
            let Some(user) = user_service::find_user_by_id(&state.db_pool, &user_id).await? else {
                tracing::warn!(
                    "Autenticação MW: Sessão aponta para conta inexistente ('{}'). Limpando.",
                    user_id
                );
                session
                    .flush()
                    .await
                    .map_err(|e| AppError::SessionError(format!("Erro ao limpar sessão: {}", e)))?;
                return Ok(Redirect::to("/login").into_response());
            };

            tracing::debug!(
                "Autenticação MW: Utilizador '{}' autenticado. Prosseguindo...",
                user_id
            );

            // Papel e perfil resolvidos agora, para este pedido
            let (role, perfil) = user_service::resolve_identity(&state.db_pool, &user.id).await?;
            request.extensions_mut().insert(CurrentUser {
                user_id: user.id,
                email: user.email,
                role,
                perfil,
            });

            // Chama o próximo middleware ou o handler final e retorna a sua resposta
            Ok(next.run(request).await)
        }
        Ok(None) => {
            // Não há 'user_id' na sessão -> Não está logado
            tracing::debug!(
                "Autenticação MW: Não autenticado (sem user_id). Redirecionando para /login"
            );
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            // Erro ao tentar ler a sessão (ex: problema na DB)
            tracing::error!("Autenticação MW: Erro ao ler sessão: {:?}", e);
            Err(AppError::SessionError(format!(
                "Erro ao verificar sessão: {}",
                e
            )))
        }
    }
}
