// src/web/mw_role.rs
use crate::{models::user::Role, web::mw_auth::CurrentUser};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Regra de acesso das secções: o papel atual tem de estar na lista.
/// `NaoAtribuido` nunca está, por isso nunca passa.
pub fn papel_permitido(role: Role, permitidos: &[Role]) -> bool {
    permitidos.contains(&role)
}

/// Verifica o papel resolvido por `require_auth`. Acesso negado não é
/// erro nem 403: volta em silêncio para "/" e o utilizador cai na sua
/// própria secção.
/// Deve ser executado *depois* do middleware `require_auth`.
async fn require_role(
    permitidos: &[Role],
    atual: CurrentUser,
    request: Request,
    next: Next,
) -> Response {
    if papel_permitido(atual.role, permitidos) {
        tracing::debug!(
            "Papel MW: Acesso concedido para '{}' ({:?}).",
            atual.user_id,
            atual.role
        );
        next.run(request).await
    } else {
        tracing::warn!(
            "Papel MW: Acesso negado para '{}' ({:?} fora de {:?}). Redirecionando para /",
            atual.user_id,
            atual.role,
            permitidos
        );
        Redirect::to("/").into_response()
    }
}

pub async fn require_admin(
    Extension(atual): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    require_role(&[Role::Admin], atual, request, next).await
}

pub async fn require_professor(
    Extension(atual): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    require_role(&[Role::Professor], atual, request, next).await
}

pub async fn require_aluno(
    Extension(atual): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    require_role(&[Role::Aluno], atual, request, next).await
}
