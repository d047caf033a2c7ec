// src/web/home_handlers.rs
use crate::{
    models::user::Role,
    templates::{NotFoundPage, SemPapelPage},
    web::mw_auth::CurrentUser,
};
use askama::Template;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};

// GET /: encaminha cada papel para a sua secção
pub async fn role_redirect(Extension(atual): Extension<CurrentUser>) -> impl IntoResponse {
    match atual.role {
        Role::Admin => Redirect::to("/admin").into_response(),
        Role::Professor => Redirect::to("/teacher").into_response(),
        Role::Aluno => Redirect::to("/student").into_response(),
        Role::NaoAtribuido => {
            // Conta válida mas ainda sem papel: fica aqui à espera do admin
            tracing::debug!("Conta '{}' sem papel atribuído.", atual.user_id);
            let template = SemPapelPage { nav: atual.nav() };
            match template.render() {
                Ok(html) => Html(html).into_response(),
                Err(e) => {
                    tracing::error!("Falha ao renderizar página sem papel: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Erro ao carregar a página.",
                    )
                        .into_response()
                }
            }
        }
    }
}

// Fallback para qualquer rota desconhecida
pub async fn not_found() -> impl IntoResponse {
    let template = NotFoundPage;
    match template.render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Falha ao renderizar página 404: {}", e);
            (StatusCode::NOT_FOUND, "Página não encontrada.").into_response()
        }
    }
}
