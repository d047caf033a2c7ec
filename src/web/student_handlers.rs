// src/web/student_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::presenca_service,
    state::AppState,
    templates::{AlunoPainelPage, RegistoView, ResumoView},
    web::mw_auth::CurrentUser,
};
use askama::Template;
use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse},
};

/// Handler para GET /student - Resumo pessoal de presença do aluno
pub async fn show_painel(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /student: Carregando resumo do aluno '{}'...", atual.user_id);

    let resumo = presenca_service::resumo_aluno(&state.db_pool, &atual.user_id).await?;
    let recentes: Vec<RegistoView> = resumo.recentes.iter().map(RegistoView::de_aluno).collect();

    let template = AlunoPainelPage {
        nav: atual.nav(),
        resumo: ResumoView {
            taxa_geral: resumo.taxa_geral,
            total: resumo.total,
            por_turma: resumo.por_turma,
            recentes,
        },
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template AlunoPainelPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}
