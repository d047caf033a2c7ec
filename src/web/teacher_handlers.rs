// src/web/teacher_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::presenca::ChamadaPayload,
    services::{presenca_service, turma_service},
    state::AppState,
    templates::{ProfessorChamadaPage, ProfessorPainelPage, RegistoView, RelatoriosPage},
    web::{
        admin_handlers::{self, RelatorioParams},
        mw_auth::CurrentUser,
    },
};
use askama::Template;
use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ChamadaParams {
    // O nome vem assim nos links da interface
    #[serde(rename = "classId")]
    class_id: Option<String>,
    data: Option<String>,
}

/// Handler para GET /teacher - Turmas do professor, com o estado de hoje
pub async fn show_painel(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /teacher: Carregando painel do professor...");

    let hoje = Local::now().date_naive();
    let turmas = presenca_service::painel_professor(
        &state.db_pool,
        &atual.user_id,
        &hoje.format("%Y-%m-%d").to_string(),
    )
    .await?;

    let template = ProfessorPainelPage {
        nav: atual.nav(),
        hoje: hoje.format("%d/%m/%Y").to_string(),
        turmas,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template ProfessorPainelPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// Handler para GET /teacher/attendance - Grelha de chamada de uma turma
pub async fn show_chamada_page(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
    Query(params): Query<ChamadaParams>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /teacher/attendance: params {:?}", params);

    let turmas = turma_service::turmas_do_professor(&state.db_pool, &atual.user_id).await?;
    let mut error_message = None;

    // Data selecionada (hoje por omissão; valor inválido cai para hoje)
    let hoje = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let data = match params.data.as_deref().map(str::trim) {
        None | Some("") => hoje.clone(),
        Some(v) => {
            if NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok() {
                v.to_string()
            } else {
                error_message = Some("Data inválida; a usar o dia de hoje.".to_string());
                hoje.clone()
            }
        }
    };

    // Turma selecionada: o parâmetro, ou a primeira turma do professor
    let turma_selecionada = params
        .class_id
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| turmas.first().map(|t| t.id.clone()));

    let linhas = match &turma_selecionada {
        Some(turma_id) if turmas.iter().any(|t| t.id == *turma_id) => {
            presenca_service::montar_chamada(&state.db_pool, turma_id, &data).await?
        }
        Some(turma_id) => {
            // Link forjado ou turma retirada entretanto
            tracing::warn!(
                "Professor '{}' pediu a chamada da turma '{}' que não leciona.",
                atual.user_id,
                turma_id
            );
            error_message = Some("Não leciona esta turma.".to_string());
            vec![]
        }
        None => vec![], // Professor ainda sem turmas atribuídas
    };

    let template = ProfessorChamadaPage {
        nav: atual.nav(),
        turmas,
        turma_selecionada: turma_selecionada.unwrap_or_default(),
        data,
        linhas,
        error_message,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template ProfessorChamadaPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// Handler para POST /teacher/attendance - Grava a chamada enviada pela grelha
pub async fn handle_submeter_chamada(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
    Json(payload): Json<ChamadaPayload>,
) -> impl IntoResponse {
    tracing::info!(
        "POST /teacher/attendance: turma '{}' em {}",
        payload.turma_id,
        payload.data
    );

    match presenca_service::registar_chamada(
        &state.db_pool,
        &payload.turma_id,
        &payload.data,
        &atual.user_id,
        &payload.entradas,
    )
    .await
    {
        Ok(n) => (StatusCode::OK, format!("Chamada gravada ({} alunos).", n)),
        Err(AppError::Unauthorized) => {
            (StatusCode::FORBIDDEN, "Não leciona esta turma.".to_string())
        }
        Err(AppError::Invalido(msg)) => (StatusCode::BAD_REQUEST, msg),
        Err(e) => {
            tracing::error!("Erro ao gravar chamada: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao gravar a chamada.".to_string(),
            )
        }
    }
}

/// Handler para GET /teacher/reports - Relatório restrito às turmas do professor
pub async fn show_reports_page(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
    Query(params): Query<RelatorioParams>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /teacher/reports: filtros {:?}", params);

    // Mesmo filtro do admin, mas só sobre as turmas deste professor
    let (mut filtro, error_message) = admin_handlers::montar_filtro(&params);
    filtro.professor_id = Some(atual.user_id.clone());

    let registos = presenca_service::relatorio(&state.db_pool, &filtro).await?;
    let limite_atingido = registos.len() as i64 == presenca_service::LIMITE_RELATORIO;
    let registos: Vec<RegistoView> = registos.iter().map(RegistoView::de).collect();

    let turmas = turma_service::turmas_do_professor(&state.db_pool, &atual.user_id).await?;

    let template = RelatoriosPage {
        nav: atual.nav(),
        voltar: "/teacher",
        base: "/teacher/reports",
        turmas,
        registos,
        filtro_turma: filtro.turma_id.clone().unwrap_or_default(),
        filtro_de: params.de.clone().unwrap_or_default(),
        filtro_ate: params.ate.clone().unwrap_or_default(),
        limite_atingido,
        error_message,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template RelatoriosPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}
