// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{presenca::FiltroRelatorio, turma::Turma, user::Role},
    services::{presenca_service, turma_service, user_service},
    state::AppState,
    templates::{
        AdminPainelPage, AdminTurmaPage, AdminTurmasPage, AdminUsersPage, RegistoView,
        RelatoriosPage, UserView,
    },
    web::mw_auth::CurrentUser,
};
use askama::Template; // Para render()
use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use urlencoding;

// --- Structs para os Formulários ---
#[derive(Deserialize, Debug)]
pub struct CreateUserForm {
    nome_completo: String,
    email: String,
    password: String,
    // O select "sem papel" envia string vazia
    #[serde(default)]
    role: String,
}

#[derive(Deserialize, Debug)]
pub struct RoleForm {
    #[serde(default)]
    role: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateTurmaForm {
    nome: String,
    #[serde(default)]
    descricao: String,
}

#[derive(Deserialize, Debug)]
pub struct MembroForm {
    user_id: String,
}

// --- Structs para as Query Strings ---
#[derive(Deserialize, Debug)]
pub struct FeedbackParams {
    success: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ListagemParams {
    q: Option<String>,
    success: Option<String>,
    error: Option<String>,
}

// Filtros do relatório (partilhados com a página do professor)
#[derive(Deserialize, Debug)]
pub struct RelatorioParams {
    pub turma: Option<String>,
    pub de: Option<String>,
    pub ate: Option<String>,
}

fn parse_data(valor: Option<&str>) -> Result<Option<NaiveDate>, ()> {
    match valor.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ()),
    }
}

/// Converte os parâmetros da query num filtro de relatório. Data mal
/// formada não é erro fatal: esse filtro é ignorado e a página avisa.
pub fn montar_filtro(params: &RelatorioParams) -> (FiltroRelatorio, Option<String>) {
    let mut filtro = FiltroRelatorio::default();
    let mut aviso = None;

    filtro.turma_id = params.turma.clone().filter(|t| !t.trim().is_empty());
    match parse_data(params.de.as_deref()) {
        Ok(de) => filtro.de = de,
        Err(()) => aviso = Some("Data 'de' inválida; filtro ignorado.".to_string()),
    }
    match parse_data(params.ate.as_deref()) {
        Ok(ate) => filtro.ate = ate,
        Err(()) => aviso = Some("Data 'até' inválida; filtro ignorado.".to_string()),
    }
    (filtro, aviso)
}

// --- Handlers ---

/// Handler para GET /admin - Painel com os números globais
pub async fn show_painel(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /admin: Carregando painel...");

    let hoje = Local::now().date_naive();
    let painel = presenca_service::painel_admin(&state.db_pool, hoje).await?;

    let template = AdminPainelPage {
        nav: atual.nav(),
        painel,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template AdminPainelPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// Handler para GET /admin/users - Mostra a página de gestão de contas
pub async fn show_users_page(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
    Query(params): Query<ListagemParams>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /admin/users: Carregando página de gestão...");

    // 1. Busca as contas (com o filtro de pesquisa, se houver)
    let pesquisa = params.q.unwrap_or_default();
    let pesquisa = pesquisa.trim();
    let users = user_service::find_all_users(
        &state.db_pool,
        Some(pesquisa).filter(|p| !p.is_empty()),
    )
    .await?;

    // 2. Prepara cada linha para o template
    let users: Vec<UserView> = users
        .into_iter()
        .map(|u| UserView {
            papel_rotulo: Role::parse(&u.role).rotulo(),
            nome: if u.nome_completo.trim().is_empty() {
                "(sem perfil)".to_string()
            } else {
                u.nome_completo
            },
            id: u.id,
            email: u.email,
            papel: u.role,
        })
        .collect();

    // 3. Renderiza com o feedback vindo da query string
    let template = AdminUsersPage {
        nav: atual.nav(),
        users,
        pesquisa: pesquisa.to_string(),
        all_defined_roles: user_service::DEFINED_ROLES,
        success_message: params.success,
        error_message: params.error,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template AdminUsersPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// Handler para POST /admin/users/create - Cria uma conta nova
pub async fn handle_create_user(
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/create: Tentando criar conta {}", form.email);

    // Validações básicas
    if form.nome_completo.trim().is_empty()
        || !form.email.contains('@')
        || form.password.len() < 6
    {
        tracing::warn!("Criação falhou: Dados inválidos no formulário.");
        let error_msg =
            urlencoding::encode("Dados inválidos. Verifique os campos (senha mín. 6 caracteres).");
        let redirect_url = format!("/admin/users?error={}", error_msg);
        // Retorna Ok(Redirect) mesmo em caso de erro de validação (padrão Post/Redirect/Get)
        return Ok(Redirect::to(&redirect_url));
    }

    // Papel inicial é opcional; valor desconhecido é recusado
    let role = match form.role.trim() {
        "" => None,
        valor => match Role::parse(valor) {
            Role::NaoAtribuido => {
                tracing::warn!("Criação falhou: papel desconhecido '{}'.", valor);
                let error_msg = urlencoding::encode("Papel desconhecido.");
                let redirect_url = format!("/admin/users?error={}", error_msg);
                return Ok(Redirect::to(&redirect_url));
            }
            papel => Some(papel),
        },
    };

    // Chama o serviço para criar a conta na DB
    match user_service::create_user(
        &state.db_pool,
        form.nome_completo.trim(),
        form.email.trim(),
        &form.password,
        role,
    )
    .await
    {
        Ok(_) => {
            let success_msg =
                urlencoding::encode(&format!("Conta '{}' criada com sucesso.", form.email.trim()))
                    .to_string();
            let redirect_url = format!("/admin/users?success={}", success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(AppError::EmailDuplicado) => {
            let error_msg = urlencoding::encode("Esse email já está registado.");
            let redirect_url = format!("/admin/users?error={}", error_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao criar conta {}: {:?}", form.email, e);
            let error_msg = urlencoding::encode("Erro ao criar a conta na base de dados.");
            let redirect_url = format!("/admin/users?error={}", error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para POST /admin/users/{id}/role - Define ou remove o papel
pub async fn handle_set_role(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Form(form): Form<RoleForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/{}/role: Novo papel '{}'", user_id, form.role);

    let role = match form.role.trim() {
        "" => None, // Volta a "sem papel"
        valor => match Role::parse(valor) {
            Role::NaoAtribuido => {
                tracing::warn!("Alteração falhou: papel desconhecido '{}'.", valor);
                let error_msg = urlencoding::encode("Papel desconhecido.");
                let redirect_url = format!("/admin/users?error={}", error_msg);
                return Ok(Redirect::to(&redirect_url));
            }
            papel => Some(papel),
        },
    };

    match user_service::set_user_role(&state.db_pool, &user_id, role).await {
        Ok(()) => {
            let success_msg = urlencoding::encode("Papel atualizado.");
            let redirect_url = format!("/admin/users?success={}", success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(AppError::NotFound(msg)) => {
            let error_msg = urlencoding::encode(&msg);
            let redirect_url = format!("/admin/users?error={}", error_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao definir papel de {}: {:?}", user_id, e);
            let error_msg = urlencoding::encode("Erro ao atualizar o papel.");
            let redirect_url = format!("/admin/users?error={}", error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para GET /admin/classes - Lista de turmas
pub async fn show_turmas_page(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /admin/classes: Carregando turmas...");

    let turmas = turma_service::listar_turmas(&state.db_pool).await?;
    let template = AdminTurmasPage {
        nav: atual.nav(),
        turmas,
        success_message: params.success,
        error_message: params.error,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template AdminTurmasPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// Handler para POST /admin/classes/create
pub async fn handle_create_turma(
    State(state): State<AppState>,
    Form(form): Form<CreateTurmaForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/classes/create: Tentando criar turma '{}'", form.nome);

    if form.nome.trim().is_empty() {
        let error_msg = urlencoding::encode("O nome da turma é obrigatório.");
        let redirect_url = format!("/admin/classes?error={}", error_msg);
        return Ok(Redirect::to(&redirect_url));
    }

    let descricao = form.descricao.trim();
    let descricao = if descricao.is_empty() { None } else { Some(descricao) };

    match turma_service::criar_turma(&state.db_pool, form.nome.trim(), descricao).await {
        Ok(_) => {
            let success_msg =
                urlencoding::encode(&format!("Turma '{}' criada.", form.nome.trim())).to_string();
            let redirect_url = format!("/admin/classes?success={}", success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao criar turma '{}': {:?}", form.nome, e);
            let error_msg = urlencoding::encode("Erro ao criar a turma na base de dados.");
            let redirect_url = format!("/admin/classes?error={}", error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para POST /admin/classes/{id}/delete
pub async fn handle_apagar_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<String>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/classes/{}/delete", turma_id);

    match turma_service::apagar_turma(&state.db_pool, &turma_id).await {
        Ok(()) => {
            let success_msg = urlencoding::encode("Turma apagada.");
            let redirect_url = format!("/admin/classes?success={}", success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(AppError::NotFound(msg)) => {
            let error_msg = urlencoding::encode(&msg);
            let redirect_url = format!("/admin/classes?error={}", error_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao apagar turma {}: {:?}", turma_id, e);
            let error_msg = urlencoding::encode("Erro ao apagar a turma.");
            let redirect_url = format!("/admin/classes?error={}", error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para GET /admin/classes/{id} - Detalhe e membros de uma turma
pub async fn show_turma_page(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
    Path(turma_id): Path<String>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /admin/classes/{}: Carregando detalhe...", turma_id);

    // 1. A turma tem de existir
    let Some(turma) = turma_service::find_turma(&state.db_pool, &turma_id).await? else {
        tracing::warn!("Turma '{}' não encontrada.", turma_id);
        let error_msg = urlencoding::encode("Turma não encontrada.");
        let redirect_url = format!("/admin/classes?error={}", error_msg);
        return Ok(Redirect::to(&redirect_url).into_response());
    };

    // 2. Membros atuais e contas disponíveis para os selects
    let (alunos, professores, alunos_disponiveis, professores_disponiveis) = tokio::join!(
        turma_service::alunos_da_turma(&state.db_pool, &turma_id),
        turma_service::professores_da_turma(&state.db_pool, &turma_id),
        turma_service::alunos_disponiveis(&state.db_pool, &turma_id),
        turma_service::professores_disponiveis(&state.db_pool, &turma_id),
    );

    let template = AdminTurmaPage {
        nav: atual.nav(),
        turma,
        alunos: alunos?,
        professores: professores?,
        alunos_disponiveis: alunos_disponiveis?,
        professores_disponiveis: professores_disponiveis?,
        success_message: params.success,
        error_message: params.error,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template AdminTurmaPage: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

/// Handler para POST /admin/classes/{id}/alunos - Inscreve um aluno
pub async fn handle_inscrever_aluno(
    State(state): State<AppState>,
    Path(turma_id): Path<String>,
    Form(form): Form<MembroForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/classes/{}/alunos: aluno '{}'", turma_id, form.user_id);

    match turma_service::inscrever_aluno(&state.db_pool, &turma_id, &form.user_id).await {
        Ok(()) => {
            let success_msg = urlencoding::encode("Aluno inscrito.");
            let redirect_url = format!("/admin/classes/{}?success={}", turma_id, success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(AppError::Invalido(msg)) => {
            let error_msg = urlencoding::encode(&msg);
            let redirect_url = format!("/admin/classes/{}?error={}", turma_id, error_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao inscrever aluno na turma {}: {:?}", turma_id, e);
            let error_msg = urlencoding::encode("Erro ao inscrever o aluno.");
            let redirect_url = format!("/admin/classes/{}?error={}", turma_id, error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para POST /admin/classes/{id}/alunos/{aluno_id}/remover
pub async fn handle_remover_aluno(
    State(state): State<AppState>,
    Path((turma_id, aluno_id)): Path<(String, String)>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/classes/{}/alunos/{}/remover", turma_id, aluno_id);

    match turma_service::remover_aluno(&state.db_pool, &turma_id, &aluno_id).await {
        Ok(()) => {
            let success_msg = urlencoding::encode("Aluno removido.");
            let redirect_url = format!("/admin/classes/{}?success={}", turma_id, success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao remover aluno da turma {}: {:?}", turma_id, e);
            let error_msg = urlencoding::encode("Erro ao remover o aluno.");
            let redirect_url = format!("/admin/classes/{}?error={}", turma_id, error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para POST /admin/classes/{id}/professores - Atribui um professor
pub async fn handle_atribuir_professor(
    State(state): State<AppState>,
    Path(turma_id): Path<String>,
    Form(form): Form<MembroForm>,
) -> AppResult<Redirect> {
    tracing::info!(
        "POST /admin/classes/{}/professores: professor '{}'",
        turma_id,
        form.user_id
    );

    match turma_service::atribuir_professor(&state.db_pool, &turma_id, &form.user_id).await {
        Ok(()) => {
            let success_msg = urlencoding::encode("Professor atribuído.");
            let redirect_url = format!("/admin/classes/{}?success={}", turma_id, success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(AppError::Invalido(msg)) => {
            let error_msg = urlencoding::encode(&msg);
            let redirect_url = format!("/admin/classes/{}?error={}", turma_id, error_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao atribuir professor à turma {}: {:?}", turma_id, e);
            let error_msg = urlencoding::encode("Erro ao atribuir o professor.");
            let redirect_url = format!("/admin/classes/{}?error={}", turma_id, error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para POST /admin/classes/{id}/professores/{professor_id}/remover
pub async fn handle_remover_professor(
    State(state): State<AppState>,
    Path((turma_id, professor_id)): Path<(String, String)>,
) -> AppResult<Redirect> {
    tracing::info!(
        "POST /admin/classes/{}/professores/{}/remover",
        turma_id,
        professor_id
    );

    match turma_service::remover_professor(&state.db_pool, &turma_id, &professor_id).await {
        Ok(()) => {
            let success_msg = urlencoding::encode("Professor removido.");
            let redirect_url = format!("/admin/classes/{}?success={}", turma_id, success_msg);
            Ok(Redirect::to(&redirect_url))
        }
        Err(e) => {
            tracing::error!("Erro ao remover professor da turma {}: {:?}", turma_id, e);
            let error_msg = urlencoding::encode("Erro ao remover o professor.");
            let redirect_url = format!("/admin/classes/{}?error={}", turma_id, error_msg);
            Ok(Redirect::to(&redirect_url))
        }
    }
}

/// Handler para GET /admin/reports - Relatório global de presenças
pub async fn show_reports_page(
    State(state): State<AppState>,
    Extension(atual): Extension<CurrentUser>,
    Query(params): Query<RelatorioParams>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /admin/reports: filtros {:?}", params);

    let (filtro, error_message) = montar_filtro(&params);
    let registos = presenca_service::relatorio(&state.db_pool, &filtro).await?;
    let limite_atingido = registos.len() as i64 == presenca_service::LIMITE_RELATORIO;
    let registos: Vec<RegistoView> = registos.iter().map(RegistoView::de).collect();

    // Turmas para o select do filtro
    let turmas: Vec<Turma> = turma_service::listar_turmas(&state.db_pool)
        .await?
        .into_iter()
        .map(|t| Turma {
            id: t.id,
            nome: t.nome,
            descricao: t.descricao,
        })
        .collect();

    let template = RelatoriosPage {
        nav: atual.nav(),
        voltar: "/admin",
        base: "/admin/reports",
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
