// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::LoginForm,
    services::{auth_service, user_service},
    state::AppState,
    templates::LoginPage,
};
use askama::Template; // Trait Template para render()
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect},
};
use tower_sessions::Session;

// GET /login (verifica sessão e renderiza explicitamente)
pub async fn show_login_form(session: Session) -> impl IntoResponse {
    // Verifica se já existe um 'user_id' na sessão
    if session.get::<String>("user_id").await.ok().flatten().is_some() {
        tracing::debug!("GET /login: Utilizador já logado, redirecionando para /");
        // A raiz encaminha cada papel para a sua secção
        return Redirect::to("/").into_response();
    }

    // Se não está logado, renderiza a página de login
    let template = LoginPage { error: None };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Falha ao renderizar template de login: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao carregar a página.",
            )
                .into_response()
        }
    }
}

// Renderiza o login de novo com a mensagem de erro (credenciais erradas)
fn login_com_erro() -> AppResult<axum::response::Response> {
    let template = LoginPage {
        error: Some("Email ou senha inválidos.".to_string()),
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template de login com erro: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

// POST /login (Lógica de processamento do formulário)
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    let email = form.email.trim();
    tracing::info!("Tentativa de login para: {}", email);

    // 1. Tenta encontrar o utilizador na base de dados pelo email
    match user_service::find_user_by_email(&state.db_pool, email).await {
        Ok(Some(user)) => {
            tracing::debug!("Utilizador {} encontrado, verificando senha...", email);
            // 2. Verifica se a senha fornecida corresponde ao hash guardado
            match auth_service::verify_password(&form.password, &user.password_hash).await {
                Ok(true) => {
                    // 3. Autentica a sessão
                    session.cycle_id().await // Gera novo ID de sessão (segurança)
                        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;
                    session.insert("user_id", &user.id).await
                        .map_err(|e| AppError::SessionError(format!("Falha ao inserir na sessão: {}", e)))?;

                    tracing::info!("✅ Login bem-sucedido para: {}", user.email);
                    // 4. A raiz decide o destino conforme o papel
                    Ok(Redirect::to("/").into_response())
                }
                Ok(false) => {
                    // Senha incorreta: mesma mensagem genérica que conta inexistente
                    tracing::warn!("Senha incorreta para: {}", email);
                    login_com_erro()
                }
                Err(e) => {
                    tracing::error!("Erro ao verificar senha para {}: {:?}", email, e);
                    Err(e)
                }
            }
        }
        Ok(None) => {
            tracing::warn!("Utilizador não encontrado: {}", email);
            login_com_erro()
        }
        Err(e) => {
            tracing::error!("Erro ao buscar utilizador {}: {:?}", email, e);
            Err(e)
        }
    }
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let user_id: Option<String> = session.get("user_id").await.ok().flatten();

    // Apaga os dados e o próprio registo da sessão
    session.flush().await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    if let Some(id) = user_id {
        tracing::info!("🚪 Utilizador '{}' desligado.", id);
    } else {
        tracing::info!("🚪 Sessão anónima desligada.");
    }

    // Redireciona para a página de login
    Ok(Redirect::to("/login"))
}
