// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, auth_handlers, home_handlers, mw_auth, mw_role, student_handlers,
        teacher_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route(
            "/login",
            get(auth_handlers::show_login_form).post(auth_handlers::handle_login),
        )
        .route("/logout", get(auth_handlers::handle_logout));

    // --- Rotas de Admin ---
    // Exigem login E papel admin
    let admin_routes = Router::new()
        .route("/", get(admin_handlers::show_painel))
        .route("/users", get(admin_handlers::show_users_page))
        .route("/users/create", post(admin_handlers::handle_create_user))
        .route("/users/{id}/role", post(admin_handlers::handle_set_role))
        .route("/classes", get(admin_handlers::show_turmas_page))
        .route("/classes/create", post(admin_handlers::handle_create_turma))
        .route("/classes/{id}", get(admin_handlers::show_turma_page))
        .route("/classes/{id}/delete", post(admin_handlers::handle_apagar_turma))
        .route("/classes/{id}/alunos", post(admin_handlers::handle_inscrever_aluno))
        .route(
            "/classes/{id}/alunos/{aluno_id}/remover",
            post(admin_handlers::handle_remover_aluno),
        )
        .route(
            "/classes/{id}/professores",
            post(admin_handlers::handle_atribuir_professor),
        )
        .route(
            "/classes/{id}/professores/{professor_id}/remover",
            post(admin_handlers::handle_remover_professor),
        )
        .route("/reports", get(admin_handlers::show_reports_page))
        // Aplica APENAS o guarda de papel (require_auth vem do router pai)
        .route_layer(middleware::from_fn(mw_role::require_admin));

    // --- Rotas do Professor ---
    let teacher_routes = Router::new()
        .route("/", get(teacher_handlers::show_painel))
        .route(
            "/attendance",
            get(teacher_handlers::show_chamada_page)
                .post(teacher_handlers::handle_submeter_chamada),
        )
        .route("/reports", get(teacher_handlers::show_reports_page))
        .route_layer(middleware::from_fn(mw_role::require_professor));

    // --- Rotas do Aluno ---
    let student_routes = Router::new()
        .route("/", get(student_handlers::show_painel))
        .route_layer(middleware::from_fn(mw_role::require_aluno));

    // --- Rotas Autenticadas (Combinando tudo) ---
    // Exigem *pelo menos* login
    let authenticated_routes = Router::new()
        // A raiz encaminha cada papel para a sua secção
        .route("/", get(home_handlers::role_redirect))
        .nest("/admin", admin_routes)
        .nest("/teacher", teacher_routes)
        .nest("/student", student_routes)
        // Aplica o middleware geral require_auth a TODAS as rotas
        // definidas ACIMA neste router (incluindo as aninhadas)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .fallback(home_handlers::not_found)
        .with_state(app_state)
}
