// tests/common/mod.rs
// Nem todos os ficheiros de teste usam todos os helpers
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chamada::{
    models::user::Role,
    services::{turma_service, user_service},
    state::AppState,
    web,
};
use http_body_util::BodyExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tower::{ServiceBuilder, ServiceExt};
use tower_cookies::CookieManagerLayer;
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

// 64+ bytes, como o arranque exige
pub const CHAVE_DE_TESTE: &[u8] =
    b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Base de dados em memória com o esquema aplicado.
pub async fn pool_de_teste() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("opções sqlite")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        // Em memória: cada ligação extra seria uma base de dados vazia
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("abrir base de dados de teste");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("aplicar migrações");
    pool
}

pub async fn criar_conta(
    pool: &SqlitePool,
    nome: &str,
    email: &str,
    senha: &str,
    role: Option<Role>,
) -> String {
    user_service::create_user(pool, nome, email, senha, role)
        .await
        .expect("criar conta de teste")
}

pub async fn criar_turma(pool: &SqlitePool, nome: &str) -> String {
    turma_service::criar_turma(pool, nome, None)
        .await
        .expect("criar turma de teste")
}

/// A aplicação completa, com as mesmas camadas do arranque real.
pub async fn app_de_teste(pool: SqlitePool) -> Router {
    let session_store = SqliteStore::new(pool.clone())
        .with_table_name("sessions")
        .expect("criar session store");
    session_store.migrate().await.expect("migrar sessions");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(1)))
        .with_signed(Key::from(CHAVE_DE_TESTE));

    web::routes::create_router(AppState { db_pool: pool }).layer(
        ServiceBuilder::new()
            .layer(CookieManagerLayer::new())
            .layer(session_layer),
    )
}

/// Primeiro par nome=valor do Set-Cookie (o que um browser reenviaria).
pub fn cookie_de(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("resposta sem Set-Cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn location_de(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("resposta sem Location")
        .to_str()
        .unwrap()
        .to_string()
}

/// Faz login e devolve o cookie de sessão para os pedidos seguintes.
pub async fn login(app: &Router, email: &str, senha: &str) -> String {
    let corpo = format!(
        "email={}&password={}",
        urlencoding::encode(email),
        urlencoding::encode(senha)
    );
    let response = post_form(app, "/login", &corpo, None).await;
    assert_eq!(
        response.status(),
        StatusCode::SEE_OTHER,
        "login devia redirecionar"
    );
    cookie_de(&response)
}

pub async fn get_com_cookie(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn get_sem_cookie(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(
    app: &Router,
    uri: &str,
    corpo: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(corpo.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    corpo: serde_json::Value,
    cookie: &str,
) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie)
                .body(Body::from(corpo.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Lê o corpo inteiro da resposta como texto.
pub async fn corpo_como_texto(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
