// src/main.rs

// --- Imports ---
use axum::serve;
use chamada::{db, services::user_service, state::AppState, web};
use std::{env, net::SocketAddr};
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::Key, ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| {
                        "chamada=debug,tower_http=info,sqlx=warn,tower_sessions=info".into()
                    })
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor Chamada Escolar...");

    // --- Configuração da Base de Dados ---
    let db_pool = match db::create_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao conectar/migrar DB: {}", e));
        }
    };

    // Conta admin inicial para instâncias novas (ADMIN_EMAIL / ADMIN_PASSWORD).
    if let Err(e) = user_service::ensure_bootstrap_admin(&db_pool).await {
        tracing::error!("❌ Falha ao garantir a conta admin inicial: {}", e);
        return Err(anyhow::anyhow!("Falha no bootstrap do admin: {}", e));
    }

    // --- Configuração das Sessões ---
    // SqliteStore::new() já retorna Result, então precisamos extrair o valor
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("Falha ao criar session store: {}", e))?;
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao migrar tabela de sessões: {}", e))?;

    // Clone o store para a task de limpeza
    let session_store_clone = session_store.clone();
    tokio::spawn(async move {
        // Usa ExpiredDeletion trait através do método continuously_delete_expired
        if let Err(e) = session_store_clone
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Erro na task de limpeza de sessões: {:?}", e);
        }
    });
    tracing::info!("🧹 Tarefa de limpeza de sessões iniciada.");

    let secret_key_string = env::var("SESSION_SECRET")
        .map_err(|e| anyhow::anyhow!("!!! Variável de ambiente SESSION_SECRET não definida: {}", e))?;
    if secret_key_string.len() < 64 {
        tracing::error!(
            "⚠️ SESSION_SECRET curta demais ({} bytes): são precisos pelo menos 64.",
            secret_key_string.len()
        );
        return Err(anyhow::anyhow!("SESSION_SECRET precisa de pelo menos 64 bytes"));
    }
    let key = Key::from(secret_key_string.as_bytes());

    // Cria a camada de sessão (cookie assinado, expira por inatividade)
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_signed(key);

    tracing::info!("🔑 Camada de sessão configurada.");

    // --- Criação do Estado da Aplicação ---
    let app_state = AppState { db_pool };

    // --- Configuração do Endereço e Listener ---
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("📡 Servidor escutando em http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener na porta {}: {}", port, e);
            return Err(e.into());
        }
    };

    // --- Criação do Router e Aplicação das Camadas (Middlewares) ---
    tracing::info!("🛠️ Construindo router e aplicando middlewares...");
    let app = web::routes::create_router(app_state.clone()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CookieManagerLayer::new())
            .layer(session_layer),
    );
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
