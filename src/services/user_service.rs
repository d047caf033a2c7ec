// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{Perfil, Role, User, UserComPapel},
};
use sqlx::SqlitePool;
use uuid::Uuid;

// Papéis que o admin pode atribuir (o select do formulário usa esta lista)
pub const DEFINED_ROLES: &[&str] = &["admin", "professor", "aluno"];

/// Busca um utilizador na base de dados pelo seu ID.
pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;

    if user.is_some() {
        tracing::debug!("Utilizador '{}' encontrado.", user_id);
    } else {
        tracing::debug!("Utilizador '{}' não encontrado.", user_id);
    }
    Ok(user)
}

/// Busca um utilizador pelo email (a coluna tem COLLATE NOCASE).
pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por email: {}", email);
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Busca o papel de um utilizador. Sem linha em 'user_roles' a conta fica
/// `NaoAtribuido`; isso NÃO é um erro, só falhas de DB é que propagam.
pub async fn get_user_role(db_pool: &SqlitePool, user_id: &str) -> AppResult<Role> {
    tracing::debug!("Buscando papel para user ID: {}", user_id);
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ?1")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;

    let role = role.as_deref().map(Role::parse).unwrap_or(Role::NaoAtribuido);
    tracing::debug!("Papel de {}: {:?}", user_id, role);
    Ok(role)
}

/// Busca o perfil de exibição. Perfil em falta também não é erro.
pub async fn find_perfil(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<Perfil>> {
    let perfil = sqlx::query_as::<_, Perfil>(
        "SELECT user_id, nome_completo, email FROM perfis WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(perfil)
}

/// Resolve papel e perfil em paralelo para a requisição atual.
/// Cada ausência é tratada por si: papel em falta vira `NaoAtribuido`,
/// perfil em falta vira `None`, e um não bloqueia o outro.
pub async fn resolve_identity(
    db_pool: &SqlitePool,
    user_id: &str,
) -> AppResult<(Role, Option<Perfil>)> {
    let (role, perfil) = tokio::join!(
        get_user_role(db_pool, user_id),
        find_perfil(db_pool, user_id)
    );
    Ok((role?, perfil?))
}

// --- Funções para Admin ---

/// Busca todos os utilizadores com nome de perfil e papel.
/// `filtro` restringe por nome, email ou papel (LIKE, sem distinção de caso).
pub async fn find_all_users(
    db_pool: &SqlitePool,
    filtro: Option<&str>,
) -> AppResult<Vec<UserComPapel>> {
    tracing::debug!("Buscando todos os utilizadores (filtro: {:?})...", filtro);
    let filtro = filtro.unwrap_or("");
    let padrao = format!("%{}%", filtro);

    let users = sqlx::query_as::<_, UserComPapel>(
        r#"
        SELECT
            u.id,
            COALESCE(p.nome_completo, '') AS nome_completo,
            u.email,
            COALESCE(ur.role, '') AS role
        FROM users u
        LEFT JOIN perfis p ON p.user_id = u.id
        LEFT JOIN user_roles ur ON ur.user_id = u.id
        WHERE (?1 = '' OR p.nome_completo LIKE ?2 OR u.email LIKE ?2 OR ur.role LIKE ?2)
        ORDER BY nome_completo ASC, u.email ASC
        "#,
    )
    .bind(filtro)
    .bind(&padrao)
    .fetch_all(db_pool)
    .await?;

    tracing::debug!("Encontrados {} utilizadores.", users.len());
    Ok(users)
}

/// Cria uma conta nova (users + perfis + papel opcional) numa transação.
/// Devolve o ID gerado.
pub async fn create_user(
    db_pool: &SqlitePool,
    nome_completo: &str,
    email: &str,
    raw_password: &str,
    role: Option<Role>,
) -> AppResult<String> {
    tracing::info!("Tentando criar conta: {}", email);
    // 1. Gera o hash da senha (usando a função de auth_service)
    let password_hash = crate::services::auth_service::hash_password(raw_password).await?;
    let user_id = Uuid::new_v4().to_string();

    // 2. Usa uma transação para garantir atomicidade
    let mut tx = db_pool.begin().await?;

    // 3. Insere na tabela 'users'
    let insert_user_result =
        sqlx::query("INSERT INTO users (id, email, password_hash) VALUES (?1, ?2, ?3)")
            .bind(&user_id)
            .bind(email)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await;

    // Verifica erro de constraint (email duplicado)
    if let Err(sqlx::Error::Database(db_err)) = &insert_user_result {
        // Códigos comuns do SQLite para violação de UNIQUE
        if db_err.code().map_or(false, |c| c == "19" || c == "2067" || c == "1555") {
            tracing::warn!("Falha ao criar conta: email '{}' já registado.", email);
            tx.rollback().await?;
            return Err(AppError::EmailDuplicado);
        }
    }
    insert_user_result?; // Propaga outros erros da inserção

    // 4. Insere o perfil de exibição
    sqlx::query("INSERT INTO perfis (user_id, nome_completo, email) VALUES (?1, ?2, ?3)")
        .bind(&user_id)
        .bind(nome_completo)
        .bind(email)
        .execute(&mut *tx)
        .await?;

    // 5. Papel inicial (se o admin escolheu algum)
    if let Some(role) = role.filter(|r| *r != Role::NaoAtribuido) {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES (?1, ?2)")
            .bind(&user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
    }

    // 6. Confirma a transação
    tx.commit().await?;
    tracing::info!("✅ Conta '{}' criada com sucesso.", email);
    Ok(user_id)
}

/// Define (ou remove, com `None`) o papel de uma conta.
pub async fn set_user_role(
    db_pool: &SqlitePool,
    user_id: &str,
    role: Option<Role>,
) -> AppResult<()> {
    tracing::info!("Atualizando papel de '{}' para {:?}", user_id, role);

    let existe: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)")
        .bind(user_id)
        .fetch_one(db_pool)
        .await?;
    if !existe {
        tracing::warn!("Falha ao definir papel: utilizador '{}' não encontrado.", user_id);
        return Err(AppError::NotFound("Utilizador não encontrado.".to_string()));
    }

    // Inicia uma transação na base de dados
    let mut tx = db_pool.begin().await?;

    // 1. Apaga o papel existente (se houver)
    sqlx::query("DELETE FROM user_roles WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    // 2. Insere o novo (se houver)
    if let Some(role) = role.filter(|r| *r != Role::NaoAtribuido) {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
    }

    // 3. Confirma a transação
    tx.commit().await?;

    tracing::info!("✅ Papel atualizado com sucesso para user {}", user_id);
    Ok(())
}

/// Garante uma conta admin em instâncias novas.
/// Controlada por ADMIN_EMAIL / ADMIN_PASSWORD; sem as variáveis, não faz nada.
pub async fn ensure_bootstrap_admin(db_pool: &SqlitePool) -> AppResult<()> {
    let (email, password) = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
        (Ok(e), Ok(p)) if !e.trim().is_empty() && !p.is_empty() => (e, p),
        _ => {
            tracing::debug!("ADMIN_EMAIL/ADMIN_PASSWORD não definidos; bootstrap ignorado.");
            return Ok(());
        }
    };

    if find_user_by_email(db_pool, email.trim()).await?.is_some() {
        tracing::debug!("Conta admin '{}' já existe.", email);
        return Ok(());
    }

    create_user(db_pool, "Administrador", email.trim(), &password, Some(Role::Admin)).await?;
    tracing::info!("🔑 Conta admin inicial '{}' criada.", email);
    Ok(())
}
