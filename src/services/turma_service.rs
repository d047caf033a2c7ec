// src/services/turma_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        turma::{MembroTurma, Turma, TurmaComContagens},
        user::Role,
    },
    services::user_service,
};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Lista todas as turmas com as contagens de membros para a página do admin.
pub async fn listar_turmas(db_pool: &SqlitePool) -> AppResult<Vec<TurmaComContagens>> {
    tracing::debug!("Listando turmas...");
    let turmas = sqlx::query_as::<_, TurmaComContagens>(
        r#"
        SELECT
            t.id,
            t.nome,
            t.descricao,
            (SELECT COUNT(*) FROM turma_alunos ta WHERE ta.turma_id = t.id) AS total_alunos,
            (SELECT COUNT(*) FROM turma_professores tp WHERE tp.turma_id = t.id) AS total_professores
        FROM turmas t
        ORDER BY t.nome ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(turmas)
}

pub async fn find_turma(db_pool: &SqlitePool, turma_id: &str) -> AppResult<Option<Turma>> {
    let turma = sqlx::query_as::<_, Turma>(
        "SELECT id, nome, descricao FROM turmas WHERE id = ?1",
    )
    .bind(turma_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(turma)
}

/// Cria uma turma nova e devolve o ID gerado.
pub async fn criar_turma(
    db_pool: &SqlitePool,
    nome: &str,
    descricao: Option<&str>,
) -> AppResult<String> {
    let turma_id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO turmas (id, nome, descricao) VALUES (?1, ?2, ?3)")
        .bind(&turma_id)
        .bind(nome)
        .bind(descricao)
        .execute(db_pool)
        .await?;
    tracing::info!("✅ Turma '{}' criada.", nome);
    Ok(turma_id)
}

/// Apaga uma turma. As inscrições e presenças vão junto (ON DELETE CASCADE).
pub async fn apagar_turma(db_pool: &SqlitePool, turma_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM turmas WHERE id = ?1")
        .bind(turma_id)
        .execute(db_pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Turma não encontrada.".to_string()));
    }
    tracing::info!("🧹 Turma '{}' apagada.", turma_id);
    Ok(())
}

// --- Membros da turma ---

/// Alunos inscritos numa turma, com nome de exibição (cai para o email).
pub async fn alunos_da_turma(db_pool: &SqlitePool, turma_id: &str) -> AppResult<Vec<MembroTurma>> {
    let membros = sqlx::query_as::<_, MembroTurma>(
        r#"
        SELECT
            u.id AS user_id,
            COALESCE(p.nome_completo, u.email) AS nome,
            u.email
        FROM turma_alunos ta
        JOIN users u ON u.id = ta.aluno_id
        LEFT JOIN perfis p ON p.user_id = u.id
        WHERE ta.turma_id = ?1
        ORDER BY nome ASC
        "#,
    )
    .bind(turma_id)
    .fetch_all(db_pool)
    .await?;
    Ok(membros)
}

/// Professores atribuídos a uma turma.
pub async fn professores_da_turma(
    db_pool: &SqlitePool,
    turma_id: &str,
) -> AppResult<Vec<MembroTurma>> {
    let membros = sqlx::query_as::<_, MembroTurma>(
        r#"
        SELECT
            u.id AS user_id,
            COALESCE(p.nome_completo, u.email) AS nome,
            u.email
        FROM turma_professores tp
        JOIN users u ON u.id = tp.professor_id
        LEFT JOIN perfis p ON p.user_id = u.id
        WHERE tp.turma_id = ?1
        ORDER BY nome ASC
        "#,
    )
    .bind(turma_id)
    .fetch_all(db_pool)
    .await?;
    Ok(membros)
}

/// Contas com papel 'aluno' que ainda não estão nesta turma (para o select).
pub async fn alunos_disponiveis(
    db_pool: &SqlitePool,
    turma_id: &str,
) -> AppResult<Vec<MembroTurma>> {
    let membros = sqlx::query_as::<_, MembroTurma>(
        r#"
        SELECT
            u.id AS user_id,
            COALESCE(p.nome_completo, u.email) AS nome,
            u.email
        FROM user_roles ur
        JOIN users u ON u.id = ur.user_id
        LEFT JOIN perfis p ON p.user_id = u.id
        WHERE ur.role = 'aluno'
          AND u.id NOT IN (SELECT aluno_id FROM turma_alunos WHERE turma_id = ?1)
        ORDER BY nome ASC
        "#,
    )
    .bind(turma_id)
    .fetch_all(db_pool)
    .await?;
    Ok(membros)
}

/// Contas com papel 'professor' que ainda não lecionam esta turma.
pub async fn professores_disponiveis(
    db_pool: &SqlitePool,
    turma_id: &str,
) -> AppResult<Vec<MembroTurma>> {
    let membros = sqlx::query_as::<_, MembroTurma>(
        r#"
        SELECT
            u.id AS user_id,
            COALESCE(p.nome_completo, u.email) AS nome,
            u.email
        FROM user_roles ur
        JOIN users u ON u.id = ur.user_id
        LEFT JOIN perfis p ON p.user_id = u.id
        WHERE ur.role = 'professor'
          AND u.id NOT IN (SELECT professor_id FROM turma_professores WHERE turma_id = ?1)
        ORDER BY nome ASC
        "#,
    )
    .bind(turma_id)
    .fetch_all(db_pool)
    .await?;
    Ok(membros)
}

/// Inscreve um aluno na turma. Só contas com papel 'aluno' entram na lista.
pub async fn inscrever_aluno(
    db_pool: &SqlitePool,
    turma_id: &str,
    aluno_id: &str,
) -> AppResult<()> {
    let role = user_service::get_user_role(db_pool, aluno_id).await?;
    if role != Role::Aluno {
        tracing::warn!(
            "Inscrição recusada: conta '{}' tem papel {:?}, não 'aluno'.",
            aluno_id,
            role
        );
        return Err(AppError::Invalido(
            "Só contas com papel 'aluno' podem ser inscritas.".to_string(),
        ));
    }

    // Inscrição repetida não é erro
    sqlx::query("INSERT OR IGNORE INTO turma_alunos (turma_id, aluno_id) VALUES (?1, ?2)")
        .bind(turma_id)
        .bind(aluno_id)
        .execute(db_pool)
        .await?;
    tracing::info!("✅ Aluno '{}' inscrito na turma '{}'.", aluno_id, turma_id);
    Ok(())
}

pub async fn remover_aluno(db_pool: &SqlitePool, turma_id: &str, aluno_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM turma_alunos WHERE turma_id = ?1 AND aluno_id = ?2")
        .bind(turma_id)
        .bind(aluno_id)
        .execute(db_pool)
        .await?;
    tracing::info!("🧹 Aluno '{}' removido da turma '{}'.", aluno_id, turma_id);
    Ok(())
}

/// Atribui um professor à turma. Mesma regra de papel da inscrição de alunos.
pub async fn atribuir_professor(
    db_pool: &SqlitePool,
    turma_id: &str,
    professor_id: &str,
) -> AppResult<()> {
    let role = user_service::get_user_role(db_pool, professor_id).await?;
    if role != Role::Professor {
        tracing::warn!(
            "Atribuição recusada: conta '{}' tem papel {:?}, não 'professor'.",
            professor_id,
            role
        );
        return Err(AppError::Invalido(
            "Só contas com papel 'professor' podem ser atribuídas.".to_string(),
        ));
    }

    sqlx::query("INSERT OR IGNORE INTO turma_professores (turma_id, professor_id) VALUES (?1, ?2)")
        .bind(turma_id)
        .bind(professor_id)
        .execute(db_pool)
        .await?;
    tracing::info!(
        "✅ Professor '{}' atribuído à turma '{}'.",
        professor_id,
        turma_id
    );
    Ok(())
}

pub async fn remover_professor(
    db_pool: &SqlitePool,
    turma_id: &str,
    professor_id: &str,
) -> AppResult<()> {
    sqlx::query("DELETE FROM turma_professores WHERE turma_id = ?1 AND professor_id = ?2")
        .bind(turma_id)
        .bind(professor_id)
        .execute(db_pool)
        .await?;
    tracing::info!(
        "🧹 Professor '{}' removido da turma '{}'.",
        professor_id,
        turma_id
    );
    Ok(())
}

/// Turmas que um professor leciona (para o painel e para o select da chamada).
pub async fn turmas_do_professor(
    db_pool: &SqlitePool,
    professor_id: &str,
) -> AppResult<Vec<Turma>> {
    let turmas = sqlx::query_as::<_, Turma>(
        r#"
        SELECT t.id, t.nome, t.descricao
        FROM turma_professores tp
        JOIN turmas t ON t.id = tp.turma_id
        WHERE tp.professor_id = ?1
        ORDER BY t.nome ASC
        "#,
    )
    .bind(professor_id)
    .fetch_all(db_pool)
    .await?;
    Ok(turmas)
}
