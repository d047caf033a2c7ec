// src/services/presenca_service.rs
use crate::{
    error::{AppError, AppResult},
    models::presenca::{
        DiaTendencia, EntradaChamada, EstatisticasTurma, FiltroRelatorio, LinhaChamada,
        PainelAdmin, RegistoAluno, RegistoRelatorio, ResumoAluno, StatusPresenca, TurmaDoDia,
    },
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Tecto de linhas devolvidas por um relatório, as mais recentes primeiro.
pub const LIMITE_RELATORIO: i64 = 200;

// --- Grelha da chamada ---

/// Monta a grelha de chamada de uma turma para uma data.
/// Todos os inscritos aparecem; quem ainda não tem registo nesse dia
/// entra como 'presente' (o valor por omissão da grelha).
pub async fn montar_chamada(
    db_pool: &SqlitePool,
    turma_id: &str,
    data: &str,
) -> AppResult<Vec<LinhaChamada>> {
    tracing::debug!("Montando chamada da turma '{}' para {}", turma_id, data);
    let linhas = sqlx::query_as::<_, LinhaChamada>(
        r#"
        SELECT
            u.id AS aluno_id,
            COALESCE(p.nome_completo, u.email) AS nome,
            COALESCE(pr.status, 'presente') AS status
        FROM turma_alunos ta
        JOIN users u ON u.id = ta.aluno_id
        LEFT JOIN perfis p ON p.user_id = u.id
        LEFT JOIN presencas pr
            ON pr.turma_id = ta.turma_id AND pr.aluno_id = ta.aluno_id AND pr.data = ?2
        WHERE ta.turma_id = ?1
        ORDER BY nome ASC
        "#,
    )
    .bind(turma_id)
    .bind(data)
    .fetch_all(db_pool)
    .await?;
    Ok(linhas)
}

pub async fn professor_leciona(
    db_pool: &SqlitePool,
    professor_id: &str,
    turma_id: &str,
) -> AppResult<bool> {
    let leciona: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM turma_professores WHERE turma_id = ?1 AND professor_id = ?2)",
    )
    .bind(turma_id)
    .bind(professor_id)
    .fetch_one(db_pool)
    .await?;
    Ok(leciona)
}

/// Grava a chamada de uma turma numa data. Remarcar o mesmo dia substitui
/// o estado anterior (uma linha por aluno/turma/data, nunca duplicados).
/// Devolve o número de alunos gravados.
pub async fn registar_chamada(
    db_pool: &SqlitePool,
    turma_id: &str,
    data: &str,
    marcado_por: &str,
    entradas: &[EntradaChamada],
) -> AppResult<usize> {
    // 1. Valida o pedido antes de tocar na base de dados
    if entradas.is_empty() {
        return Err(AppError::Invalido("A chamada não tem alunos.".to_string()));
    }
    NaiveDate::parse_from_str(data, "%Y-%m-%d")
        .map_err(|_| AppError::Invalido("Data inválida. Use o formato AAAA-MM-DD.".to_string()))?;

    // 2. Só o professor da turma pode marcar a chamada dela
    if !professor_leciona(db_pool, marcado_por, turma_id).await? {
        tracing::warn!(
            "⚠️ Conta '{}' tentou marcar chamada da turma '{}' sem a lecionar.",
            marcado_por,
            turma_id
        );
        return Err(AppError::Unauthorized);
    }

    // 3. Grava tudo numa transação
    let mut tx = db_pool.begin().await?;
    for entrada in entradas {
        let inscrito: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM turma_alunos WHERE turma_id = ?1 AND aluno_id = ?2)",
        )
        .bind(turma_id)
        .bind(&entrada.aluno_id)
        .fetch_one(&mut *tx)
        .await?;
        if !inscrito {
            tx.rollback().await?;
            return Err(AppError::Invalido(format!(
                "O aluno '{}' não está inscrito nesta turma.",
                entrada.aluno_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO presencas (id, turma_id, aluno_id, data, status, marcado_por)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(turma_id, aluno_id, data)
            DO UPDATE SET status = excluded.status, marcado_por = excluded.marcado_por
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(turma_id)
        .bind(&entrada.aluno_id)
        .bind(data)
        .bind(entrada.status.as_str())
        .bind(marcado_por)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        "✅ Chamada da turma '{}' em {} gravada ({} alunos).",
        turma_id,
        data,
        entradas.len()
    );
    Ok(entradas.len())
}

// --- Relatórios ---

/// Busca registos de presença com filtros opcionais de turma e intervalo de
/// datas. Com `professor_id` preenchido, só devolve turmas dessa conta.
pub async fn relatorio(
    db_pool: &SqlitePool,
    filtro: &FiltroRelatorio,
) -> AppResult<Vec<RegistoRelatorio>> {
    tracing::debug!("Gerando relatório (filtro: {:?})...", filtro);

    // A cláusula extra só entra quando o relatório é de um professor
    let join_professor = if filtro.professor_id.is_some() {
        "JOIN turma_professores tp ON tp.turma_id = pr.turma_id AND tp.professor_id = ?4"
    } else {
        ""
    };

    let sql = format!(
        r#"
        SELECT
            pr.data,
            pr.status,
            COALESCE(p.nome_completo, u.email) AS aluno,
            t.nome AS turma
        FROM presencas pr
        JOIN turmas t ON t.id = pr.turma_id
        JOIN users u ON u.id = pr.aluno_id
        LEFT JOIN perfis p ON p.user_id = u.id
        {join_professor}
        WHERE (?1 = '' OR pr.turma_id = ?1)
          AND (?2 = '' OR pr.data >= ?2)
          AND (?3 = '' OR pr.data <= ?3)
        ORDER BY pr.data DESC, t.nome ASC, aluno ASC
        LIMIT {LIMITE_RELATORIO}
        "#
    );

    // String vazia desliga o filtro correspondente (ver WHERE acima)
    let turma = filtro.turma_id.clone().unwrap_or_default();
    let de = filtro.de.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    let ate = filtro.ate.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    let mut q = sqlx::query_as::<_, RegistoRelatorio>(&sql)
        .bind(turma)
        .bind(de)
        .bind(ate);
    if let Some(professor_id) = &filtro.professor_id {
        q = q.bind(professor_id);
    }

    let registos = q.fetch_all(db_pool).await?;
    tracing::debug!("Relatório com {} registos.", registos.len());
    Ok(registos)
}

/// Percentagem de presença: presentes e atrasados contam a favor,
/// arredondada ao inteiro mais próximo. Sem registos, a taxa é 0.
pub fn taxa_presenca(favoraveis: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((favoraveis as f64 / total as f64) * 100.0).round() as i64
}

/// Resumo pessoal de um aluno: taxa geral, estatísticas por turma e os
/// registos mais recentes.
pub async fn resumo_aluno(db_pool: &SqlitePool, aluno_id: &str) -> AppResult<ResumoAluno> {
    let registos = sqlx::query_as::<_, RegistoAluno>(
        r#"
        SELECT pr.data, pr.status, t.id AS turma_id, t.nome AS turma_nome
        FROM presencas pr
        JOIN turmas t ON t.id = pr.turma_id
        WHERE pr.aluno_id = ?1
        ORDER BY pr.data DESC, t.nome ASC
        "#,
    )
    .bind(aluno_id)
    .fetch_all(db_pool)
    .await?;

    let mut resumo = ResumoAluno::default();
    let mut por_turma: BTreeMap<String, EstatisticasTurma> = BTreeMap::new();

    for registo in &registos {
        let stats = por_turma
            .entry(registo.turma_id.clone())
            .or_insert_with(|| EstatisticasTurma {
                turma_id: registo.turma_id.clone(),
                turma_nome: registo.turma_nome.clone(),
                ..Default::default()
            });
        // Status desconhecido (não devia acontecer, há CHECK na tabela)
        // conta como ausência para não inflacionar a taxa.
        match StatusPresenca::parse(&registo.status) {
            Some(StatusPresenca::Presente) => stats.presentes += 1,
            Some(StatusPresenca::Atrasado) => stats.atrasados += 1,
            _ => stats.ausentes += 1,
        }
        stats.total += 1;
    }

    let mut turmas: Vec<EstatisticasTurma> = por_turma.into_values().collect();
    for stats in &mut turmas {
        stats.taxa = taxa_presenca(stats.presentes + stats.atrasados, stats.total);
        resumo.total += stats.total;
        resumo.favoraveis += stats.presentes + stats.atrasados;
    }
    turmas.sort_by(|a, b| a.turma_nome.cmp(&b.turma_nome));

    resumo.taxa_geral = taxa_presenca(resumo.favoraveis, resumo.total);
    resumo.por_turma = turmas;
    let mut recentes = registos;
    recentes.truncate(10);
    resumo.recentes = recentes;
    Ok(resumo)
}

// --- Painéis ---

/// Turmas de um professor com a indicação de chamada já marcada hoje.
pub async fn painel_professor(
    db_pool: &SqlitePool,
    professor_id: &str,
    hoje: &str,
) -> AppResult<Vec<TurmaDoDia>> {
    let turmas = sqlx::query_as::<_, TurmaDoDia>(
        r#"
        SELECT
            t.id,
            t.nome,
            EXISTS(
                SELECT 1 FROM presencas pr WHERE pr.turma_id = t.id AND pr.data = ?2
            ) AS marcada_hoje
        FROM turma_professores tp
        JOIN turmas t ON t.id = tp.turma_id
        WHERE tp.professor_id = ?1
        ORDER BY t.nome ASC
        "#,
    )
    .bind(professor_id)
    .bind(hoje)
    .fetch_all(db_pool)
    .await?;
    Ok(turmas)
}

/// Números globais para o painel do admin, incluindo a tendência dos
/// últimos 7 dias (hoje incluído).
pub async fn painel_admin(db_pool: &SqlitePool, hoje: NaiveDate) -> AppResult<PainelAdmin> {
    let total_alunos: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role = 'aluno'")
            .fetch_one(db_pool)
            .await?;
    let total_professores: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role = 'professor'")
            .fetch_one(db_pool)
            .await?;
    let total_turmas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM turmas")
        .fetch_one(db_pool)
        .await?;
    let total_registos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM presencas")
        .fetch_one(db_pool)
        .await?;
    let favoraveis: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM presencas WHERE status IN ('presente', 'atrasado')",
    )
    .fetch_one(db_pool)
    .await?;

    let mut tendencia = Vec::with_capacity(7);
    for atras in (0..7).rev() {
        let dia = hoje - Duration::days(atras);
        let dia_str = dia.format("%Y-%m-%d").to_string();
        let (total, favoraveis) = contagens_dia(db_pool, &dia_str).await?;
        tendencia.push(DiaTendencia {
            data: dia_str,
            rotulo: rotulo_dia_semana(dia).to_string(),
            taxa: taxa_presenca(favoraveis, total),
            total,
        });
    }

    Ok(PainelAdmin {
        total_alunos,
        total_professores,
        total_turmas,
        taxa_geral: taxa_presenca(favoraveis, total_registos),
        total_registos,
        tendencia,
    })
}

async fn contagens_dia(db_pool: &SqlitePool, dia: &str) -> AppResult<(i64, i64)> {
    let contagens: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN status IN ('presente', 'atrasado') THEN 1 ELSE 0 END), 0)
        FROM presencas
        WHERE data = ?1
        "#,
    )
    .bind(dia)
    .fetch_one(db_pool)
    .await?;
    Ok(contagens)
}

fn rotulo_dia_semana(dia: NaiveDate) -> &'static str {
    match dia.weekday() {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}
