// tests/relatorios_tests.rs
mod common;

use chamada::{
    models::{
        presenca::{EntradaChamada, FiltroRelatorio, StatusPresenca},
        user::Role,
    },
    services::{presenca_service, turma_service},
};
use chrono::{Duration, NaiveDate};
use sqlx::SqlitePool;

async fn marcar(
    pool: &SqlitePool,
    turma: &str,
    professor: &str,
    aluno: &str,
    data: &str,
    status: StatusPresenca,
) {
    let entradas = [EntradaChamada {
        aluno_id: aluno.to_string(),
        status,
    }];
    presenca_service::registar_chamada(pool, turma, data, professor, &entradas)
        .await
        .expect("registar chamada");
}

#[tokio::test]
async fn filtro_por_turma_e_intervalo_de_datas() {
    let pool = common::pool_de_teste().await;
    let professor = common::criar_conta(
        &pool,
        "Ana Prof",
        "ana@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let aluno1 = common::criar_conta(
        &pool,
        "Bruno",
        "bruno@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;
    let aluno2 = common::criar_conta(
        &pool,
        "Diana",
        "diana@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;
    let turma_a = common::criar_turma(&pool, "7ºA").await;
    let turma_b = common::criar_turma(&pool, "7ºB").await;
    for turma in [&turma_a, &turma_b] {
        turma_service::atribuir_professor(&pool, turma, &professor)
            .await
            .expect("atribuir professor");
    }
    turma_service::inscrever_aluno(&pool, &turma_a, &aluno1)
        .await
        .expect("inscrever aluno");
    turma_service::inscrever_aluno(&pool, &turma_b, &aluno2)
        .await
        .expect("inscrever aluno");

    marcar(&pool, &turma_a, &professor, &aluno1, "2025-03-01", StatusPresenca::Presente).await;
    marcar(&pool, &turma_a, &professor, &aluno1, "2025-03-05", StatusPresenca::Ausente).await;
    marcar(&pool, &turma_a, &professor, &aluno1, "2025-03-10", StatusPresenca::Presente).await;
    marcar(&pool, &turma_b, &professor, &aluno2, "2025-03-05", StatusPresenca::Presente).await;

    // Turma + intervalo, com as duas pontas incluídas
    let filtro = FiltroRelatorio {
        turma_id: Some(turma_a.clone()),
        professor_id: None,
        de: NaiveDate::from_ymd_opt(2025, 3, 1),
        ate: NaiveDate::from_ymd_opt(2025, 3, 5),
    };
    let registos = presenca_service::relatorio(&pool, &filtro)
        .await
        .expect("gerar relatório");
    assert_eq!(registos.len(), 2);
    assert_eq!(registos[0].data, "2025-03-05", "mais recente primeiro");
    assert_eq!(registos[1].data, "2025-03-01");
    assert!(registos.iter().all(|r| r.turma == "7ºA"));

    // Sem filtros vem tudo
    let registos = presenca_service::relatorio(&pool, &FiltroRelatorio::default())
        .await
        .expect("gerar relatório");
    assert_eq!(registos.len(), 4);
}

#[tokio::test]
async fn relatorio_para_no_tecto_de_200_registos() {
    let pool = common::pool_de_teste().await;
    let professor = common::criar_conta(
        &pool,
        "Ana Prof",
        "ana@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let turma = common::criar_turma(&pool, "7ºA").await;
    turma_service::atribuir_professor(&pool, &turma, &professor)
        .await
        .expect("atribuir professor");

    let mut alunos = Vec::new();
    for n in 0..5 {
        let aluno = common::criar_conta(
            &pool,
            &format!("Aluno {}", n),
            &format!("aluno{}@escola.pt", n),
            "senha123",
            Some(Role::Aluno),
        )
        .await;
        turma_service::inscrever_aluno(&pool, &turma, &aluno)
            .await
            .expect("inscrever aluno");
        alunos.push(aluno);
    }

    // 41 dias x 5 alunos = 205 registos, 5 acima do tecto
    let inicio = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    for dia in 0..41 {
        let data = (inicio + Duration::days(dia)).format("%Y-%m-%d").to_string();
        let entradas: Vec<EntradaChamada> = alunos
            .iter()
            .map(|aluno| EntradaChamada {
                aluno_id: aluno.clone(),
                status: StatusPresenca::Presente,
            })
            .collect();
        presenca_service::registar_chamada(&pool, &turma, &data, &professor, &entradas)
            .await
            .expect("registar chamada");
    }

    let registos = presenca_service::relatorio(&pool, &FiltroRelatorio::default())
        .await
        .expect("gerar relatório");
    assert_eq!(registos.len(), 200);
    // O tecto corta os dias mais antigos, nunca os mais recentes
    assert_eq!(registos[0].data, "2025-04-10");
    assert_eq!(registos[199].data, "2025-03-02");
    assert!(registos.iter().all(|r| r.data != "2025-03-01"));
}

#[tokio::test]
async fn professor_so_ve_as_suas_turmas() {
    let pool = common::pool_de_teste().await;
    let prof_a = common::criar_conta(
        &pool,
        "Ana Prof",
        "ana@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let prof_b = common::criar_conta(
        &pool,
        "Carlos Prof",
        "carlos@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let aluno = common::criar_conta(
        &pool,
        "Bruno",
        "bruno@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;
    let turma_a = common::criar_turma(&pool, "7ºA").await;
    let turma_b = common::criar_turma(&pool, "7ºB").await;
    turma_service::atribuir_professor(&pool, &turma_a, &prof_a)
        .await
        .expect("atribuir professor");
    turma_service::atribuir_professor(&pool, &turma_b, &prof_b)
        .await
        .expect("atribuir professor");
    turma_service::inscrever_aluno(&pool, &turma_a, &aluno)
        .await
        .expect("inscrever aluno");
    turma_service::inscrever_aluno(&pool, &turma_b, &aluno)
        .await
        .expect("inscrever aluno");

    marcar(&pool, &turma_a, &prof_a, &aluno, "2025-03-10", StatusPresenca::Presente).await;
    marcar(&pool, &turma_b, &prof_b, &aluno, "2025-03-10", StatusPresenca::Ausente).await;

    let filtro = FiltroRelatorio {
        professor_id: Some(prof_a.clone()),
        ..Default::default()
    };
    let registos = presenca_service::relatorio(&pool, &filtro)
        .await
        .expect("gerar relatório");
    assert_eq!(registos.len(), 1);
    assert_eq!(registos[0].turma, "7ºA");
}

#[tokio::test]
async fn resumo_do_aluno_soma_por_turma_e_arredonda() {
    let pool = common::pool_de_teste().await;
    let professor = common::criar_conta(
        &pool,
        "Ana Prof",
        "ana@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let aluno = common::criar_conta(
        &pool,
        "Bruno",
        "bruno@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;
    let turma_a = common::criar_turma(&pool, "7ºA").await;
    let turma_b = common::criar_turma(&pool, "Ginástica").await;
    for turma in [&turma_a, &turma_b] {
        turma_service::atribuir_professor(&pool, turma, &professor)
            .await
            .expect("atribuir professor");
        turma_service::inscrever_aluno(&pool, turma, &aluno)
            .await
            .expect("inscrever aluno");
    }

    marcar(&pool, &turma_a, &professor, &aluno, "2025-03-01", StatusPresenca::Presente).await;
    marcar(&pool, &turma_a, &professor, &aluno, "2025-03-02", StatusPresenca::Presente).await;
    marcar(&pool, &turma_a, &professor, &aluno, "2025-03-03", StatusPresenca::Atrasado).await;
    marcar(&pool, &turma_b, &professor, &aluno, "2025-03-04", StatusPresenca::Presente).await;
    marcar(&pool, &turma_b, &professor, &aluno, "2025-03-05", StatusPresenca::Ausente).await;

    let resumo = presenca_service::resumo_aluno(&pool, &aluno)
        .await
        .expect("resumo do aluno");

    // 4 registos favoráveis em 5 (atraso conta a favor)
    assert_eq!(resumo.total, 5);
    assert_eq!(resumo.favoraveis, 4);
    assert_eq!(resumo.taxa_geral, 80);

    assert_eq!(resumo.por_turma.len(), 2);
    let a = &resumo.por_turma[0];
    assert_eq!(a.turma_nome, "7ºA");
    assert_eq!((a.presentes, a.atrasados, a.ausentes), (2, 1, 0));
    assert_eq!(a.taxa, 100);
    let b = &resumo.por_turma[1];
    assert_eq!(b.turma_nome, "Ginástica");
    assert_eq!((b.presentes, b.atrasados, b.ausentes), (1, 0, 1));
    assert_eq!(b.taxa, 50);

    // Recentes em ordem descendente de data
    assert_eq!(resumo.recentes[0].data, "2025-03-05");
    assert_eq!(resumo.recentes[0].turma_nome, "Ginástica");
}

#[tokio::test]
async fn aluno_sem_registos_fica_a_zero() {
    let pool = common::pool_de_teste().await;
    let aluno = common::criar_conta(
        &pool,
        "Bruno",
        "bruno@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;

    let resumo = presenca_service::resumo_aluno(&pool, &aluno)
        .await
        .expect("resumo do aluno");
    assert_eq!(resumo.taxa_geral, 0);
    assert_eq!(resumo.total, 0);
    assert!(resumo.por_turma.is_empty());
    assert!(resumo.recentes.is_empty());
}

#[tokio::test]
async fn painel_do_professor_assinala_chamada_de_hoje() {
    let pool = common::pool_de_teste().await;
    let professor = common::criar_conta(
        &pool,
        "Ana Prof",
        "ana@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let aluno = common::criar_conta(
        &pool,
        "Bruno",
        "bruno@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;
    let turma_a = common::criar_turma(&pool, "7ºA").await;
    let turma_b = common::criar_turma(&pool, "7ºB").await;
    for turma in [&turma_a, &turma_b] {
        turma_service::atribuir_professor(&pool, turma, &professor)
            .await
            .expect("atribuir professor");
        turma_service::inscrever_aluno(&pool, turma, &aluno)
            .await
            .expect("inscrever aluno");
    }

    marcar(&pool, &turma_a, &professor, &aluno, "2025-05-10", StatusPresenca::Presente).await;

    let turmas = presenca_service::painel_professor(&pool, &professor, "2025-05-10")
        .await
        .expect("painel do professor");
    assert_eq!(turmas.len(), 2);
    assert_eq!(turmas[0].nome, "7ºA");
    assert!(turmas[0].marcada_hoje);
    assert!(!turmas[1].marcada_hoje);
}

#[tokio::test]
async fn painel_do_admin_conta_e_calcula_tendencia() {
    let pool = common::pool_de_teste().await;
    let professor = common::criar_conta(
        &pool,
        "Ana Prof",
        "ana@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let aluno1 = common::criar_conta(
        &pool,
        "Bruno",
        "bruno@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;
    let aluno2 = common::criar_conta(
        &pool,
        "Diana",
        "diana@escola.pt",
        "senha123",
        Some(Role::Aluno),
    )
    .await;
    let turma = common::criar_turma(&pool, "7ºA").await;
    turma_service::atribuir_professor(&pool, &turma, &professor)
        .await
        .expect("atribuir professor");
    for aluno in [&aluno1, &aluno2] {
        turma_service::inscrever_aluno(&pool, &turma, aluno)
            .await
            .expect("inscrever aluno");
    }

    // Ontem: todos presentes. Hoje: um ausente.
    let ontem = [
        EntradaChamada {
            aluno_id: aluno1.clone(),
            status: StatusPresenca::Presente,
        },
        EntradaChamada {
            aluno_id: aluno2.clone(),
            status: StatusPresenca::Presente,
        },
    ];
    presenca_service::registar_chamada(&pool, &turma, "2025-05-09", &professor, &ontem)
        .await
        .expect("chamada de ontem");
    let hoje = [
        EntradaChamada {
            aluno_id: aluno1.clone(),
            status: StatusPresenca::Presente,
        },
        EntradaChamada {
            aluno_id: aluno2.clone(),
            status: StatusPresenca::Ausente,
        },
    ];
    presenca_service::registar_chamada(&pool, &turma, "2025-05-10", &professor, &hoje)
        .await
        .expect("chamada de hoje");

    let dia = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    let painel = presenca_service::painel_admin(&pool, dia)
        .await
        .expect("painel do admin");

    assert_eq!(painel.total_alunos, 2);
    assert_eq!(painel.total_professores, 1);
    assert_eq!(painel.total_turmas, 1);
    assert_eq!(painel.total_registos, 4);
    assert_eq!(painel.taxa_geral, 75);

    // 7 dias, do mais antigo para hoje
    assert_eq!(painel.tendencia.len(), 7);
    assert_eq!(painel.tendencia[0].data, "2025-05-04");
    assert_eq!(painel.tendencia[0].total, 0);
    assert_eq!(painel.tendencia[0].taxa, 0);
    assert_eq!(painel.tendencia[5].data, "2025-05-09");
    assert_eq!(painel.tendencia[5].taxa, 100);
    assert_eq!(painel.tendencia[6].data, "2025-05-10");
    assert_eq!(painel.tendencia[6].taxa, 50);
    assert_eq!(painel.tendencia[6].total, 2);
}
