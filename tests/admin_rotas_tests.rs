// tests/admin_rotas_tests.rs
//
// Fluxos de gestão do admin: formulários Post/Redirect/Get de contas,
// papéis, turmas e membros.
mod common;

use axum::http::StatusCode;
use chamada::{
    models::user::Role,
    services::{turma_service, user_service},
};
use sqlx::SqlitePool;

async fn app_com_admin(pool: &SqlitePool) -> (axum::Router, String) {
    common::criar_conta(pool, "Ana Admin", "ana@escola.pt", "senha123", Some(Role::Admin)).await;
    let app = common::app_de_teste(pool.clone()).await;
    let cookie = common::login(&app, "ana@escola.pt", "senha123").await;
    (app, cookie)
}

#[tokio::test]
async fn criar_conta_pelo_formulario() {
    let pool = common::pool_de_teste().await;
    let (app, cookie) = app_com_admin(&pool).await;

    let corpo = "nome_completo=Bruno+Silva&email=bruno%40escola.pt&password=senha123&role=aluno";
    let response = common::post_form(&app, "/admin/users/create", corpo, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location_de(&response).starts_with("/admin/users?success="));

    let user = user_service::find_user_by_email(&pool, "bruno@escola.pt")
        .await
        .expect("procurar conta")
        .expect("conta criada");
    let role = user_service::get_user_role(&pool, &user.id)
        .await
        .expect("papel da conta");
    assert_eq!(role, Role::Aluno);

    // A conta nova consegue entrar (o login confirma o 303 por dentro)
    common::login(&app, "bruno@escola.pt", "senha123").await;
}

#[tokio::test]
async fn criar_conta_recusa_dados_maus() {
    let pool = common::pool_de_teste().await;
    let (app, cookie) = app_com_admin(&pool).await;

    // Email repetido, senha curta e papel desconhecido voltam todos com erro
    for corpo in [
        "nome_completo=Outra+Ana&email=ana%40escola.pt&password=senha123&role=aluno",
        "nome_completo=Bruno&email=bruno%40escola.pt&password=12345&role=aluno",
        "nome_completo=Bruno&email=bruno%40escola.pt&password=senha123&role=chefe",
    ] {
        let response = common::post_form(&app, "/admin/users/create", corpo, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "corpo {}", corpo);
        assert!(
            common::location_de(&response).starts_with("/admin/users?error="),
            "corpo {}",
            corpo
        );
    }

    // Nenhuma das tentativas criou a conta
    let user = user_service::find_user_by_email(&pool, "bruno@escola.pt")
        .await
        .expect("procurar conta");
    assert!(user.is_none());
}

#[tokio::test]
async fn mudar_e_limpar_papel_pelo_formulario() {
    let pool = common::pool_de_teste().await;
    let carlos = common::criar_conta(
        &pool,
        "Carlos",
        "carlos@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let (app, cookie) = app_com_admin(&pool).await;

    let uri = format!("/admin/users/{}/role", carlos);
    let response = common::post_form(&app, &uri, "role=aluno", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location_de(&response).starts_with("/admin/users?success="));
    let role = user_service::get_user_role(&pool, &carlos).await.expect("papel");
    assert_eq!(role, Role::Aluno);

    // "role=" vazio limpa o papel
    let response = common::post_form(&app, &uri, "role=", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let role = user_service::get_user_role(&pool, &carlos).await.expect("papel");
    assert_eq!(role, Role::NaoAtribuido);

    // Conta inexistente volta com erro
    let response =
        common::post_form(&app, "/admin/users/fantasma/role", "role=aluno", Some(&cookie)).await;
    assert!(common::location_de(&response).starts_with("/admin/users?error="));
}

#[tokio::test]
async fn turma_criada_e_apagada_pelas_rotas() {
    let pool = common::pool_de_teste().await;
    let (app, cookie) = app_com_admin(&pool).await;

    let corpo = "nome=7%C2%BAA&descricao=Turma+da+manh%C3%A3";
    let response = common::post_form(&app, "/admin/classes/create", corpo, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location_de(&response).starts_with("/admin/classes?success="));

    let turmas = turma_service::listar_turmas(&pool).await.expect("listar turmas");
    assert_eq!(turmas.len(), 1);
    assert_eq!(turmas[0].nome, "7ºA");
    assert_eq!(turmas[0].descricao.as_deref(), Some("Turma da manhã"));

    // Nome vazio é recusado
    let response = common::post_form(&app, "/admin/classes/create", "nome=", Some(&cookie)).await;
    assert!(common::location_de(&response).starts_with("/admin/classes?error="));

    let uri = format!("/admin/classes/{}/delete", turmas[0].id);
    let response = common::post_form(&app, &uri, "", Some(&cookie)).await;
    assert!(common::location_de(&response).starts_with("/admin/classes?success="));
    let turmas = turma_service::listar_turmas(&pool).await.expect("listar turmas");
    assert!(turmas.is_empty());

    // Apagar duas vezes: a segunda volta com erro
    let response = common::post_form(&app, &uri, "", Some(&cookie)).await;
    assert!(common::location_de(&response).starts_with("/admin/classes?error="));
}

#[tokio::test]
async fn gestao_de_membros_pelas_rotas() {
    let pool = common::pool_de_teste().await;
    let bruno = common::criar_conta(&pool, "Bruno", "bruno@escola.pt", "senha123", Some(Role::Aluno)).await;
    let carlos = common::criar_conta(
        &pool,
        "Carlos",
        "carlos@escola.pt",
        "senha123",
        Some(Role::Professor),
    )
    .await;
    let turma = common::criar_turma(&pool, "7ºA").await;
    let (app, cookie) = app_com_admin(&pool).await;

    // Inscreve o aluno e atribui o professor
    let uri = format!("/admin/classes/{}/alunos", turma);
    let corpo = format!("user_id={}", bruno);
    let response = common::post_form(&app, &uri, &corpo, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location_de(&response)
        .starts_with(&format!("/admin/classes/{}?success=", turma)));

    let uri = format!("/admin/classes/{}/professores", turma);
    let corpo = format!("user_id={}", carlos);
    let response = common::post_form(&app, &uri, &corpo, Some(&cookie)).await;
    assert!(common::location_de(&response)
        .starts_with(&format!("/admin/classes/{}?success=", turma)));

    let alunos = turma_service::alunos_da_turma(&pool, &turma).await.expect("alunos");
    let professores = turma_service::professores_da_turma(&pool, &turma).await.expect("professores");
    assert_eq!(alunos.len(), 1);
    assert_eq!(professores.len(), 1);

    // Uma conta de professor não entra na lista de alunos
    let uri = format!("/admin/classes/{}/alunos", turma);
    let corpo = format!("user_id={}", carlos);
    let response = common::post_form(&app, &uri, &corpo, Some(&cookie)).await;
    assert!(common::location_de(&response)
        .starts_with(&format!("/admin/classes/{}?error=", turma)));

    // E a remoção esvazia as duas listas
    let uri = format!("/admin/classes/{}/alunos/{}/remover", turma, bruno);
    common::post_form(&app, &uri, "", Some(&cookie)).await;
    let uri = format!("/admin/classes/{}/professores/{}/remover", turma, carlos);
    common::post_form(&app, &uri, "", Some(&cookie)).await;

    let alunos = turma_service::alunos_da_turma(&pool, &turma).await.expect("alunos");
    let professores = turma_service::professores_da_turma(&pool, &turma).await.expect("professores");
    assert!(alunos.is_empty());
    assert!(professores.is_empty());
}

#[tokio::test]
async fn detalhe_da_turma_mostra_membros_e_disponiveis() {
    let pool = common::pool_de_teste().await;
    let bruno = common::criar_conta(&pool, "Bruno", "bruno@escola.pt", "senha123", Some(Role::Aluno)).await;
    common::criar_conta(&pool, "Diana", "diana@escola.pt", "senha123", Some(Role::Aluno)).await;
    let turma = common::criar_turma(&pool, "7ºA").await;
    turma_service::inscrever_aluno(&pool, &turma, &bruno)
        .await
        .expect("inscrever aluno");
    let (app, cookie) = app_com_admin(&pool).await;

    let uri = format!("/admin/classes/{}", turma);
    let response = common::get_com_cookie(&app, &uri, &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let corpo = common::corpo_como_texto(response).await;
    assert!(corpo.contains("7ºA"));
    // Bruno já é membro; Diana aparece no select de disponíveis
    assert!(corpo.contains("Bruno"));
    assert!(corpo.contains("Diana"));

    // Turma inexistente manda de volta para a lista
    let response = common::get_com_cookie(&app, "/admin/classes/fantasma", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location_de(&response).starts_with("/admin/classes?error="));
}

#[tokio::test]
async fn paginas_do_admin_respondem() {
    let pool = common::pool_de_teste().await;
    let (app, cookie) = app_com_admin(&pool).await;

    for uri in ["/admin", "/admin/users", "/admin/classes", "/admin/reports"] {
        let response = common::get_com_cookie(&app, uri, &cookie).await;
        assert_eq!(response.status(), StatusCode::OK, "rota {}", uri);
    }

    // A pesquisa de contas filtra pela query string. O email só aparece
    // na tabela (o cabeçalho mostra apenas o nome), por isso serve de prova.
    let response = common::get_com_cookie(&app, "/admin/users?q=ana", &cookie).await;
    let corpo = common::corpo_como_texto(response).await;
    assert!(corpo.contains("ana@escola.pt"));
    let response = common::get_com_cookie(&app, "/admin/users?q=ninguem", &cookie).await;
    let corpo = common::corpo_como_texto(response).await;
    assert!(!corpo.contains("ana@escola.pt"));
}
