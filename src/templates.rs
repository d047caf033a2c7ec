// src/templates.rs
use crate::models::{
    presenca::{EstatisticasTurma, LinhaChamada, PainelAdmin, RegistoAluno, RegistoRelatorio,
        StatusPresenca, TurmaDoDia},
    turma::{MembroTurma, Turma, TurmaComContagens},
    user::Role,
};
use askama::Template; // Trait necessário para Askama
use chrono::NaiveDate;

// Dados do cabeçalho, comuns a todas as páginas autenticadas
#[derive(Clone, Debug)]
pub struct NavInfo {
    pub nome: String,
    pub papel: &'static str,        // "admin", "professor", "aluno", "sem_papel"
    pub papel_rotulo: &'static str, // Versão para mostrar no cabeçalho
}

impl NavInfo {
    pub fn nova(nome: String, role: Role) -> Self {
        NavInfo {
            nome,
            papel: role.as_str(),
            papel_rotulo: role.rotulo(),
        }
    }
}

// Struct para o template `login.html` (external file in templates/ folder)
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    // Campo opcional para passar uma mensagem de erro para o template
    pub error: Option<String>,
}

// Página de espera para contas autenticadas mas ainda sem papel
#[derive(Template)]
#[template(path = "sem_papel.html")]
pub struct SemPapelPage {
    pub nav: NavInfo,
}

#[derive(Template)]
#[template(path = "nao_encontrado.html")]
pub struct NotFoundPage;

// --- Páginas do Admin ---

#[derive(Template)]
#[template(path = "admin_painel.html")]
pub struct AdminPainelPage {
    pub nav: NavInfo,
    pub painel: PainelAdmin,
}

// Linha da tabela de contas (a struct da query não serve direta no template)
#[derive(Clone, Debug)]
pub struct UserView {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub papel: String, // Valor cru ("admin", ... ou "") para pré-selecionar o select
    pub papel_rotulo: &'static str,
}

impl UserView {
    // Pré-seleciona o papel atual no select da tabela
    pub fn tem_papel(&self, papel: &str) -> bool {
        self.papel == papel
    }
}

#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersPage {
    pub nav: NavInfo,
    pub users: Vec<UserView>,
    // Texto da pesquisa, para re-preencher a caixa
    pub pesquisa: String,
    // Lista de todos os papéis atribuíveis (para os selects)
    pub all_defined_roles: &'static [&'static str],
    // Mensagens de feedback opcionais
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "admin_turmas.html")]
pub struct AdminTurmasPage {
    pub nav: NavInfo,
    pub turmas: Vec<TurmaComContagens>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "admin_turma.html")]
pub struct AdminTurmaPage {
    pub nav: NavInfo,
    pub turma: Turma,
    pub alunos: Vec<MembroTurma>,
    pub professores: Vec<MembroTurma>,
    // Contas elegíveis que ainda não são membros (para os selects)
    pub alunos_disponiveis: Vec<MembroTurma>,
    pub professores_disponiveis: Vec<MembroTurma>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

// --- Relatórios (admin e professor usam a mesma página) ---

// Linha de relatório já formatada para a interface
#[derive(Clone, Debug)]
pub struct RegistoView {
    pub data: String, // dd/mm/aaaa
    pub aluno: String,
    pub turma: String,
    pub status: String, // Valor cru, usado como classe CSS
    pub status_rotulo: &'static str,
}

impl RegistoView {
    fn nova(data: &str, status: &str, aluno: String, turma: String) -> Self {
        // Data irreconhecível passa como está, em vez de rebentar a página
        let data = NaiveDate::parse_from_str(data, "%Y-%m-%d")
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|_| data.to_string());
        let status_rotulo = StatusPresenca::parse(status)
            .map(|s| s.rotulo())
            .unwrap_or("Desconhecido");
        RegistoView {
            data,
            aluno,
            turma,
            status: status.to_string(),
            status_rotulo,
        }
    }

    pub fn de(registo: &RegistoRelatorio) -> Self {
        Self::nova(
            &registo.data,
            &registo.status,
            registo.aluno.clone(),
            registo.turma.clone(),
        )
    }

    // Os registos do próprio aluno não têm coluna de aluno
    pub fn de_aluno(registo: &RegistoAluno) -> Self {
        Self::nova(
            &registo.data,
            &registo.status,
            String::new(),
            registo.turma_nome.clone(),
        )
    }
}

#[derive(Template)]
#[template(path = "relatorios.html")]
pub struct RelatoriosPage {
    pub nav: NavInfo,
    // Links que mudam conforme a secção ("/admin" ou "/teacher")
    pub voltar: &'static str,
    pub base: &'static str,
    pub turmas: Vec<Turma>,
    pub registos: Vec<RegistoView>,
    // Valores dos filtros, para re-preencher o formulário
    pub filtro_turma: String,
    pub filtro_de: String,
    pub filtro_ate: String,
    pub limite_atingido: bool,
    pub error_message: Option<String>,
}

// --- Páginas do Professor ---

#[derive(Template)]
#[template(path = "professor_painel.html")]
pub struct ProfessorPainelPage {
    pub nav: NavInfo,
    pub hoje: String, // dd/mm/aaaa
    pub turmas: Vec<TurmaDoDia>,
}

#[derive(Template)]
#[template(path = "professor_chamada.html")]
pub struct ProfessorChamadaPage {
    pub nav: NavInfo,
    pub turmas: Vec<Turma>,
    pub turma_selecionada: String,
    pub data: String, // aaaa-mm-dd (formato do input date)
    pub linhas: Vec<LinhaChamada>,
    pub error_message: Option<String>,
}

// --- Página do Aluno ---

#[derive(Clone, Debug)]
pub struct ResumoView {
    pub taxa_geral: i64,
    pub total: i64,
    pub por_turma: Vec<EstatisticasTurma>,
    pub recentes: Vec<RegistoView>,
}

#[derive(Template)]
#[template(path = "aluno_painel.html")]
pub struct AlunoPainelPage {
    pub nav: NavInfo,
    pub resumo: ResumoView,
}
