// src/models/turma.rs
use sqlx::FromRow;

// --- Estruturas que espelham as Tabelas da DB ---

#[derive(Debug, Clone, FromRow)]
pub struct Turma {
    pub id: String, // UUID
    pub nome: String,
    pub descricao: Option<String>,
}

// --- Estruturas Auxiliares para as Listagens ---

/// Turma com totais de membros, para a listagem do admin.
#[derive(Debug, FromRow)]
pub struct TurmaComContagens {
    pub id: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub total_alunos: i64,
    pub total_professores: i64,
}

/// Membro (aluno ou professor) de uma turma, com o nome já resolvido.
#[derive(Debug, Clone, FromRow)]
pub struct MembroTurma {
    pub user_id: String,
    pub nome: String,
    pub email: String,
}
