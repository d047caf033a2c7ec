// src/models/presenca.rs
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;

/// Estados possíveis de uma marcação. Persistidos como TEXT minúsculo
/// (o CHECK da tabela 'presencas' só aceita estes três).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPresenca {
    Presente,
    Ausente,
    Atrasado,
}

impl StatusPresenca {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusPresenca::Presente => "presente",
            StatusPresenca::Ausente => "ausente",
            StatusPresenca::Atrasado => "atrasado",
        }
    }

    pub fn parse(valor: &str) -> Option<StatusPresenca> {
        match valor {
            "presente" => Some(StatusPresenca::Presente),
            "ausente" => Some(StatusPresenca::Ausente),
            "atrasado" => Some(StatusPresenca::Atrasado),
            _ => None,
        }
    }

    /// Nome legível para a interface.
    pub fn rotulo(&self) -> &'static str {
        match self {
            StatusPresenca::Presente => "Presente",
            StatusPresenca::Ausente => "Ausente",
            StatusPresenca::Atrasado => "Atrasado",
        }
    }
}

/// Linha da grelha de chamada: um aluno inscrito e o estado desse dia.
/// Sem marcação gravada, o estado vem como 'presente' (padrão da grelha).
#[derive(Debug, FromRow)]
pub struct LinhaChamada {
    pub aluno_id: String,
    pub nome: String,
    pub status: String,
}

/// Payload JSON enviado pela grelha de chamada do professor.
#[derive(Debug, Deserialize)]
pub struct ChamadaPayload {
    pub turma_id: String,
    pub data: String, // YYYY-MM-DD
    pub entradas: Vec<EntradaChamada>,
}

#[derive(Debug, Deserialize)]
pub struct EntradaChamada {
    pub aluno_id: String,
    pub status: StatusPresenca,
}

/// Registo de presença já juntado com nomes, para os relatórios.
#[derive(Debug, Clone, FromRow)]
pub struct RegistoRelatorio {
    pub data: String,
    pub status: String,
    pub aluno: String,
    pub turma: String,
}

/// Registo individual de um aluno, com a turma resolvida.
#[derive(Debug, Clone, FromRow)]
pub struct RegistoAluno {
    pub data: String,
    pub status: String,
    pub turma_id: String,
    pub turma_nome: String,
}

/// Filtros aceites pelos relatórios. `None` = sem restrição nesse eixo.
/// `professor_id` limita às turmas que esse professor leciona.
#[derive(Debug, Default)]
pub struct FiltroRelatorio {
    pub turma_id: Option<String>,
    pub professor_id: Option<String>,
    pub de: Option<NaiveDate>,
    pub ate: Option<NaiveDate>,
}

// --- Estruturas Auxiliares para os Painéis ---

/// Contagens de presença de um aluno numa turma.
#[derive(Debug, Clone, Default)]
pub struct EstatisticasTurma {
    pub turma_id: String,
    pub turma_nome: String,
    pub presentes: i64,
    pub ausentes: i64,
    pub atrasados: i64,
    pub total: i64,
    pub taxa: i64,
}

/// Resumo de um aluno: taxa geral, detalhe por turma e registos recentes.
#[derive(Debug, Default)]
pub struct ResumoAluno {
    pub taxa_geral: i64,
    pub total: i64,
    pub favoraveis: i64, // presentes + atrasados
    pub por_turma: Vec<EstatisticasTurma>,
    pub recentes: Vec<RegistoAluno>,
}

/// Turma no painel do professor, com indicação de chamada já feita hoje.
#[derive(Debug, FromRow)]
pub struct TurmaDoDia {
    pub id: String,
    pub nome: String,
    pub marcada_hoje: bool,
}

/// Um dia no gráfico de tendência do painel do admin.
#[derive(Debug)]
pub struct DiaTendencia {
    pub data: String,
    pub rotulo: String, // "Seg", "Ter", ...
    pub taxa: i64,
    pub total: i64, // marcações do dia (0 = sem dados)
}

/// Números agregados do painel do admin.
#[derive(Debug, Default)]
pub struct PainelAdmin {
    pub total_alunos: i64,
    pub total_professores: i64,
    pub total_turmas: i64,
    pub taxa_geral: i64,
    pub total_registos: i64,
    pub tendencia: Vec<DiaTendencia>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fecha_o_ciclo_com_as_str() {
        for status in [
            StatusPresenca::Presente,
            StatusPresenca::Ausente,
            StatusPresenca::Atrasado,
        ] {
            assert_eq!(StatusPresenca::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_recusa_valores_fora_do_check() {
        assert_eq!(StatusPresenca::parse(""), None);
        assert_eq!(StatusPresenca::parse("Presente"), None);
        assert_eq!(StatusPresenca::parse("faltou"), None);
    }
}
