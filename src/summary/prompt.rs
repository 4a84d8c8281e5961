//! Prompt construction for the triage summary.

use crate::roster::Patient;

use super::context::format_context;

/// System role for the summary call.
pub const SUMMARY_SYSTEM_PROMPT: &str =
    "Você é um assistente médico especializado em oncologia.";

/// Rendered alert list when no journey delay was identified.
const NO_DELAY_LINE: &str = "Nenhum atraso identificado.";

/// Build the structured instruction sent as the user turn.
///
/// The output contract pins the model to a single JSON object with
/// exactly the four keys the dashboard consumes; everything else in the
/// prompt is context for filling them.
pub fn build_summary_prompt(patient: &Patient, message: &str, alerts: &[String]) -> String {
    let alerts_line = if alerts.is_empty() {
        NO_DELAY_LINE.to_string()
    } else {
        alerts.join(" ")
    };

    format!(
        r#"**Contexto do Paciente:**
- ID: {id}
- Tipo de Câncer: {cancer_type}
- Estadiamento: {stage}
- Dados: {context}
- Alertas de Atraso na Jornada: {alerts_line}

**Mensagem do Paciente:**
"{message}"

**Sua Tarefa:**
Você organiza informações para médicos oncologistas. Analise a mensagem do paciente e os dados de contexto. Sua única saída deve ser um objeto JSON com os seguintes campos:

1. `sintomas`: lista de todos os sintomas mencionados na mensagem. Se nenhum for mencionado, retorne uma lista vazia.
2. `pontos_relevantes`: lista de outros pontos importantes, como menção a medicamentos, exames, efeitos colaterais ou dúvidas específicas.
3. `sugestao_plano_acao`: de 2 a 3 perguntas que o médico pode fazer para investigar melhor o estado do paciente, considerando o tipo de câncer, o estadiamento e o conteúdo da mensagem. As perguntas devem ser diretas e focadas.
4. `nivel_urgencia`: 'Baixa', 'Média' ou 'Alta', com base na gravidade dos sintomas descritos.

Responda APENAS com o objeto JSON. Não inclua nenhuma outra palavra ou explicação antes ou depois do JSON."#,
        id = patient.id,
        cancer_type = patient.cancer.cancer_type.as_deref().unwrap_or("-"),
        stage = patient.cancer.stage.as_deref().unwrap_or("-"),
        context = format_context(patient),
    )
}
