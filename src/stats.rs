//! Hard-coded SUSEP/SAEB figures shown on the dashboard.
//!
//! These are pre-aggregated presentation numbers, not derived from the counts
//! CSV in view. They are kept literal on purpose: the CSV only carries
//! per-municipality totals and cannot reproduce the schooling, age or gender
//! breakdowns.

pub struct LabeledCount {
    pub label: &'static str,
    pub count: u64,
}

pub struct Kpi {
    pub label: &'static str,
    pub value: &'static str,
}

pub struct ProposalCard {
    pub title: &'static str,
    pub body: &'static str,
}

/// Act 1 headline cards, aggregated SUSEP registrations 2019-2024.
pub const KPIS: [Kpi; 3] = [
    Kpi {
        label: "Total de Registros de Infrações (2019-2024)",
        value: "428.414",
    },
    Kpi {
        label: "% Infratores sem Educação Básica",
        value: "65,33%",
    },
    Kpi {
        label: "% Infratores Jovens (12-23 anos)",
        value: "49,00%",
    },
];

pub const SCHOOLING: [LabeledCount; 9] = [
    LabeledCount { label: "Alfabetizado", count: 158_759 },
    LabeledCount { label: "Ensino Fundamental Incompleto", count: 81_045 },
    LabeledCount { label: "Ensino Fundamental Completo", count: 56_132 },
    LabeledCount { label: "Não Infomada", count: 51_757 },
    LabeledCount { label: "Ensino Médio Completo", count: 34_762 },
    LabeledCount { label: "Ensino Médio Incompleto", count: 22_011 },
    LabeledCount { label: "Não Alfabetizado", count: 18_079 },
    LabeledCount { label: "Superior Incompleto", count: 3_351 },
    LabeledCount { label: "Superior Completo", count: 2_518 },
];

/// Top 8 age bands, already sorted by count.
pub const AGE_BANDS: [LabeledCount; 8] = [
    LabeledCount { label: "18 até 23 anos", count: 123_224 },
    LabeledCount { label: "12 até 17 anos", count: 86_706 },
    LabeledCount { label: "24 até 29 anos", count: 78_689 },
    LabeledCount { label: "30 até 35 anos", count: 52_128 },
    LabeledCount { label: "36 até 41 anos", count: 33_124 },
    LabeledCount { label: "42 até 47 anos", count: 19_956 },
    LabeledCount { label: "48 até 53 anos", count: 11_654 },
    LabeledCount { label: "Não Identificada", count: 10_568 },
];

pub const GENDER_SPLIT: [LabeledCount; 3] = [
    LabeledCount { label: "Masculino", count: 366_722 },
    LabeledCount { label: "Feminino", count: 58_425 },
    LabeledCount { label: "Não Informado", count: 3_267 },
];

/// Act 2 bullet findings, SAEB high-school survey for Ceará.
pub const SAEB_FINDINGS: [&str; 3] = [
    "14% dos alunos da rede pública já foram reprovados.",
    "21,28% dos alunos estão no \"grupo de risco\": planejam 'Somente trabalhar' \
     (13,05%) ou 'Não sabem' (8,23%) o que fazer após a escola.",
    "Apenas 4,4% podem se dar ao luxo de \"Somente continuar estudando\".",
];

pub const PROPOSALS: [ProposalCard; 3] = [
    ProposalCard {
        title: "1. Inspiração e Mentoria",
        body: "Criar um programa de mentoria com egressos da UFC de origem pública \
               para construir 'capital cultural' e perspectiva.",
    },
    ProposalCard {
        title: "2. Gamificação (Reconhecimento e Incentivo)",
        body: "Lançar um app de quiz (ENEM/Escolar) com rankings e prêmios (tablets, \
               etc.) para engajar pelo jogo e pela competição.",
    },
    ProposalCard {
        title: "3. Viabilidade (Acesso à Permanência)",
        body: "Divulgar ativamente os auxílios e bolsas da UFC (RU, moradia) para \
               transformar o sonho em um plano financeiro concreto.",
    },
];

/// pt-BR thousands grouping: 428414 -> "428.414".
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.000");
        assert_eq!(format_count(428_414), "428.414");
        assert_eq!(format_count(1_234_567), "1.234.567");
    }

    #[test]
    fn gender_split_sums_to_total_registrations() {
        let total: u64 = GENDER_SPLIT.iter().map(|g| g.count).sum();
        assert_eq!(total, 428_414);
    }
}
