//! Financial tips from the text generator
//!
//! Generation never fails from the caller's point of view: when the backend
//! errors the configured fallback message is returned with the stats intact.

use serde::Serialize;
use tracing::{debug, error};

use crate::aggregate::expense_by_category;
use crate::ai::TextGenerator;
use crate::config::LedgerConfig;
use crate::export::format_brl;
use crate::models::PeriodStats;
use crate::window::Period;

#[derive(Debug, Clone, Serialize)]
pub struct TipsResponse {
    pub tips: String,
    pub stats: PeriodStats,
    /// True when `tips` is the fallback message
    pub fallback: bool,
}

fn period_label(period: Period) -> &'static str {
    match period {
        Period::Week => "semana",
        Period::Month => "mês",
        Period::Year => "ano",
    }
}

/// Prompt text summarizing the period for the generator
pub fn build_prompt(period: Period, stats: &PeriodStats) -> String {
    let categories = expense_by_category(&stats.transactions);
    let breakdown = if categories.is_empty() {
        "nenhuma".to_string()
    } else {
        categories
            .iter()
            .map(|(category, total)| format!("{}: {}", category, format_brl(*total)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Você é um assistente financeiro pessoal. Analise os dados abaixo e dê 3 dicas \
         práticas e curtas para melhorar as finanças do usuário.\n\n\
         Período: {}\n\
         Receitas totais: {}\n\
         Despesas totais: {}\n\
         Saldo: {}\n\
         Despesas por categoria: {}\n\n\
         Responda em português, de forma objetiva.",
        period_label(period),
        format_brl(stats.total_income),
        format_brl(stats.total_expense),
        format_brl(stats.balance),
        breakdown
    )
}

pub async fn generate_tips<G: TextGenerator + ?Sized>(
    generator: &G,
    period: Period,
    stats: PeriodStats,
    config: &LedgerConfig,
) -> TipsResponse {
    let prompt = build_prompt(period, &stats);
    debug!(model = generator.model(), period = period.as_str(), "Generating tips");

    match generator.generate(&prompt).await {
        Ok(text) if !text.trim().is_empty() => TipsResponse {
            tips: text.trim().to_string(),
            stats,
            fallback: false,
        },
        Ok(_) => {
            error!(model = generator.model(), "Text generator returned an empty response");
            TipsResponse::fallback(stats, config)
        }
        Err(e) => {
            error!(model = generator.model(), host = generator.host(), error = %e, "Tip generation failed");
            TipsResponse::fallback(stats, config)
        }
    }
}

impl TipsResponse {
    /// The configured fallback message with the stats unchanged
    pub fn fallback(stats: PeriodStats, config: &LedgerConfig) -> Self {
        Self {
            tips: config.fallback_tip.clone(),
            stats,
            fallback: true,
        }
    }
}
