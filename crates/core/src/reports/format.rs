//! Conversational (pt-BR) message templates.

use ara_shared::types::Money;
use rust_decimal::Decimal;

use crate::access::TRIAL_TRANSACTION_LIMIT;
use crate::ledger::{Period, PeriodSummary, SubscriptionStatus, User};

/// Remaining-count at or below which the trial message turns into a warning.
pub const LOW_REMAINING_WARNING: i32 = 10;

fn brl(amount: Decimal) -> Money {
    Money::brl(amount)
}

fn header(period: Period) -> &'static str {
    match period {
        Period::Today => "📊 **Resumo de hoje:**",
        Period::Week => "📈 **Resumo da semana:**",
        Period::Month => "📅 **Resumo do mês:**",
    }
}

/// Narrative summary of a period for the chat channel.
#[must_use]
pub fn conversational_summary(summary: &PeriodSummary, user: &User) -> String {
    let mut out = format!("{}\n\n", header(summary.period));

    if summary.total_income > Decimal::ZERO {
        out.push_str(&format!("💰 **Receitas:** {}\n", brl(summary.total_income)));
    }
    if summary.total_expenses > Decimal::ZERO {
        out.push_str(&format!("💸 **Despesas:** {}\n", brl(summary.total_expenses)));
    }

    out.push('\n');
    match summary.profit.cmp(&Decimal::ZERO) {
        std::cmp::Ordering::Greater => {
            out.push_str(&format!("✅ **Lucro:** {}\n", brl(summary.profit)));
        }
        std::cmp::Ordering::Less => {
            out.push_str(&format!("❌ **Prejuízo:** {}\n", brl(-summary.profit)));
        }
        std::cmp::Ordering::Equal => out.push_str("⚖️ **Empate:** R$ 0,00\n"),
    }

    out.push_str(&format!("\n📝 **Total de transações:** {}\n", summary.transaction_count));

    if user.subscription_status == SubscriptionStatus::Trial {
        let remaining = TRIAL_TRANSACTION_LIMIT - user.trial_transactions_count;
        out.push_str(&format!("\n🎯 **Transações restantes no teste:** {remaining}\n"));
    }

    out
}

/// Trial/subscription status line.
#[must_use]
pub fn trial_status_message(user: &User) -> String {
    if user.subscription_status == SubscriptionStatus::Active {
        return "✅ Sua assinatura está ativa! Você pode registrar transações ilimitadas."
            .to_string();
    }

    let remaining = TRIAL_TRANSACTION_LIMIT - user.trial_transactions_count;
    if remaining <= 0 {
        "⚠️ Você atingiu o limite de 50 transações do período de teste. Para continuar usando o Ara, assine o plano premium por apenas R$ 9,90/mês e tenha transações ilimitadas! 💰".to_string()
    } else if remaining <= LOW_REMAINING_WARNING {
        format!(
            "⚠️ Você tem apenas {remaining} transações restantes no período de teste. Considere assinar o plano premium por R$ 9,90/mês para transações ilimitadas! 💰"
        )
    } else {
        format!("📊 Você tem {remaining} transações restantes no período de teste.")
    }
}

/// Upsell message built from today's and this week's profit.
#[must_use]
pub fn conversion_message(today_profit: Decimal, week_profit: Decimal, balance: Decimal) -> String {
    let mut out = String::from("🚀 **Ara Premium - Transforme seu negócio!**\n\n");
    out.push_str("Veja como o Ara está ajudando você:\n\n");

    if today_profit > Decimal::ZERO {
        out.push_str(&format!("💰 Hoje: {} de lucro\n", brl(today_profit)));
    }
    if week_profit > Decimal::ZERO {
        out.push_str(&format!("📈 Esta semana: {} de lucro\n", brl(week_profit)));
    }
    out.push_str(&format!("💳 Saldo atual: {}\n\n", brl(balance)));

    out.push_str("**Benefícios Premium:**\n");
    for benefit in [
        "Transações ilimitadas",
        "Relatórios avançados",
        "Categorização automática",
        "Backup na nuvem",
        "Suporte prioritário",
    ] {
        out.push_str(&format!("✅ {benefit}\n"));
    }
    out.push('\n');

    out.push_str("💎 **Apenas R$ 9,90/mês**\n");
    out.push_str("Menos que um café por dia! ☕\n\n");
    out.push_str("Para assinar, responda: *ASSINAR*");
    out
}
