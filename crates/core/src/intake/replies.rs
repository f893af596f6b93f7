//! Fixed conversational replies.

use ara_shared::types::Money;

use super::types::ExtractedTransaction;

/// Gate denied.
pub const TRIAL_LIMIT_REACHED: &str = "Você atingiu o limite de 50 transações gratuitas. Para continuar usando o serviço, assine nosso plano premium por apenas R$ 9,90/mês.";

/// Text extraction failed.
pub const TEXT_NOT_UNDERSTOOD: &str =
    "Desculpe, não consegui entender a transação. Tente novamente ou envie de outra forma.";

/// Audio transcription failed.
pub const AUDIO_NOT_TRANSCRIBED: &str = "Desculpe, não consegui transcrever o áudio. Tente novamente.";

/// Receipt reading failed.
pub const RECEIPT_NOT_READ: &str = "Desculpe, não consegui ler o recibo. Tente novamente.";

/// Persisting a text/audio transaction failed.
pub const PERSIST_FAILED: &str = "Erro ao registrar a transação. Tente novamente mais tarde.";

/// Persisting a receipt transaction failed.
pub const RECEIPT_PERSIST_FAILED: &str =
    "Erro ao registrar a transação do recibo. Tente novamente mais tarde.";

/// Unsupported message kind.
pub const UNSUPPORTED_KIND: &str = "Desculpe, não consegui processar esse tipo de mensagem. Envie texto, áudio ou uma foto de recibo.";

/// Confirmation after a text or audio transaction.
#[must_use]
pub fn recorded(tx: &ExtractedTransaction) -> String {
    format!(
        "Transação registrada! Valor: {} ({}) - {}",
        Money::brl(tx.amount),
        tx.transaction_type.label_pt(),
        tx.description
    )
}

/// Confirmation after a receipt transaction.
#[must_use]
pub fn receipt_recorded(tx: &ExtractedTransaction) -> String {
    format!(
        "Recibo processado! Valor: {} ({}) - {}",
        Money::brl(tx.amount),
        tx.transaction_type.label_pt(),
        tx.description
    )
}
