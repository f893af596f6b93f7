//! Inbound message pipeline.
//!
//! For every message: resolve the sender, gate on the trial limit, extract a
//! transaction candidate (bounded by a timeout), record it, reply. Every
//! failure becomes a fixed apology to the sender; reply delivery failures are
//! logged and never retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use super::collaborators::{AudioTranscriber, MessageSender, ReceiptReader, TransactionExtractor};
use super::error::IntakeError;
use super::replies;
use super::types::{ExtractedTransaction, IntakeOutcome, MessageEnvelope, MessageKind};
use crate::access;
use crate::ledger::{LedgerRepository, TransactionService, TransactionSource, User};

/// The external collaborators the pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Text to transaction.
    pub extractor: Arc<dyn TransactionExtractor>,
    /// Voice note to text.
    pub transcriber: Arc<dyn AudioTranscriber>,
    /// Receipt photo to transaction.
    pub receipts: Arc<dyn ReceiptReader>,
    /// Reply transport.
    pub sender: Arc<dyn MessageSender>,
}

/// Processes inbound messages into ledger transactions.
pub struct IntakePipeline<R: LedgerRepository> {
    transactions: TransactionService<R>,
    collaborators: Collaborators,
    timeout: Duration,
}

impl<R: LedgerRepository> Clone for IntakePipeline<R> {
    fn clone(&self) -> Self {
        Self {
            transactions: self.transactions.clone(),
            collaborators: self.collaborators.clone(),
            timeout: self.timeout,
        }
    }
}

/// Per-kind reply texts and source tag.
struct Route {
    source: TransactionSource,
    extraction_apology: &'static str,
    persist_apology: &'static str,
    confirm: fn(&ExtractedTransaction) -> String,
}

const TEXT_ROUTE: Route = Route {
    source: TransactionSource::Text,
    extraction_apology: replies::TEXT_NOT_UNDERSTOOD,
    persist_apology: replies::PERSIST_FAILED,
    confirm: replies::recorded,
};

const VOICE_ROUTE: Route = Route {
    source: TransactionSource::Voice,
    extraction_apology: replies::TEXT_NOT_UNDERSTOOD,
    persist_apology: replies::PERSIST_FAILED,
    confirm: replies::recorded,
};

const IMAGE_ROUTE: Route = Route {
    source: TransactionSource::Image,
    extraction_apology: replies::RECEIPT_NOT_READ,
    persist_apology: replies::RECEIPT_PERSIST_FAILED,
    confirm: replies::receipt_recorded,
};

impl<R: LedgerRepository> IntakePipeline<R> {
    /// Create a pipeline. `timeout` bounds each collaborator call.
    pub fn new(
        transactions: TransactionService<R>,
        collaborators: Collaborators,
        timeout: Duration,
    ) -> Self {
        Self {
            transactions,
            collaborators,
            timeout,
        }
    }

    /// Process one message end to end.
    pub async fn process(&self, envelope: &MessageEnvelope) -> IntakeOutcome {
        let sender = envelope.sender.as_str();

        let user = match self
            .transactions
            .repository()
            .get_or_create_user(sender)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, sender, "failed to resolve sender");
                self.reply(sender, replies::PERSIST_FAILED).await;
                return IntakeOutcome::UserUnavailable;
            }
        };

        if !access::can_create_transaction(&user) {
            info!(user_id = %user.id, count = user.trial_transactions_count, "trial limit reached");
            self.reply(sender, replies::TRIAL_LIMIT_REACHED).await;
            return IntakeOutcome::TrialLimitReached;
        }

        match &envelope.kind {
            MessageKind::Text { body } => {
                let extracted = self
                    .bounded(self.collaborators.extractor.extract(body))
                    .await;
                self.record(&user, extracted, &TEXT_ROUTE).await
            }
            MessageKind::Audio(media) => {
                let transcript = match self
                    .bounded(self.collaborators.transcriber.transcribe(media))
                    .await
                {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, user_id = %user.id, media_id = %media.media_id, "transcription failed");
                        self.reply(sender, replies::AUDIO_NOT_TRANSCRIBED).await;
                        return IntakeOutcome::ExtractionFailed;
                    }
                };
                debug!(user_id = %user.id, transcript = %transcript, "audio transcribed");
                let extracted = self
                    .bounded(self.collaborators.extractor.extract(&transcript))
                    .await;
                self.record(&user, extracted, &VOICE_ROUTE).await
            }
            MessageKind::Image(media) => {
                let extracted = self
                    .bounded(self.collaborators.receipts.read_receipt(media))
                    .await;
                self.record(&user, extracted, &IMAGE_ROUTE).await
            }
            MessageKind::Unsupported { kind } => {
                debug!(user_id = %user.id, kind = %kind, "unsupported message kind");
                self.reply(sender, replies::UNSUPPORTED_KIND).await;
                IntakeOutcome::Unsupported
            }
        }
    }

    /// Process a batch concurrently. One message's failure does not affect the others.
    ///
    /// Each message is gated on the user as read before extraction, so several
    /// concurrent messages from one trial user can all pass the gate and land
    /// past the limit. Only the counter increment itself is atomic.
    pub async fn process_batch(&self, envelopes: &[MessageEnvelope]) -> Vec<IntakeOutcome> {
        join_all(envelopes.iter().map(|e| self.process(e))).await
    }

    async fn record(
        &self,
        user: &User,
        extracted: Result<ExtractedTransaction, IntakeError>,
        route: &Route,
    ) -> IntakeOutcome {
        let sender = user.phone_number.as_str();

        let candidate = match extracted.and_then(validate) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(error = %e, user_id = %user.id, source = route.source.as_str(), "extraction failed");
                self.reply(sender, route.extraction_apology).await;
                return IntakeOutcome::ExtractionFailed;
            }
        };

        if let Some(date) = candidate.date {
            debug!(user_id = %user.id, %date, "extracted date ignored; recording with current time");
        }

        let result = self
            .transactions
            .create_transaction(
                user.id,
                candidate.amount,
                &candidate.description,
                candidate.transaction_type,
                route.source,
            )
            .await;

        match result {
            Ok(tx) => {
                self.reply(sender, &(route.confirm)(&candidate)).await;
                IntakeOutcome::Recorded {
                    transaction_id: tx.id,
                }
            }
            Err(e) => {
                error!(error = %e, user_id = %user.id, "failed to record transaction");
                self.reply(sender, route.persist_apology).await;
                IntakeOutcome::PersistFailed
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, IntakeError>>,
    ) -> Result<T, IntakeError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| IntakeError::Timeout(self.timeout))?
    }

    async fn reply(&self, to: &str, body: &str) {
        if let Err(e) = self.collaborators.sender.send(to, body).await {
            warn!(error = %e, to, "failed to deliver reply");
        }
    }
}

fn validate(candidate: ExtractedTransaction) -> Result<ExtractedTransaction, IntakeError> {
    if candidate.amount.is_sign_negative() && !candidate.amount.is_zero() {
        return Err(IntakeError::InvalidExtraction(format!(
            "negative amount {}",
            candidate.amount
        )));
    }
    if candidate.description.trim().is_empty() {
        return Err(IntakeError::InvalidExtraction("empty description".into()));
    }
    Ok(candidate)
}
