//! Binds user actions to session mutations, mock service calls and change events.

use std::{collections::HashMap, sync::Arc, time::Duration};

use shared::{
    domain::{BuyerContext, ContactField, MessageId, Notice, ProductId},
    protocol::{ActionOutcome, OverlayTarget, StorefrontEvent, StorefrontView, UiAction},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    cart::AddOutcome,
    catalog::Catalog,
    contact::{ContactSink, LoggingContactSink, CONTACT_CONFIRMATION},
    error::JustificationError,
    inquiry::{unavailable_answer, CannedInquiryBackend, InquiryBackend, DEFAULT_INQUIRY_DELAY},
    justification::{JustificationBackend, JustificationService, EMPTY_CART_MESSAGE},
    render,
    state::{PendingInquiry, SessionState},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub buyer: BuyerContext,
    pub inquiry_delay: Duration,
    pub clear_cart_after_justification: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            buyer: BuyerContext::default(),
            inquiry_delay: DEFAULT_INQUIRY_DELAY,
            clear_cart_after_justification: false,
        }
    }
}

type PendingTasks = Arc<Mutex<HashMap<MessageId, JoinHandle<()>>>>;

/// Owns the session state and applies [`UiAction`]s to it.
///
/// Every action runs to completion under the state lock. The only deferred work is
/// inquiry resolution, which runs on a spawned task tracked until it finishes or
/// [`InteractionController::shutdown`] aborts it.
pub struct InteractionController {
    state: Arc<Mutex<SessionState>>,
    inquiry: Arc<dyn InquiryBackend>,
    justification: JustificationService,
    contact: Arc<dyn ContactSink>,
    options: ControllerOptions,
    events: broadcast::Sender<StorefrontEvent>,
    pending: PendingTasks,
}

impl InteractionController {
    pub fn new(catalog: Catalog, options: ControllerOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(SessionState::new(catalog))),
            inquiry: Arc::new(CannedInquiryBackend::new(options.inquiry_delay)),
            justification: JustificationService::default(),
            contact: Arc::new(LoggingContactSink),
            options,
            events,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_inquiry_backend(mut self, backend: Arc<dyn InquiryBackend>) -> Self {
        self.inquiry = backend;
        self
    }

    pub fn with_justification_backend(mut self, backend: Arc<dyn JustificationBackend>) -> Self {
        self.justification = JustificationService::new(backend);
        self
    }

    pub fn with_contact_sink(mut self, sink: Arc<dyn ContactSink>) -> Self {
        self.contact = sink;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorefrontEvent> {
        self.events.subscribe()
    }

    pub async fn dispatch(&self, action: UiAction) -> ActionOutcome {
        debug!(action = action.name(), "dispatching ui action");
        let outcome = match action {
            UiAction::AddToCart { product_id } => self.add_to_cart(&product_id).await,
            UiAction::ToggleChat => self.toggle_chat().await,
            UiAction::EditQuestion { text } => {
                self.state.lock().await.set_question_draft(text);
                ActionOutcome::quiet()
            }
            UiAction::QuestionKeyPress { key, shift } => {
                if key == "Enter" && !shift {
                    self.send_question().await
                } else {
                    ActionOutcome::quiet()
                }
            }
            UiAction::SendQuestion => self.send_question().await,
            UiAction::AskQuestion { question } => {
                let pending = self.state.lock().await.submit_question(question);
                self.start_inquiry(pending).await
            }
            UiAction::CloseCart => self.hide_cart().await,
            UiAction::CartOverlayClick { target } => match target {
                OverlayTarget::Background => self.hide_cart().await,
                OverlayTarget::Content => ActionOutcome::quiet(),
            },
            UiAction::GenerateJustification => self.generate_justification().await,
            UiAction::EditContactField { name, value } => {
                if !self.state.lock().await.contact_mut().set(&name, value) {
                    debug!(field = %name, "ignoring edit of unknown contact field");
                }
                ActionOutcome::quiet()
            }
            UiAction::SubmitContact => self.submit_contact(&[]).await,
            UiAction::SubmitContactForm { fields } => self.submit_contact(&fields).await,
        };

        if let Some(notice) = &outcome.notice {
            self.state.lock().await.set_flash(notice.clone());
            self.publish(StorefrontEvent::Notice(notice.clone()));
        }
        outcome
    }

    pub async fn ask(&self, question: impl Into<String>) -> ActionOutcome {
        self.dispatch(UiAction::AskQuestion {
            question: question.into(),
        })
        .await
    }

    pub async fn snapshot(&self) -> StorefrontView {
        self.state.lock().await.view(&self.options.buyer)
    }

    /// Renders the page and consumes the flash notice shown on it.
    pub async fn render_page(&self) -> String {
        let mut state = self.state.lock().await;
        let view = state.view(&self.options.buyer);
        state.take_flash();
        render::render_page(&view)
    }

    pub async fn pending_inquiries(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Aborts every inquiry still waiting on its backend. Their placeholders stay pending.
    pub async fn shutdown(&self) {
        let tasks: Vec<_> = self.pending.lock().await.drain().collect();
        for (message_id, task) in &tasks {
            debug!(message_id = message_id.0, "aborting pending inquiry");
            task.abort();
        }
        info!(aborted = tasks.len(), "storefront controller shut down");
    }

    async fn add_to_cart(&self, product_id: &ProductId) -> ActionOutcome {
        let mut state = self.state.lock().await;
        match state.add_to_cart(product_id) {
            AddOutcome::Added { entries } => {
                debug!(%product_id, entries, "cart updated");
                self.publish(StorefrontEvent::CartChanged {
                    entries,
                    summary: state.cart().summary(),
                });
                self.publish(StorefrontEvent::CartPanelChanged { visible: true });
            }
            AddOutcome::UnknownProduct => {
                warn!(%product_id, "ignoring add-to-cart for unknown product");
            }
        }
        ActionOutcome::quiet()
    }

    async fn toggle_chat(&self) -> ActionOutcome {
        let open = self.state.lock().await.toggle_chat();
        self.publish(StorefrontEvent::ChatPanelChanged { open });
        ActionOutcome::quiet()
    }

    async fn hide_cart(&self) -> ActionOutcome {
        if self.state.lock().await.hide_cart() {
            self.publish(StorefrontEvent::CartPanelChanged { visible: false });
        }
        ActionOutcome::quiet()
    }

    async fn send_question(&self) -> ActionOutcome {
        let pending = self.state.lock().await.begin_inquiry();
        self.start_inquiry(pending).await
    }

    async fn start_inquiry(&self, pending: Option<PendingInquiry>) -> ActionOutcome {
        let Some(pending) = pending else {
            return ActionOutcome::quiet();
        };
        let placeholder_id = pending.placeholder.id;
        self.publish(StorefrontEvent::ChatMessageAppended {
            message: pending.user_message,
        });
        self.publish(StorefrontEvent::ChatMessageAppended {
            message: pending.placeholder,
        });
        self.spawn_resolution(placeholder_id, pending.question).await;
        ActionOutcome::quiet()
    }

    async fn spawn_resolution(&self, placeholder: MessageId, question: String) {
        let state = Arc::clone(&self.state);
        let backend = Arc::clone(&self.inquiry);
        let events = self.events.clone();
        let pending = Arc::clone(&self.pending);

        let mut tasks = self.pending.lock().await;
        let task = tokio::spawn(async move {
            let answer = match backend.answer(&question).await {
                Ok(answer) => answer,
                Err(error) => {
                    warn!(message_id = placeholder.0, %error, "inquiry backend failed");
                    unavailable_answer()
                }
            };
            let resolved = state.lock().await.resolve_inquiry(placeholder, answer);
            match resolved {
                Some(message) => {
                    let _ = events.send(StorefrontEvent::InquiryResolved { message });
                }
                None => debug!(message_id = placeholder.0, "inquiry placeholder already resolved"),
            }
            pending.lock().await.remove(&placeholder);
        });
        tasks.insert(placeholder, task);
    }

    async fn generate_justification(&self) -> ActionOutcome {
        let mut state = self.state.lock().await;
        let result = self
            .justification
            .generate(state.cart().entries(), &self.options.buyer);
        match result {
            Ok(receipt) => {
                if state.hide_cart() {
                    self.publish(StorefrontEvent::CartPanelChanged { visible: false });
                }
                if self.options.clear_cart_after_justification {
                    state.clear_cart();
                    self.publish(StorefrontEvent::CartChanged {
                        entries: 0,
                        summary: Vec::new(),
                    });
                }
                ActionOutcome::with_notice(Notice::info(receipt.confirmation()))
            }
            Err(JustificationError::EmptyCart) => {
                ActionOutcome::with_notice(Notice::error(EMPTY_CART_MESSAGE))
            }
            Err(error) => {
                warn!(%error, "justification generation failed");
                ActionOutcome::with_notice(Notice::error(format!(
                    "Justification generation failed: {error}"
                )))
            }
        }
    }

    /// Collects, submits and resets under a single lock so concurrent posts never mix.
    async fn submit_contact(&self, posted: &[ContactField]) -> ActionOutcome {
        let mut state = self.state.lock().await;
        let submission = state.contact().submission_with(posted);
        if let Err(error) = self.contact.submit(&submission) {
            warn!(%error, "contact submission failed");
            return ActionOutcome::with_notice(Notice::error(
                "We couldn't send your message. Please try again.",
            ));
        }
        state.contact_mut().reset();
        self.publish(StorefrontEvent::ContactFormReset);
        ActionOutcome::with_notice(Notice::info(CONTACT_CONFIRMATION))
    }

    fn publish(&self, event: StorefrontEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
