use shared::{
    domain::{BuyerContext, ChatMessage, MessageId, Notice, ProductId},
    protocol::StorefrontView,
};

use crate::{
    cart::{AddOutcome, Cart},
    catalog::Catalog,
    contact::ContactForm,
    transcript::{InquiryAnswer, Transcript},
};

/// A question accepted for answering, with the two messages it appended.
#[derive(Debug, Clone)]
pub struct PendingInquiry {
    pub question: String,
    pub user_message: ChatMessage,
    pub placeholder: ChatMessage,
}

/// Everything one shopper session can see and change.
#[derive(Debug, Clone)]
pub struct SessionState {
    catalog: Catalog,
    cart: Cart,
    transcript: Transcript,
    chat_open: bool,
    cart_visible: bool,
    question_draft: String,
    contact: ContactForm,
    flash: Option<Notice>,
}

impl SessionState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            cart: Cart::new(),
            transcript: Transcript::new(),
            chat_open: false,
            cart_visible: false,
            question_draft: String::new(),
            contact: ContactForm::default(),
            flash: None,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    pub fn contact_mut(&mut self) -> &mut ContactForm {
        &mut self.contact
    }

    pub fn chat_open(&self) -> bool {
        self.chat_open
    }

    pub fn cart_visible(&self) -> bool {
        self.cart_visible
    }

    pub fn question_draft(&self) -> &str {
        &self.question_draft
    }

    /// Adds the product and opens the cart panel. Unknown ids change nothing.
    pub fn add_to_cart(&mut self, id: &ProductId) -> AddOutcome {
        let outcome = self.cart.add(&self.catalog, id);
        if matches!(outcome, AddOutcome::Added { .. }) {
            self.cart_visible = true;
        }
        outcome
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Returns whether the panel was visible before.
    pub fn hide_cart(&mut self) -> bool {
        std::mem::replace(&mut self.cart_visible, false)
    }

    pub fn toggle_chat(&mut self) -> bool {
        self.chat_open = !self.chat_open;
        self.chat_open
    }

    pub fn set_question_draft(&mut self, text: impl Into<String>) {
        self.question_draft = text.into();
    }

    /// Turns the current draft into a user message plus a pending bot placeholder
    /// and clears the draft. Blank drafts are left untouched and yield `None`.
    pub fn begin_inquiry(&mut self) -> Option<PendingInquiry> {
        if self.question_draft.trim().is_empty() {
            return None;
        }
        let question = std::mem::take(&mut self.question_draft);
        let user_message = self.transcript.push_user(question.clone()).clone();
        let placeholder = self.transcript.push_pending_bot().clone();
        Some(PendingInquiry {
            question,
            user_message,
            placeholder,
        })
    }

    /// Sets the draft and begins the inquiry without releasing the session in between.
    pub fn submit_question(&mut self, question: impl Into<String>) -> Option<PendingInquiry> {
        let question = question.into();
        if question.trim().is_empty() {
            return None;
        }
        self.question_draft = question;
        self.begin_inquiry()
    }

    pub fn resolve_inquiry(&mut self, id: MessageId, answer: InquiryAnswer) -> Option<ChatMessage> {
        self.transcript.resolve(id, answer).cloned()
    }

    pub fn set_flash(&mut self, notice: Notice) {
        self.flash = Some(notice);
    }

    pub fn take_flash(&mut self) -> Option<Notice> {
        self.flash.take()
    }

    pub fn view(&self, buyer: &BuyerContext) -> StorefrontView {
        StorefrontView {
            products: self.catalog.products().to_vec(),
            cart_entries: self.cart.len(),
            cart_summary: self.cart.summary(),
            cart_visible: self.cart_visible,
            chat_open: self.chat_open,
            question_draft: self.question_draft.clone(),
            transcript: self.transcript.messages().to_vec(),
            contact_fields: self.contact.fields().to_vec(),
            buyer: buyer.clone(),
            flash: self.flash.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
