use serde::{Deserialize, Serialize};

use crate::domain::{BuyerContext, CartSummaryRow, ChatMessage, ContactField, Notice, Product, ProductId};

/// Where a click on the cart overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayTarget {
    Background,
    Content,
}

/// One user-observable event delivered to the interaction controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UiAction {
    AddToCart {
        product_id: ProductId,
    },
    /// Both the ask-procurement control and the chat close control flip visibility.
    ToggleChat,
    EditQuestion {
        text: String,
    },
    QuestionKeyPress {
        key: String,
        #[serde(default)]
        shift: bool,
    },
    SendQuestion,
    /// Sets the question and sends it in one step.
    AskQuestion {
        question: String,
    },
    CloseCart,
    CartOverlayClick {
        target: OverlayTarget,
    },
    GenerateJustification,
    EditContactField {
        name: String,
        value: String,
    },
    SubmitContact,
    /// Applies the posted fields and submits them in one step.
    SubmitContactForm {
        fields: Vec<ContactField>,
    },
}

impl UiAction {
    pub fn name(&self) -> &'static str {
        match self {
            UiAction::AddToCart { .. } => "add_to_cart",
            UiAction::ToggleChat => "toggle_chat",
            UiAction::EditQuestion { .. } => "edit_question",
            UiAction::QuestionKeyPress { .. } => "question_key_press",
            UiAction::SendQuestion => "send_question",
            UiAction::AskQuestion { .. } => "ask_question",
            UiAction::CloseCart => "close_cart",
            UiAction::CartOverlayClick { .. } => "cart_overlay_click",
            UiAction::GenerateJustification => "generate_justification",
            UiAction::EditContactField { .. } => "edit_contact_field",
            UiAction::SubmitContact => "submit_contact",
            UiAction::SubmitContactForm { .. } => "submit_contact_form",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl ActionOutcome {
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn with_notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StorefrontEvent {
    CartChanged {
        entries: usize,
        summary: Vec<CartSummaryRow>,
    },
    CartPanelChanged {
        visible: bool,
    },
    ChatPanelChanged {
        open: bool,
    },
    ChatMessageAppended {
        message: ChatMessage,
    },
    InquiryResolved {
        message: ChatMessage,
    },
    ContactFormReset,
    Notice(Notice),
}

/// Serializable snapshot of everything the page renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontView {
    pub products: Vec<Product>,
    pub cart_entries: usize,
    pub cart_summary: Vec<CartSummaryRow>,
    pub cart_visible: bool,
    pub chat_open: bool,
    pub question_draft: String,
    pub transcript: Vec<ChatMessage>,
    pub contact_fields: Vec<ContactField>,
    pub buyer: BuyerContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<Notice>,
}
