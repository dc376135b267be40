use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use shared::domain::{ChatMessageState, ChatRole, NoticeLevel};

use super::*;
use crate::{
    contact::{ContactSubmission, DEFAULT_CONTACT_FIELDS},
    error::{ContactError, InquiryError},
    inquiry::{CANNED_ANSWER, CANNED_SOURCES, UNAVAILABLE_ANSWER},
    transcript::{InquiryAnswer, PENDING_TEXT},
};

fn controller() -> InteractionController {
    InteractionController::new(Catalog::builtin(), ControllerOptions::default())
}

fn add(id: &str) -> UiAction {
    UiAction::AddToCart {
        product_id: ProductId::from(id),
    }
}

async fn next_resolution(rx: &mut broadcast::Receiver<StorefrontEvent>) -> shared::domain::ChatMessage {
    loop {
        match rx.recv().await.expect("event") {
            StorefrontEvent::InquiryResolved { message } => return message,
            _ => continue,
        }
    }
}

struct FailingInquiryBackend;

#[async_trait]
impl InquiryBackend for FailingInquiryBackend {
    async fn answer(&self, _question: &str) -> Result<InquiryAnswer, crate::error::InquiryError> {
        Err(InquiryError::Unavailable("index offline".into()))
    }
}

#[derive(Default)]
struct RecordingSink {
    submissions: StdMutex<Vec<ContactSubmission>>,
}

impl ContactSink for RecordingSink {
    fn submit(&self, submission: &ContactSubmission) -> Result<(), ContactError> {
        self.submissions
            .lock()
            .expect("lock")
            .push(submission.clone());
        Ok(())
    }
}

struct RejectingSink;

impl ContactSink for RejectingSink {
    fn submit(&self, _submission: &ContactSubmission) -> Result<(), ContactError> {
        Err(ContactError::Sink("mailer down".into()))
    }
}

#[tokio::test]
async fn add_to_cart_grows_cart_and_shows_panel() {
    let controller = controller();
    let mut rx = controller.subscribe();

    let outcome = controller.dispatch(add("M002")).await;

    assert!(outcome.notice.is_none());
    let view = controller.snapshot().await;
    assert_eq!(view.cart_entries, 1);
    assert!(view.cart_visible);
    assert!(matches!(
        rx.recv().await.expect("event"),
        StorefrontEvent::CartChanged { entries: 1, .. }
    ));
    assert!(matches!(
        rx.recv().await.expect("event"),
        StorefrontEvent::CartPanelChanged { visible: true }
    ));
}

#[tokio::test]
async fn unknown_product_is_silently_ignored() {
    let controller = controller();
    let mut rx = controller.subscribe();

    let outcome = controller.dispatch(add("BOGUS")).await;

    assert!(outcome.notice.is_none());
    let view = controller.snapshot().await;
    assert_eq!(view.cart_entries, 0);
    assert!(!view.cart_visible);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn repeated_adds_group_into_one_summary_row() {
    let controller = controller();
    for _ in 0..3 {
        controller.dispatch(add("L003")).await;
    }

    let view = controller.snapshot().await;
    assert_eq!(view.cart_summary.len(), 1);
    assert_eq!(view.cart_summary[0].count, 3);
    assert!(controller.render_page().await.contains("×3"));
}

#[tokio::test]
async fn chat_controls_toggle_visibility() {
    let controller = controller();
    controller.dispatch(UiAction::ToggleChat).await;
    assert!(controller.snapshot().await.chat_open);
    controller.dispatch(UiAction::ToggleChat).await;
    assert!(!controller.snapshot().await.chat_open);
}

#[tokio::test]
async fn closing_the_cart_keeps_contents() {
    let controller = controller();
    controller.dispatch(add("G001")).await;

    controller.dispatch(UiAction::CloseCart).await;

    let view = controller.snapshot().await;
    assert!(!view.cart_visible);
    assert_eq!(view.cart_entries, 1);
}

#[tokio::test]
async fn overlay_click_hides_only_on_background() {
    let controller = controller();
    controller.dispatch(add("G001")).await;

    controller
        .dispatch(UiAction::CartOverlayClick {
            target: OverlayTarget::Content,
        })
        .await;
    assert!(controller.snapshot().await.cart_visible);

    controller
        .dispatch(UiAction::CartOverlayClick {
            target: OverlayTarget::Background,
        })
        .await;
    assert!(!controller.snapshot().await.cart_visible);
}

#[tokio::test(start_paused = true)]
async fn blank_question_has_no_effect() {
    let controller = controller();

    controller.ask("   ").await;

    let view = controller.snapshot().await;
    assert!(view.transcript.is_empty());
    assert_eq!(controller.pending_inquiries().await, 0);
}

#[tokio::test(start_paused = true)]
async fn question_appends_pending_reply_that_resolves_to_canned_answer() {
    let controller = controller();
    let mut rx = controller.subscribe();

    controller.ask("what masks do you sell").await;

    let view = controller.snapshot().await;
    assert_eq!(view.question_draft, "");
    assert_eq!(view.transcript.len(), 2);
    assert_eq!(view.transcript[0].role, ChatRole::User);
    assert_eq!(view.transcript[0].text, "what masks do you sell");
    assert_eq!(view.transcript[1].state, ChatMessageState::Pending);
    assert_eq!(view.transcript[1].text, PENDING_TEXT);

    let resolved = next_resolution(&mut rx).await;

    assert_eq!(resolved.id, view.transcript[1].id);
    assert_eq!(resolved.text, CANNED_ANSWER);
    assert_eq!(resolved.sources.as_deref(), Some(CANNED_SOURCES));
    let view = controller.snapshot().await;
    assert_eq!(view.transcript.len(), 2);
    assert_eq!(view.transcript[1].state, ChatMessageState::Resolved);
}

#[tokio::test(start_paused = true)]
async fn answer_does_not_depend_on_question() {
    let controller = controller();
    let mut rx = controller.subscribe();

    controller.ask("what masks do you sell").await;
    let first = next_resolution(&mut rx).await;
    controller.ask("asdf").await;
    let second = next_resolution(&mut rx).await;

    assert_eq!(first.text, second.text);
    assert_eq!(first.sources, second.sources);
    assert_ne!(first.id, second.id);
}

#[tokio::test(start_paused = true)]
async fn enter_without_shift_sends_and_shift_enter_does_not() {
    let controller = controller();
    controller
        .dispatch(UiAction::EditQuestion {
            text: "lead times?".into(),
        })
        .await;

    controller
        .dispatch(UiAction::QuestionKeyPress {
            key: "Enter".into(),
            shift: true,
        })
        .await;
    assert!(controller.snapshot().await.transcript.is_empty());

    controller
        .dispatch(UiAction::QuestionKeyPress {
            key: "Enter".into(),
            shift: false,
        })
        .await;
    assert_eq!(controller.snapshot().await.transcript.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn overlapping_questions_resolve_independently() {
    let controller = controller();
    let mut rx = controller.subscribe();

    controller.ask("one").await;
    controller.ask("two").await;
    assert_eq!(controller.pending_inquiries().await, 2);

    next_resolution(&mut rx).await;
    next_resolution(&mut rx).await;

    let view = controller.snapshot().await;
    assert_eq!(view.transcript.len(), 4);
    assert!(view.transcript.iter().all(|m| !m.is_pending()));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_answers() {
    let controller = controller();
    controller.ask("will this answer arrive?").await;
    assert_eq!(controller.pending_inquiries().await, 1);

    controller.shutdown().await;
    tokio::time::sleep(DEFAULT_INQUIRY_DELAY * 2).await;

    let view = controller.snapshot().await;
    assert_eq!(controller.pending_inquiries().await, 0);
    assert!(view.transcript[1].is_pending());
}

#[tokio::test(start_paused = true)]
async fn backend_failure_resolves_with_apology() {
    let controller = controller().with_inquiry_backend(Arc::new(FailingInquiryBackend));
    let mut rx = controller.subscribe();

    controller.ask("anything").await;
    let resolved = next_resolution(&mut rx).await;

    assert_eq!(resolved.text, UNAVAILABLE_ANSWER);
    assert!(resolved.sources.is_none());
}

#[tokio::test]
async fn justification_on_empty_cart_reports_error_and_keeps_panel() {
    let controller = controller();
    {
        let mut state = controller.state.lock().await;
        state.add_to_cart(&ProductId::from("G001"));
        state.clear_cart();
    }

    let outcome = controller.dispatch(UiAction::GenerateJustification).await;

    let notice = outcome.notice.expect("notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.text, EMPTY_CART_MESSAGE);
    assert!(controller.snapshot().await.cart_visible);
}

#[tokio::test]
async fn justification_confirms_item_count_and_hides_panel() {
    let controller = controller();
    controller.dispatch(add("G001")).await;
    controller.dispatch(add("M002")).await;

    let outcome = controller.dispatch(UiAction::GenerateJustification).await;

    let notice = outcome.notice.expect("notice");
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(notice.text.contains('2'));
    let view = controller.snapshot().await;
    assert!(!view.cart_visible);
    assert_eq!(view.cart_entries, 2);
    assert_eq!(view.flash, Some(notice));
}

#[tokio::test]
async fn justification_can_clear_cart_when_configured() {
    let controller = InteractionController::new(
        Catalog::builtin(),
        ControllerOptions {
            clear_cart_after_justification: true,
            ..ControllerOptions::default()
        },
    );
    controller.dispatch(add("G001")).await;

    controller.dispatch(UiAction::GenerateJustification).await;

    assert_eq!(controller.snapshot().await.cart_entries, 0);
}

#[tokio::test]
async fn contact_submit_reports_confirmation_and_blanks_fields() {
    let sink = Arc::new(RecordingSink::default());
    let controller = controller().with_contact_sink(sink.clone());
    for (name, value) in [("name", "Jo"), ("email", "a@b.com")] {
        controller
            .dispatch(UiAction::EditContactField {
                name: name.into(),
                value: value.into(),
            })
            .await;
    }

    let outcome = controller.dispatch(UiAction::SubmitContact).await;

    assert_eq!(outcome.notice, Some(Notice::info(CONTACT_CONFIRMATION)));
    let submissions = sink.submissions.lock().expect("lock");
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].get("name").map(String::as_str), Some("Jo"));
    assert_eq!(submissions[0].get("email").map(String::as_str), Some("a@b.com"));
    drop(submissions);
    let view = controller.snapshot().await;
    assert!(view.contact_fields.iter().all(|f| f.value.is_empty()));
}

#[tokio::test]
async fn failed_contact_submit_keeps_fields() {
    let controller = controller().with_contact_sink(Arc::new(RejectingSink));
    controller
        .dispatch(UiAction::EditContactField {
            name: "name".into(),
            value: "Jo".into(),
        })
        .await;

    let outcome = controller.dispatch(UiAction::SubmitContact).await;

    assert!(outcome.notice.expect("notice").is_error());
    let view = controller.snapshot().await;
    assert!(view.contact_fields.iter().any(|f| f.value == "Jo"));
}

#[tokio::test]
async fn render_page_consumes_flash_notice() {
    let controller = controller();
    controller.dispatch(UiAction::GenerateJustification).await;

    assert!(controller.render_page().await.contains(EMPTY_CART_MESSAGE));
    assert!(!controller.render_page().await.contains(EMPTY_CART_MESSAGE));
}

#[tokio::test(start_paused = true)]
async fn concurrent_questions_are_each_recorded_once() {
    let controller = controller();
    let guard = controller.state.lock().await;
    let release = async move {
        tokio::task::yield_now().await;
        drop(guard);
    };

    tokio::join!(
        controller.ask("first question"),
        controller.ask("second question"),
        release
    );

    let view = controller.snapshot().await;
    let mut asked: Vec<&str> = view
        .transcript
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .map(|m| m.text.as_str())
        .collect();
    asked.sort_unstable();
    assert_eq!(asked, ["first question", "second question"]);
    assert_eq!(view.transcript.len(), 4);
    assert_eq!(controller.pending_inquiries().await, 2);
    controller.shutdown().await;
}

#[tokio::test]
async fn concurrent_contact_submissions_do_not_mix_fields() {
    let sink = Arc::new(RecordingSink::default());
    let controller = controller().with_contact_sink(sink.clone());
    let form = |name: &str, email: &str| UiAction::SubmitContactForm {
        fields: vec![
            shared::domain::ContactField {
                name: "name".into(),
                value: name.into(),
            },
            shared::domain::ContactField {
                name: "email".into(),
                value: email.into(),
            },
        ],
    };
    let guard = controller.state.lock().await;
    let release = async move {
        tokio::task::yield_now().await;
        drop(guard);
    };

    let (first, second, ()) = tokio::join!(
        controller.dispatch(form("Jo", "a@b.com")),
        controller.dispatch(form("Sam", "sam@c.com")),
        release
    );

    assert_eq!(first.notice, Some(Notice::info(CONTACT_CONFIRMATION)));
    assert_eq!(second.notice, Some(Notice::info(CONTACT_CONFIRMATION)));
    let submissions = sink.submissions.lock().expect("lock");
    assert_eq!(submissions.len(), 2);
    for submission in submissions.iter() {
        let pair = (
            submission.get("name").map(String::as_str),
            submission.get("email").map(String::as_str),
        );
        assert!(
            pair == (Some("Jo"), Some("a@b.com")) || pair == (Some("Sam"), Some("sam@c.com")),
            "mixed submission: {submission:?}"
        );
    }
    drop(submissions);
    let view = controller.snapshot().await;
    assert!(view.contact_fields.iter().all(|f| f.value.is_empty()));
}

#[tokio::test]
async fn editing_an_unknown_contact_field_is_ignored() {
    let controller = controller();

    controller
        .dispatch(UiAction::EditContactField {
            name: "injected".into(),
            value: "<b>x</b>".into(),
        })
        .await;

    let view = controller.snapshot().await;
    assert_eq!(view.contact_fields.len(), DEFAULT_CONTACT_FIELDS.len());
    assert!(view.contact_fields.iter().all(|f| f.name != "injected"));
}
