use super::*;
use shared::domain::{ChatMessageState, ChatRole};

fn state() -> SessionState {
    SessionState::new(Catalog::builtin())
}

#[test]
fn adding_a_known_product_opens_the_cart_panel() {
    let mut state = state();
    assert!(!state.cart_visible());

    state.add_to_cart(&ProductId::from("S004"));

    assert!(state.cart_visible());
    assert_eq!(state.cart().len(), 1);
}

#[test]
fn adding_an_unknown_product_keeps_the_panel_closed() {
    let mut state = state();
    assert_eq!(
        state.add_to_cart(&ProductId::from("Z000")),
        AddOutcome::UnknownProduct
    );
    assert!(!state.cart_visible());
    assert!(state.cart().is_empty());
}

#[test]
fn hiding_the_cart_keeps_its_contents() {
    let mut state = state();
    state.add_to_cart(&ProductId::from("G001"));

    assert!(state.hide_cart());
    assert!(!state.hide_cart());
    assert_eq!(state.cart().len(), 1);
}

#[test]
fn toggle_chat_flips_visibility() {
    let mut state = state();
    assert!(state.toggle_chat());
    assert!(!state.toggle_chat());
}

#[test]
fn blank_draft_starts_no_inquiry_and_is_not_cleared() {
    let mut state = state();
    state.set_question_draft("   \n\t");

    assert!(state.begin_inquiry().is_none());
    assert!(state.transcript().is_empty());
    assert_eq!(state.question_draft(), "   \n\t");
}

#[test]
fn inquiry_appends_user_and_pending_bot_and_clears_draft() {
    let mut state = state();
    state.set_question_draft("Are your masks NIOSH approved?");

    let pending = state.begin_inquiry().expect("inquiry");

    assert_eq!(pending.question, "Are your masks NIOSH approved?");
    assert_eq!(pending.user_message.role, ChatRole::User);
    assert_eq!(pending.placeholder.role, ChatRole::Bot);
    assert_eq!(pending.placeholder.state, ChatMessageState::Pending);
    assert_eq!(state.transcript().len(), 2);
    assert_eq!(state.question_draft(), "");
}

#[test]
fn view_mirrors_state() {
    let mut state = state();
    state.add_to_cart(&ProductId::from("M002"));
    state.add_to_cart(&ProductId::from("M002"));
    state.set_flash(Notice::info("hello"));

    let view = state.view(&BuyerContext::default());

    assert_eq!(view.products.len(), 4);
    assert_eq!(view.cart_entries, 2);
    assert_eq!(view.cart_summary.len(), 1);
    assert_eq!(view.cart_summary[0].count, 2);
    assert!(view.cart_visible);
    assert_eq!(view.flash, Some(Notice::info("hello")));
    assert_eq!(state.take_flash(), Some(Notice::info("hello")));
    assert!(state.take_flash().is_none());
}

#[test]
fn submit_question_sets_and_sends_in_one_step() {
    let mut state = state();
    state.set_question_draft("stale draft");

    let pending = state.submit_question("Do you ship to Ohio?").expect("inquiry");

    assert_eq!(pending.question, "Do you ship to Ohio?");
    assert_eq!(state.transcript().len(), 2);
    assert_eq!(state.question_draft(), "");
}

#[test]
fn blank_submitted_question_changes_nothing() {
    let mut state = state();
    state.set_question_draft("keep me");

    assert!(state.submit_question("  ").is_none());
    assert!(state.transcript().is_empty());
    assert_eq!(state.question_draft(), "keep me");
}
