//! HTML rendering for the storefront page.
//!
//! Every piece of dynamic text reaches the markup through [`Escaped`]; no renderer
//! interpolates a raw `&str`.

use std::fmt;

use shared::{
    domain::{CartSummaryRow, ChatMessage, ChatRole, ContactField, Notice, NoticeLevel, Product},
    protocol::StorefrontView,
};

pub const EMPTY_CART_TEXT: &str = "Your cart is empty.";

/// Display adapter that HTML-encodes its contents.
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = 0;
        for (index, ch) in self.0.char_indices() {
            let replacement = match ch {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            f.write_str(&self.0[start..index])?;
            f.write_str(replacement)?;
            start = index + ch.len_utf8();
        }
        f.write_str(&self.0[start..])
    }
}

pub fn escape_html(input: &str) -> String {
    Escaped(input).to_string()
}

/// One card per product, in catalog order, each with a single add control.
pub fn render_catalog(products: &[Product]) -> String {
    products.iter().map(render_product_card).collect()
}

fn render_product_card(product: &Product) -> String {
    let id = Escaped(product.id.as_str());
    let name = Escaped(&product.name);
    format!(
        r#"<div class="product-card">
  <div class="card-image-wrapper"><img src="{image}" alt="{name}" class="product-image"></div>
  <div class="product-content">
    <div class="product-tag">New Arrival</div>
    <h3>{name}</h3>
    <p class="product-desc">{description}</p>
    <div class="product-footer">
      <span class="price">{price}</span>
      <form method="post" action="/cart/items">
        <input type="hidden" name="product_id" value="{id}">
        <button type="submit" class="add-to-cart-btn" data-product-id="{id}">Add to Bag</button>
      </form>
    </div>
  </div>
</div>
"#,
        image = Escaped(&product.image),
        description = Escaped(&product.description),
        price = Escaped(&product.price),
    )
}

pub fn render_cart_summary(rows: &[CartSummaryRow]) -> String {
    if rows.is_empty() {
        return format!(r#"<p class="cart-empty">{EMPTY_CART_TEXT}</p>"#);
    }
    rows.iter()
        .map(|row| {
            format!(
                r#"<div class="cart-item"><span class="cart-item-name">{}</span><span class="cart-item-badge">×{}</span></div>
"#,
                Escaped(&row.name),
                row.count
            )
        })
        .collect()
}

pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages.iter().map(render_chat_message).collect()
}

fn render_chat_message(message: &ChatMessage) -> String {
    let role = match message.role {
        ChatRole::User => "user",
        ChatRole::Bot => "bot",
    };
    if message.is_pending() {
        return format!(
            r#"<div class="chat-message {role} loading" data-message-id="{id}"><div class="message-content"><p class="pending">{text}</p></div></div>
"#,
            id = message.id.0,
            text = Escaped(&message.text),
        );
    }
    let sources = message
        .sources
        .as_deref()
        .map(|sources| {
            format!(
                r#"<div class="message-sources"><strong>Source:</strong> {}</div>"#,
                Escaped(sources)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="chat-message {role}" data-message-id="{id}"><div class="message-content"><p>{text}</p>{sources}</div></div>
"#,
        id = message.id.0,
        text = Escaped(&message.text),
    )
}

pub fn render_contact_form(fields: &[ContactField]) -> String {
    let inputs: String = fields
        .iter()
        .map(|field| {
            let name = Escaped(&field.name);
            let value = Escaped(&field.value);
            if field.name == "message" {
                format!(
                    r#"<label>{name}<textarea name="{name}">{value}</textarea></label>
"#
                )
            } else {
                format!(
                    r#"<label>{name}<input type="text" name="{name}" value="{value}"></label>
"#
                )
            }
        })
        .collect();
    format!(
        r#"<form id="contact-form" method="post" action="/contact">
{inputs}<button type="submit">Send Message</button>
</form>
"#
    )
}

fn render_notice(notice: &Notice) -> String {
    let level = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    format!(
        r#"<div class="notice notice-{level}" role="alert">{}</div>
"#,
        Escaped(&notice.text)
    )
}

/// Full document for the current state. Pending inquiries add a short meta refresh
/// so the resolved answer shows up without scripting.
pub fn render_page(view: &StorefrontView) -> String {
    let refresh = if view.transcript.iter().any(ChatMessage::is_pending) {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };
    let flash = view.flash.as_ref().map(render_notice).unwrap_or_default();
    let chat_class = if view.chat_open {
        "chat-panel open"
    } else {
        "chat-panel"
    };
    let cart_hidden = if view.cart_visible { "" } else { " hidden" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Procurement Storefront</title>
{refresh}
</head>
<body>
<header>
  <form method="post" action="/chat/toggle"><button type="submit" id="ask-procurement-btn">Ask Procurement</button></form>
</header>
{flash}<main>
<section id="catalog-grid">
{catalog}</section>
<section id="contact">
{contact}</section>
</main>
<aside id="chat-panel" class="{chat_class}">
  <form method="post" action="/chat/toggle"><button type="submit" id="close-chat-btn">Close</button></form>
  <div id="chat-conversation">
{transcript}  </div>
  <form method="post" action="/chat/questions">
    <textarea id="chat-question" name="question">{draft}</textarea>
    <button type="submit" id="send-chat-btn">Send</button>
  </form>
</aside>
<div id="cart-modal" class="modal-overlay"{cart_hidden}>
  <form method="post" action="/cart/overlay"><button type="submit" class="overlay-dismiss" name="target" value="background"></button></form>
  <div class="modal-content">
    <form method="post" action="/cart/close"><button type="submit" id="close-cart-modal-btn">Close</button></form>
    <div id="cart-items">
{cart}</div>
    <form method="post" action="/justifications"><button type="submit" id="generate-justification-btn">Generate Justification</button></form>
  </div>
</div>
</body>
</html>
"#,
        catalog = render_catalog(&view.products),
        contact = render_contact_form(&view.contact_fields),
        transcript = render_transcript(&view.transcript),
        draft = Escaped(&view.question_draft),
        cart = render_cart_summary(&view.cart_summary),
    )
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
