use std::time::Duration;

use async_trait::async_trait;

use crate::{error::InquiryError, transcript::InquiryAnswer};

pub const DEFAULT_INQUIRY_DELAY: Duration = Duration::from_millis(1500);

pub const CANNED_ANSWER: &str = "Based on our documentation, all our N95 masks are NIOSH-approved under approval number TC-84A-XXXX. They are manufactured at our facility in Cleveland, Ohio, ensuring compliance with all relevant U.S. standards.";
pub const CANNED_SOURCES: &str = "Doc 4.2 §1.3, Compliance Sheet B §5";

/// Shown in place of an answer when the backend fails.
pub const UNAVAILABLE_ANSWER: &str =
    "Sorry, we couldn't reach the procurement docs right now.";

/// Answers procurement questions from product documentation.
#[async_trait]
pub trait InquiryBackend: Send + Sync {
    async fn answer(&self, question: &str) -> Result<InquiryAnswer, InquiryError>;
}

/// Stand-in backend: waits a fixed delay, then returns the same answer for any question.
#[derive(Debug, Clone)]
pub struct CannedInquiryBackend {
    delay: Duration,
}

impl CannedInquiryBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for CannedInquiryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_INQUIRY_DELAY)
    }
}

#[async_trait]
impl InquiryBackend for CannedInquiryBackend {
    async fn answer(&self, question: &str) -> Result<InquiryAnswer, InquiryError> {
        tracing::debug!(
            question_len = question.len(),
            delay_ms = self.delay.as_millis() as u64,
            "canned inquiry backend answering"
        );
        tokio::time::sleep(self.delay).await;
        Ok(InquiryAnswer {
            text: CANNED_ANSWER.to_string(),
            sources: Some(CANNED_SOURCES.to_string()),
        })
    }
}

pub(crate) fn unavailable_answer() -> InquiryAnswer {
    InquiryAnswer {
        text: UNAVAILABLE_ANSWER.to_string(),
        sources: None,
    }
}

#[cfg(test)]
#[path = "tests/inquiry_tests.rs"]
mod tests;
