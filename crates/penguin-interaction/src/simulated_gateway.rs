//! SimulatedAssistantGateway - offline stand-in for a real assistant.
//!
//! Picks one of a few canned replies after a short pause. Useful for demos
//! and for running the client without a backend.

use async_trait::async_trait;
use penguin_core::chat::HistoryEntry;
use penguin_core::gateway::{AssistantGateway, AssistantReply, GatewayError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

const GENERIC_REPLIES: [&str; 3] = [
    "Great question! Based on your input, I can provide detailed assistance. Would you like me to break this down step by step?",
    "I see you've shared some content. Let me analyze this and provide you with a comprehensive response.",
    "Excellent! This is exactly the type of problem I love solving. Here's my detailed analysis...",
];

/// Gateway that answers locally with canned text.
pub struct SimulatedAssistantGateway {
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedAssistantGateway {
    /// Creates a gateway that waits between `delay` and `delay * 1.66` per reply.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Same as [`new`](Self::new) but with reproducible choices.
    pub fn with_seed(delay: Duration, seed: u64) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick_reply(&self, message: &str) -> (String, Duration) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let jitter = if self.delay.is_zero() {
            Duration::ZERO
        } else {
            self.delay.mul_f64(rng.gen_range(0.0..0.66))
        };

        let choice = rng.gen_range(0..=GENERIC_REPLIES.len());
        let reply = match choice {
            0 => format!(
                "I understand you're asking about {}. Let me help you with that!",
                topic_of(message)
            ),
            n => GENERIC_REPLIES[n - 1].to_string(),
        };

        (reply, self.delay + jitter)
    }
}

impl Default for SimulatedAssistantGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl AssistantGateway for SimulatedAssistantGateway {
    async fn ask(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<AssistantReply, GatewayError> {
        let (reply, wait) = self.pick_reply(message);
        tracing::debug!(
            history_len = history.len(),
            wait_ms = wait.as_millis() as u64,
            "Simulating assistant reply"
        );

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        Ok(AssistantReply { response: reply })
    }
}

/// Rough subject of a message, for the topical canned reply.
fn topic_of(message: &str) -> &'static str {
    if message.contains("code") {
        "coding"
    } else if message.contains("math") {
        "mathematics"
    } else {
        "general reasoning"
    }
}
