//! Canned-response simulator standing in for a real model. A reply is chosen
//! by keyword-matching the user's message against a fixed rule list, then
//! returned after an artificial latency delay.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

const DEFAULT_MIN_DELAY_MS: u64 = 1200;
const DEFAULT_MAX_DELAY_MS: u64 = 3000;

/// Rules are evaluated in this fixed priority order; first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCategory {
    Greeting,
    WebDevelopment,
    ArtificialIntelligence,
    General,
}

const GREETING_KEYWORDS: &[&str] = &["hello", "hi", "hey"];
const WEB_DEV_KEYWORDS: &[&str] = &["react", "javascript", "web development"];
const AI_KEYWORDS: &[&str] = &["ai", "artificial intelligence", "machine learning"];

const GREETING_REPLIES: &[&str] = &[
    "Hello! I'm here to help you with any questions you might have. What would you like to know?",
    "Hi there! It's great to meet you. How can I assist you today?",
    "Hey! Welcome to our conversation. What's on your mind?",
];

const WEB_DEV_REPLIES: &[&str] = &[
    "React is a powerful JavaScript library for building user interfaces. Here are some key \
     concepts:\n\n\u{2022} Components: Reusable UI building blocks\n\u{2022} State: Data that \
     changes over time\n\u{2022} Props: Data passed between components\n\u{2022} Hooks: \
     Functions that let you use state and other React features\n\nWhat specific aspect of \
     React would you like to explore?",
    "Web development with React involves creating dynamic, interactive applications. Some best \
     practices include:\n\n1. Keep components small and focused\n2. Use functional components \
     with hooks\n3. Implement proper state management\n4. Follow naming conventions\n5. Write \
     tests for your components\n\nWould you like me to elaborate on any of these points?",
];

const AI_REPLIES: &[&str] = &[
    "Artificial Intelligence is a fascinating field that encompasses:\n\n\u{2022} Machine \
     Learning: Algorithms that learn from data\n\u{2022} Natural Language Processing: \
     Understanding human language\n\u{2022} Computer Vision: Interpreting visual \
     information\n\u{2022} Robotics: Intelligent physical systems\n\u{2022} Expert Systems: \
     Knowledge-based decision making\n\nWhich area interests you most?",
    "AI has revolutionized many industries through automation, pattern recognition, predictive \
     analytics, and personalized experiences. Would you like to explore any specific \
     applications?",
];

const GENERAL_REPLIES: &[&str] = &[
    "That's an interesting topic! Could you provide more details about what you'd like to know?",
    "I'd be happy to help you with that. Can you give me more context about your specific \
     question?",
    "Thank you for your question! Let me provide you with some helpful information about that \
     topic.",
    "That's a great point to explore. Here's what I can tell you about that subject.",
];

/// Stateless reply generator. The caller turns the returned string into a
/// [`crate::models::Message`] and appends it; the per-conversation
/// Idle/Generating state lives in the chat service.
#[derive(Debug, Clone)]
pub struct SimulatedAgent {
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl Default for SimulatedAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedAgent {
    pub fn new() -> Self {
        Self {
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }

    /// Zero-latency agent for tests and ephemeral demos.
    pub fn instant() -> Self {
        Self::with_delay_ms(0, 0)
    }

    pub fn with_delay_ms(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_delay_ms: max_delay_ms.max(min_delay_ms),
        }
    }

    /// Case-folds the message and tests the keyword rules in priority order.
    /// Matching is on substrings, not whole words.
    pub fn contextual_category(message: &str) -> ResponseCategory {
        let lower = message.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if matches(GREETING_KEYWORDS) {
            ResponseCategory::Greeting
        } else if matches(WEB_DEV_KEYWORDS) {
            ResponseCategory::WebDevelopment
        } else if matches(AI_KEYWORDS) {
            ResponseCategory::ArtificialIntelligence
        } else {
            ResponseCategory::General
        }
    }

    pub fn replies_for(category: ResponseCategory) -> &'static [&'static str] {
        match category {
            ResponseCategory::Greeting => GREETING_REPLIES,
            ResponseCategory::WebDevelopment => WEB_DEV_REPLIES,
            ResponseCategory::ArtificialIntelligence => AI_REPLIES,
            ResponseCategory::General => GENERAL_REPLIES,
        }
    }

    /// Produces a canned reply for `message` after the simulated latency.
    /// Cannot fail: a zero delay range simply skips the suspension.
    pub async fn generate_reply(&self, message: &str) -> String {
        let category = Self::contextual_category(message);
        let replies = Self::replies_for(category);

        // the RNG must not be held across the await
        let (delay_ms, pick) = {
            let mut rng = rand::thread_rng();
            let delay_ms = if self.max_delay_ms > self.min_delay_ms {
                rng.gen_range(self.min_delay_ms..self.max_delay_ms)
            } else {
                self.min_delay_ms
            };
            (delay_ms, rng.gen_range(0..replies.len()))
        };

        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        debug!(?category, delay_ms, "Simulated reply ready");
        replies[pick].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_matches_first() {
        assert_eq!(
            SimulatedAgent::contextual_category("hello"),
            ResponseCategory::Greeting
        );
        assert_eq!(
            SimulatedAgent::contextual_category("HEY you"),
            ResponseCategory::Greeting
        );
    }

    #[test]
    fn ai_keywords_match() {
        assert_eq!(
            SimulatedAgent::contextual_category("what is AI"),
            ResponseCategory::ArtificialIntelligence
        );
    }

    #[test]
    fn web_dev_outranks_ai() {
        // "javascript" is tested before the AI rules
        assert_eq!(
            SimulatedAgent::contextual_category("javascript and machine learning"),
            ResponseCategory::WebDevelopment
        );
    }

    #[test]
    fn unmatched_message_falls_back_to_general() {
        assert_eq!(
            SimulatedAgent::contextual_category("xyz123"),
            ResponseCategory::General
        );
    }

    #[tokio::test]
    async fn reply_is_a_member_of_the_matched_set() {
        let agent = SimulatedAgent::instant();
        for (message, category) in [
            ("hello", ResponseCategory::Greeting),
            ("tell me about react", ResponseCategory::WebDevelopment),
            ("what is AI", ResponseCategory::ArtificialIntelligence),
            ("xyz123", ResponseCategory::General),
        ] {
            let reply = agent.generate_reply(message).await;
            assert!(
                SimulatedAgent::replies_for(category).contains(&reply.as_str()),
                "reply for {message:?} came from the wrong set"
            );
        }
    }
}
