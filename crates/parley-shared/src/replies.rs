//! Canned text used by the simulated assistant and the history synthesizer.

use rand::seq::SliceRandom;
use rand::Rng;

/// Replies the assistant picks from after a user message.
pub const ASSISTANT_REPLIES: &[&str] = &[
    "That's an interesting question! Let me think about that...",
    "I understand what you're asking. Here's what I think...",
    "Great point! Based on my understanding...",
    "Let me help you with that. From what I can see...",
    "That's a thoughtful query. In my analysis...",
    "I appreciate your question. Here's my perspective...",
    "Excellent question! Let me break this down...",
    "I see where you're coming from. To address that...",
    "That's worth exploring. Consider this...",
    "Interesting approach! Here's how I'd think about it...",
];

/// User-side lines for synthesized history.
pub const HISTORY_USER_LINES: &[&str] = &[
    "Hello, how are you?",
    "Can you help me with this?",
    "What do you think about that?",
    "Tell me more about this topic",
    "That's interesting!",
    "I have a question",
    "Could you explain that better?",
    "Thanks for your help",
];

/// Assistant-side lines for synthesized history.
pub const HISTORY_ASSISTANT_LINES: &[&str] = &[
    "Hello! I'm doing well, thank you for asking. How can I assist you today?",
    "Of course! I'd be happy to help. What specifically would you like to know?",
    "That's an excellent question. Let me share my thoughts on this...",
    "I'd be glad to elaborate. Here's what you should know...",
    "I'm pleased you find this engaging! Let's explore it further.",
    "Feel free to ask anything. I'm here to help you.",
    "Let me break that down for you in simpler terms...",
    "You're welcome! Is there anything else you'd like to know?",
];

/// Pick one line uniformly at random; an empty set yields "".
pub fn pick<'a, R: Rng + ?Sized>(rng: &mut R, lines: &[&'a str]) -> &'a str {
    lines.choose(rng).copied().unwrap_or_default()
}

pub fn assistant_reply<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(rng, ASSISTANT_REPLIES)
}
