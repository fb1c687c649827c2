//! The tutor conversation session.
//!
//! At most one session exists at a time, bound to the source text that was
//! current when it was created. Editing the source text discards the handle;
//! the next message lazily creates a fresh session bound to the new text.

use study_utils::ChatTurn;

pub(crate) struct TutorSession {
    source_text: String,
    turns: Vec<ChatTurn>,
}

impl TutorSession {
    fn new(source_text: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            turns: Vec::new(),
        }
    }

    pub(crate) fn source_text(&self) -> &str {
        &self.source_text
    }

    pub(crate) fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Record one completed exchange. Failed sends are never recorded, so the
    /// replayed history only ever contains turns the tutor actually saw.
    pub(crate) fn record_exchange(&mut self, message: &str, reply: &str) {
        self.turns.push(ChatTurn::user(message));
        self.turns.push(ChatTurn::model(reply));
    }
}

#[derive(Default)]
pub(crate) struct TutorSessionManager {
    session: Option<TutorSession>,
}

impl TutorSessionManager {
    /// Called whenever the source text changes. The old handle must not be
    /// reused even if a request against it is still in flight.
    pub(crate) fn reset(&mut self) {
        self.session = None;
    }

    pub(crate) fn get_or_create(&mut self, source_text: &str) -> &mut TutorSession {
        self.session
            .get_or_insert_with(|| TutorSession::new(source_text))
    }

    /// The live session, but only if it is still bound to `source_text`.
    /// Settling a send after the text changed finds nothing to write to.
    pub(crate) fn session_bound_to(&mut self, source_text: &str) -> Option<&mut TutorSession> {
        self.session
            .as_mut()
            .filter(|session| session.source_text() == source_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_is_reused_for_same_text() {
        let mut manager = TutorSessionManager::default();

        manager
            .get_or_create("A text about whales.")
            .record_exchange("What is a whale?", "A very large sea mammal.");
        let session = manager.get_or_create("A text about whales.");

        assert_eq!(session.turns().len(), 2);
    }

    #[test]
    fn test_reset_discards_the_handle() {
        let mut manager = TutorSessionManager::default();

        manager
            .get_or_create("A text about whales.")
            .record_exchange("What is a whale?", "A very large sea mammal.");

        manager.reset();
        assert!(manager.session_bound_to("A text about whales.").is_none());

        // The next message binds a fresh session to the new text.
        let session = manager.get_or_create("A text about deserts.");
        assert_eq!(session.source_text(), "A text about deserts.");
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_settlement_against_replaced_session_finds_nothing() {
        let mut manager = TutorSessionManager::default();

        manager.get_or_create("Old text.");
        manager.reset();
        manager.get_or_create("New text.");

        assert!(manager.session_bound_to("Old text.").is_none());
        assert!(manager.session_bound_to("New text.").is_some());
    }
}
