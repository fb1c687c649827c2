//! Writing-practice view state. Feedback lives here, never in the activity
//! result cache; each check is driven by an explicit user action.

use study_utils::WritingFeedback;

use crate::utils::GatewayError;

pub(crate) struct WritingTicket {
    generation: u64,
}

#[derive(Default)]
pub(crate) struct WritingState {
    generation: u64,
    feedback: Option<WritingFeedback>,
    loading: bool,
    error: Option<String>,
}

impl WritingState {
    /// Validate and start one feedback request. Blank input sets the view's
    /// validation error and declines.
    pub(crate) fn begin_check(&mut self, text: &str) -> Option<WritingTicket> {
        if text.trim().is_empty() {
            self.error = Some("Please write something to get feedback.".to_string());
            return None;
        }
        if self.loading {
            return None;
        }
        self.loading = true;
        self.error = None;
        self.feedback = None;
        Some(WritingTicket {
            generation: self.generation,
        })
    }

    pub(crate) fn settle(
        &mut self,
        ticket: WritingTicket,
        outcome: Result<WritingFeedback, GatewayError>,
    ) {
        if ticket.generation != self.generation {
            return;
        }
        self.loading = false;
        match outcome {
            Ok(feedback) => self.feedback = Some(feedback),
            Err(e) => {
                log::error!("Writing feedback failed: {e}");
                self.error =
                    Some("Sorry, something went wrong while getting feedback.".to_string());
            }
        }
    }

    /// The view unmounts when a new analysis starts; everything resets and
    /// any in-flight check becomes stale.
    pub(crate) fn reset(&mut self) {
        self.generation += 1;
        self.feedback = None;
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn feedback(&self) -> Option<&WritingFeedback> {
        self.feedback.as_ref()
    }

    pub(crate) fn loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback() -> WritingFeedback {
        WritingFeedback {
            corrected_text: "I went to the store.".to_string(),
            explanations: Vec::new(),
        }
    }

    #[test]
    fn test_blank_input_sets_error_without_loading() {
        let mut state = WritingState::default();

        assert!(state.begin_check("  ").is_none());
        assert_eq!(
            state.error(),
            Some("Please write something to get feedback.")
        );
        assert!(!state.loading());
    }

    #[test]
    fn test_check_clears_previous_feedback_and_error() {
        let mut state = WritingState::default();

        let ticket = state.begin_check("I goed to the store.").unwrap();
        state.settle(ticket, Ok(feedback()));
        assert!(state.feedback().is_some());

        let ticket = state.begin_check("Another attempt.").unwrap();
        assert!(state.feedback().is_none());
        assert!(state.loading());
        state.settle(ticket, Err(GatewayError::Http(500)));

        assert!(!state.loading());
        assert_eq!(
            state.error(),
            Some("Sorry, something went wrong while getting feedback.")
        );
    }

    #[test]
    fn test_stale_check_does_not_resurface_after_reset() {
        let mut state = WritingState::default();

        let ticket = state.begin_check("I goed to the store.").unwrap();
        state.reset();
        state.settle(ticket, Ok(feedback()));

        assert!(state.feedback().is_none());
        assert!(!state.loading());
    }
}
