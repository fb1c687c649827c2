//! The per-activity fetch/cache/loading coordinator.
//!
//! One analysis session covers the period between an analyze trigger and the
//! next (or a source-text edit). Results are cached at most once per activity
//! per session. Every fetch carries the epoch that was current when it was
//! issued; a settlement whose epoch no longer matches is discarded wholesale,
//! so a superseded fetch can never write into a newer session.

use std::collections::{BTreeMap, BTreeSet};

use study_utils::{Activity, ComprehensionQuestion, VocabularyItem, comprehension_score};

use crate::utils::GatewayError;

pub(crate) enum ActivityResult {
    Summary(String),
    Vocabulary(Vec<VocabularyItem>),
    Comprehension(Vec<ComprehensionQuestion>),
}

impl ActivityResult {
    fn activity(&self) -> Activity {
        match self {
            ActivityResult::Summary(_) => Activity::Summary,
            ActivityResult::Vocabulary(_) => Activity::Vocabulary,
            ActivityResult::Comprehension(_) => Activity::Comprehension,
        }
    }
}

#[derive(
    Copy, Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ActivityStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Permission to run one gateway fetch, stamped with the session epoch that
/// was current when it was handed out.
#[derive(Debug)]
pub(crate) struct FetchTicket {
    activity: Activity,
    epoch: u64,
}

impl FetchTicket {
    pub(crate) fn activity(&self) -> Activity {
        self.activity
    }
}

pub(crate) struct AnalysisState {
    epoch: u64,
    triggered: bool,
    active: Activity,
    validation_error: Option<String>,
    results: BTreeMap<Activity, ActivityResult>,
    loading: BTreeSet<Activity>,
    failed: BTreeSet<Activity>,
    comprehension_submitted: bool,
}

impl AnalysisState {
    pub(crate) fn new() -> Self {
        Self {
            epoch: 0,
            triggered: false,
            active: Activity::Summary,
            validation_error: None,
            results: BTreeMap::new(),
            loading: BTreeSet::new(),
            failed: BTreeSet::new(),
            comprehension_submitted: false,
        }
    }

    fn wipe_results(&mut self) {
        self.epoch += 1;
        self.results.clear();
        self.loading.clear();
        self.failed.clear();
        self.comprehension_submitted = false;
    }

    /// Start a new analysis session. Blank input sets a validation error and
    /// leaves all existing state untouched.
    pub(crate) fn analyze(&mut self, source_text: &str) -> bool {
        if source_text.trim().is_empty() {
            self.validation_error = Some("Please enter some text to analyze.".to_string());
            return false;
        }
        self.validation_error = None;
        self.triggered = true;
        self.wipe_results();
        self.active = Activity::Summary;
        true
    }

    /// The source text changed. If an analysis was in progress its results no
    /// longer describe the current text, so everything is wiped and the app
    /// reverts to the pre-analysis view.
    pub(crate) fn handle_text_edited(&mut self) {
        if self.triggered {
            self.triggered = false;
            self.wipe_results();
            self.active = Activity::Summary;
        }
    }

    pub(crate) fn select(&mut self, activity: Activity) {
        self.active = activity;
    }

    /// Hand out a fetch ticket for the activity, or decline: Writing and
    /// Tutor never auto-fetch, a cached or failed activity is not refetched,
    /// and an activity with a fetch already outstanding is not fetched twice.
    pub(crate) fn begin_fetch(&mut self, activity: Activity) -> Option<FetchTicket> {
        if !self.triggered || !activity.auto_fetches() {
            return None;
        }
        if self.results.contains_key(&activity)
            || self.loading.contains(&activity)
            || self.failed.contains(&activity)
        {
            return None;
        }
        self.loading.insert(activity);
        Some(FetchTicket {
            activity,
            epoch: self.epoch,
        })
    }

    /// Apply the outcome of a fetch. A stale ticket (the session it was
    /// issued under has been wiped) mutates nothing.
    pub(crate) fn settle_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<ActivityResult, GatewayError>,
    ) {
        if ticket.epoch != self.epoch {
            return;
        }
        self.loading.remove(&ticket.activity);
        match outcome {
            Ok(result) => {
                debug_assert_eq!(result.activity(), ticket.activity);
                self.results.entry(ticket.activity).or_insert(result);
            }
            Err(e) => {
                log::error!("Fetch for {} failed: {e}", ticket.activity);
                self.failed.insert(ticket.activity);
            }
        }
    }

    /// Clear the failed mark so the next selection fetches again.
    pub(crate) fn retry(&mut self, activity: Activity) {
        self.failed.remove(&activity);
    }

    pub(crate) fn status(&self, activity: Activity) -> ActivityStatus {
        if self.loading.contains(&activity) {
            ActivityStatus::Loading
        } else if self.results.contains_key(&activity) {
            ActivityStatus::Ready
        } else if self.failed.contains(&activity) {
            ActivityStatus::Failed
        } else {
            ActivityStatus::Idle
        }
    }

    pub(crate) fn triggered(&self) -> bool {
        self.triggered
    }

    pub(crate) fn active(&self) -> Activity {
        self.active
    }

    pub(crate) fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    pub(crate) fn summary(&self) -> Option<&str> {
        match self.results.get(&Activity::Summary) {
            Some(ActivityResult::Summary(summary)) => Some(summary),
            _ => None,
        }
    }

    pub(crate) fn vocabulary(&self) -> Option<&[VocabularyItem]> {
        match self.results.get(&Activity::Vocabulary) {
            Some(ActivityResult::Vocabulary(words)) => Some(words),
            _ => None,
        }
    }

    pub(crate) fn comprehension_questions(&self) -> Option<&[ComprehensionQuestion]> {
        match self.results.get(&Activity::Comprehension) {
            Some(ActivityResult::Comprehension(questions)) => Some(questions),
            _ => None,
        }
    }

    /// Record the learner's pick for one question. Locked after submission.
    pub(crate) fn select_comprehension_answer(&mut self, index: usize, answer: String) {
        if self.comprehension_submitted {
            return;
        }
        if let Some(ActivityResult::Comprehension(questions)) =
            self.results.get_mut(&Activity::Comprehension)
            && let Some(question) = questions.get_mut(index)
        {
            question.user_answer = Some(answer);
        }
    }

    pub(crate) fn submit_comprehension(&mut self) {
        if self.comprehension_questions().is_some() {
            self.comprehension_submitted = true;
        }
    }

    pub(crate) fn comprehension_submitted(&self) -> bool {
        self.comprehension_submitted
    }

    pub(crate) fn comprehension_score(&self) -> Option<usize> {
        if !self.comprehension_submitted {
            return None;
        }
        self.comprehension_questions().map(comprehension_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed() -> AnalysisState {
        let mut state = AnalysisState::new();
        assert!(state.analyze("The quick brown fox jumps over the lazy dog."));
        state
    }

    #[test]
    fn test_fetch_loads_then_caches() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Summary).unwrap();
        assert_eq!(state.status(Activity::Summary), ActivityStatus::Loading);

        state.settle_fetch(ticket, Ok(ActivityResult::Summary("A fox jumps.".to_string())));
        assert_eq!(state.status(Activity::Summary), ActivityStatus::Ready);
        assert_eq!(state.summary(), Some("A fox jumps."));
    }

    #[test]
    fn test_cached_activity_is_not_refetched() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Summary).unwrap();
        state.settle_fetch(ticket, Ok(ActivityResult::Summary("A fox jumps.".to_string())));

        assert!(state.begin_fetch(Activity::Summary).is_none());
    }

    #[test]
    fn test_outstanding_fetch_is_not_duplicated() {
        let mut state = analyzed();

        let _ticket = state.begin_fetch(Activity::Vocabulary).unwrap();
        assert!(state.begin_fetch(Activity::Vocabulary).is_none());
    }

    #[test]
    fn test_failure_clears_loading_and_marks_failed() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Comprehension).unwrap();
        state.settle_fetch(ticket, Err(GatewayError::Http(500)));

        assert_eq!(state.status(Activity::Comprehension), ActivityStatus::Failed);
        assert!(state.comprehension_questions().is_none());

        // A failed activity is not refetched on re-selection, only after an
        // explicit retry.
        assert!(state.begin_fetch(Activity::Comprehension).is_none());
        state.retry(Activity::Comprehension);
        assert!(state.begin_fetch(Activity::Comprehension).is_some());
    }

    #[test]
    fn test_writing_and_tutor_never_auto_fetch() {
        let mut state = analyzed();

        assert!(state.begin_fetch(Activity::Writing).is_none());
        assert!(state.begin_fetch(Activity::Tutor).is_none());
    }

    #[test]
    fn test_analyze_wipes_everything_and_selects_summary() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Summary).unwrap();
        state.settle_fetch(ticket, Ok(ActivityResult::Summary("First pass.".to_string())));
        state.select(Activity::Vocabulary);

        assert!(state.analyze("A second text about something else entirely."));
        assert_eq!(state.active(), Activity::Summary);
        assert_eq!(state.status(Activity::Summary), ActivityStatus::Idle);
        assert!(state.summary().is_none());
    }

    #[test]
    fn test_blank_analyze_sets_error_and_clears_nothing() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Summary).unwrap();
        state.settle_fetch(ticket, Ok(ActivityResult::Summary("Kept.".to_string())));

        assert!(!state.analyze("   "));
        assert_eq!(
            state.validation_error(),
            Some("Please enter some text to analyze.")
        );
        assert!(state.triggered());
        assert_eq!(state.summary(), Some("Kept."));
    }

    #[test]
    fn test_text_edit_reverts_to_pre_analysis_state() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Summary).unwrap();
        state.settle_fetch(ticket, Ok(ActivityResult::Summary("Old text.".to_string())));

        state.handle_text_edited();
        assert!(!state.triggered());
        assert!(state.summary().is_none());
        assert_eq!(state.status(Activity::Summary), ActivityStatus::Idle);
    }

    #[test]
    fn test_stale_settlement_mutates_nothing() {
        let mut state = analyzed();

        let stale = state.begin_fetch(Activity::Summary).unwrap();

        // The text changes while the fetch is outstanding, then a new
        // analysis starts.
        state.handle_text_edited();
        assert!(state.analyze("A brand new text."));

        state.settle_fetch(stale, Ok(ActivityResult::Summary("Stale result.".to_string())));
        assert!(state.summary().is_none());
        assert_eq!(state.status(Activity::Summary), ActivityStatus::Idle);

        // The new session fetches fresh.
        let fresh = state.begin_fetch(Activity::Summary).unwrap();
        state.settle_fetch(fresh, Ok(ActivityResult::Summary("Fresh result.".to_string())));
        assert_eq!(state.summary(), Some("Fresh result."));
    }

    #[test]
    fn test_cache_entry_is_write_once() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Summary).unwrap();
        state.settle_fetch(ticket, Ok(ActivityResult::Summary("First.".to_string())));

        // A duplicate settlement within the same session cannot overwrite.
        let forged = FetchTicket {
            activity: Activity::Summary,
            epoch: state.epoch,
        };
        state.settle_fetch(forged, Ok(ActivityResult::Summary("Second.".to_string())));
        assert_eq!(state.summary(), Some("First."));
    }

    #[test]
    fn test_answer_selection_locks_after_submission() {
        let mut state = analyzed();

        let questions = vec![ComprehensionQuestion {
            question: "What jumps?".to_string(),
            options: vec![
                "The fox".to_string(),
                "The dog".to_string(),
                "The cat".to_string(),
                "Nobody".to_string(),
            ],
            correct_answer: "The fox".to_string(),
            user_answer: None,
            explanation: "The fox jumps over the dog.".to_string(),
        }];
        let ticket = state.begin_fetch(Activity::Comprehension).unwrap();
        state.settle_fetch(ticket, Ok(ActivityResult::Comprehension(questions)));

        state.select_comprehension_answer(0, "The dog".to_string());
        // Re-selecting before submission overwrites.
        state.select_comprehension_answer(0, "The fox".to_string());
        state.submit_comprehension();
        state.select_comprehension_answer(0, "Nobody".to_string());

        assert_eq!(state.comprehension_score(), Some(1));
        let questions = state.comprehension_questions().unwrap();
        assert_eq!(questions[0].user_answer.as_deref(), Some("The fox"));
    }

    #[test]
    fn test_score_unavailable_before_submission() {
        let mut state = analyzed();

        let ticket = state.begin_fetch(Activity::Comprehension).unwrap();
        state.settle_fetch(ticket, Ok(ActivityResult::Comprehension(Vec::new())));

        assert_eq!(state.comprehension_score(), None);
        state.submit_comprehension();
        assert_eq!(state.comprehension_score(), Some(0));
    }
}
