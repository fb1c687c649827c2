#![deny(clippy::string_slice)]

mod analysis;
mod tutor;
mod utils;
mod writing;

pub use analysis::ActivityStatus;

use std::cell::RefCell;
use std::sync::LazyLock;

use study_utils::{
    ACTIVITIES, Activity, ChatTurn,
    api::{
        ComprehensionRequest, ComprehensionResponse, SummarizeRequest, SummarizeResponse,
        TutorRequest, TutorResponse, VocabularyRequest, VocabularyResponse, WritingRequest,
        WritingResponse,
    },
};
use wasm_bindgen::prelude::*;

use crate::analysis::{ActivityResult, AnalysisState};
use crate::tutor::TutorSessionManager;
use crate::utils::hit_ai_server;
use crate::writing::WritingState;

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[allow(clippy::declare_interior_mutable_const)]
const LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ActivityInfo {
    pub activity: Activity,
    pub label: String,
    pub icon: String,
}

/// The fixed, ordered set of activity tabs.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_activities() -> Vec<ActivityInfo> {
    ACTIVITIES
        .iter()
        .map(|activity| ActivityInfo {
            activity: *activity,
            label: activity.to_string(),
            icon: activity.icon().to_string(),
        })
        .collect()
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

struct AppState {
    source_text: String,
    native_language: String,
    analysis: AnalysisState,
    tutor: TutorSessionManager,
    tutor_messages: Vec<ChatTurn>,
    tutor_waiting: bool,
    writing: WritingState,
}

impl AppState {
    fn new() -> Self {
        Self {
            source_text: String::new(),
            native_language: "Spanish".to_string(),
            analysis: AnalysisState::new(),
            tutor: TutorSessionManager::default(),
            tutor_messages: Vec::new(),
            tutor_waiting: false,
            writing: WritingState::default(),
        }
    }
}

#[wasm_bindgen]
pub struct Brushup {
    // btw, we should never hold a borrow across an .await. by avoiding this,
    // we guarantee the absence of "borrow while locked" panics
    state: RefCell<AppState>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl Brushup {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        // used to only initialize the logger once
        #[allow(clippy::borrow_interior_mutable_const)]
        *LOGGER;

        Self {
            state: RefCell::new(AppState::new()),
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_source_text(&self, text: String) {
        let mut state = self.state.borrow_mut();
        if text == state.source_text {
            return;
        }
        state.source_text = text;
        // The tutor session is bound to the text it was created with, so any
        // text change invalidates it, analysis or not.
        state.tutor.reset();
        if state.analysis.triggered() {
            state.analysis.handle_text_edited();
            state.writing.reset();
            state.tutor_messages.clear();
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn source_text(&self) -> String {
        self.state.borrow().source_text.clone()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_native_language(&self, language: String) {
        self.state.borrow_mut().native_language = language;
    }

    /// Start a new analysis session over the current source text. Returns
    /// false (and sets a validation error) on blank input.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn analyze(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let started = state.analysis.analyze(&state.source_text);
        if started {
            state.writing.reset();
            state.tutor_messages.clear();
        }
        started
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn analysis_triggered(&self) -> bool {
        self.state.borrow().analysis.triggered()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn validation_error(&self) -> Option<String> {
        self.state
            .borrow()
            .analysis
            .validation_error()
            .map(|e| e.to_string())
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn select_activity(&self, activity: Activity) {
        self.state.borrow_mut().analysis.select(activity);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn active_activity(&self) -> Activity {
        self.state.borrow().analysis.active()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn activity_status(&self, activity: Activity) -> ActivityStatus {
        self.state.borrow().analysis.status(activity)
    }

    /// Clear an activity's failed mark so `fetch_activity` will try it again.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn retry_activity(&self, activity: Activity) {
        self.state.borrow_mut().analysis.retry(activity);
    }

    /// Fetch the activity's content if it is one of the auto-fetched kinds
    /// and nothing is cached, loading, or failed for it. The UI calls this
    /// whenever a tab becomes active.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn fetch_activity(&self, activity: Activity) {
        let (ticket, text, native_language) = {
            let mut state = self.state.borrow_mut();
            let Some(ticket) = state.analysis.begin_fetch(activity) else {
                return;
            };
            (
                ticket,
                state.source_text.clone(),
                state.native_language.clone(),
            )
        };

        let outcome = match ticket.activity() {
            Activity::Summary => hit_ai_server("/summarize", &SummarizeRequest { text })
                .await
                .map(|response: SummarizeResponse| ActivityResult::Summary(response.summary)),
            Activity::Vocabulary => hit_ai_server(
                "/vocabulary",
                &VocabularyRequest {
                    text,
                    native_language,
                },
            )
            .await
            .map(|response: VocabularyResponse| ActivityResult::Vocabulary(response.words)),
            Activity::Comprehension => {
                hit_ai_server("/comprehension", &ComprehensionRequest { text })
                    .await
                    .map(|response: ComprehensionResponse| {
                        ActivityResult::Comprehension(response.questions)
                    })
            }
            // begin_fetch never hands out tickets for these.
            Activity::Writing | Activity::Tutor => return,
        };

        self.state.borrow_mut().analysis.settle_fetch(ticket, outcome);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn summary(&self) -> Option<String> {
        self.state
            .borrow()
            .analysis
            .summary()
            .map(|s| s.to_string())
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn vocabulary(&self) -> JsValue {
        let state = self.state.borrow();
        serde_wasm_bindgen::to_value(&state.analysis.vocabulary()).unwrap_or(JsValue::NULL)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn comprehension_questions(&self) -> JsValue {
        let state = self.state.borrow();
        serde_wasm_bindgen::to_value(&state.analysis.comprehension_questions())
            .unwrap_or(JsValue::NULL)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn select_comprehension_answer(&self, index: usize, answer: String) {
        self.state
            .borrow_mut()
            .analysis
            .select_comprehension_answer(index, answer);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn submit_comprehension(&self) {
        self.state.borrow_mut().analysis.submit_comprehension();
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn comprehension_submitted(&self) -> bool {
        self.state.borrow().analysis.comprehension_submitted()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn comprehension_score(&self) -> Option<usize> {
        self.state.borrow().analysis.comprehension_score()
    }

    /// Ask for feedback on a piece of the learner's own writing. Independent
    /// of the activity result cache.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn check_writing(&self, text: String) {
        let ticket = {
            let mut state = self.state.borrow_mut();
            let Some(ticket) = state.writing.begin_check(&text) else {
                return;
            };
            ticket
        };

        let outcome = hit_ai_server("/check-writing", &WritingRequest { text })
            .await
            .map(|response: WritingResponse| response.feedback);

        self.state.borrow_mut().writing.settle(ticket, outcome);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn writing_feedback(&self) -> JsValue {
        let state = self.state.borrow();
        serde_wasm_bindgen::to_value(&state.writing.feedback()).unwrap_or(JsValue::NULL)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn writing_loading(&self) -> bool {
        self.state.borrow().writing.loading()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn writing_error(&self) -> Option<String> {
        self.state.borrow().writing.error().map(|e| e.to_string())
    }

    /// Send one message to the tutor. Creates the session lazily, bound to
    /// the current source text.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn send_tutor_message(&self, message: String) {
        if message.trim().is_empty() {
            return;
        }

        let request = {
            let mut state = self.state.borrow_mut();
            if state.tutor_waiting {
                return;
            }
            state.tutor_waiting = true;
            state.tutor_messages.push(ChatTurn::user(message.as_str()));
            let source_text = state.source_text.clone();
            let session = state.tutor.get_or_create(&source_text);
            TutorRequest {
                source_text: session.source_text().to_string(),
                history: session.turns().to_vec(),
                message: message.clone(),
            }
        };

        let outcome: Result<TutorResponse, _> = hit_ai_server("/tutor", &request).await;

        let mut state = self.state.borrow_mut();
        state.tutor_waiting = false;
        match outcome {
            Ok(response) => {
                state
                    .tutor_messages
                    .push(ChatTurn::model(response.reply.as_str()));
                // Only a session still bound to the same text records the
                // exchange; a reset mid-flight leaves nothing to write to.
                if let Some(session) = state.tutor.session_bound_to(&request.source_text) {
                    session.record_exchange(&request.message, &response.reply);
                }
            }
            Err(e) => {
                log::error!("Tutor message failed: {e}");
                state
                    .tutor_messages
                    .push(ChatTurn::model("Sorry, I encountered an error. Please try again."));
            }
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn tutor_messages(&self) -> JsValue {
        let state = self.state.borrow();
        serde_wasm_bindgen::to_value(&state.tutor_messages).unwrap_or(JsValue::NULL)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn tutor_waiting(&self) -> bool {
        self.state.borrow().tutor_waiting
    }
}
