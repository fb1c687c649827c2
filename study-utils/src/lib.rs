pub mod api;

#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Ord,
    PartialOrd,
    Hash,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Activity {
    Summary,
    Vocabulary,
    Comprehension,
    Writing,
    Tutor,
}

impl Activity {
    /// Summary, Vocabulary, and Comprehension are fetched automatically when
    /// their tab is selected. Writing and Tutor are driven by user actions
    /// inside their own views.
    pub fn auto_fetches(&self) -> bool {
        match self {
            Activity::Summary | Activity::Vocabulary | Activity::Comprehension => true,
            Activity::Writing | Activity::Tutor => false,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Activity::Summary => "book-open",
            Activity::Vocabulary => "sparkles",
            Activity::Comprehension => "question-mark-circle",
            Activity::Writing => "pencil",
            Activity::Tutor => "chat-bubble",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Activity::Summary => "Summary",
            Activity::Vocabulary => "Vocabulary",
            Activity::Comprehension => "Comprehension",
            Activity::Writing => "Writing",
            Activity::Tutor => "Tutor",
        };
        write!(f, "{label}")
    }
}

pub const ACTIVITIES: &[Activity] = &[
    Activity::Summary,
    Activity::Vocabulary,
    Activity::Comprehension,
    Activity::Writing,
    Activity::Tutor,
];

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct VocabularyItem {
    /// The vocabulary word as it appears in the text.
    pub word: String,
    /// A simple English definition.
    pub definition: String,
    /// An example sentence using the word in context.
    pub example: String,
    /// The translation of the word into the learner's native language.
    pub translation: String,
}

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ComprehensionQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    pub explanation: String,
}

impl ComprehensionQuestion {
    pub fn answered_correctly(&self) -> bool {
        self.user_answer.as_deref() == Some(self.correct_answer.as_str())
    }
}

/// Score = how many questions have a selected answer equal to the correct one.
pub fn comprehension_score(questions: &[ComprehensionQuestion]) -> usize {
    questions.iter().filter(|q| q.answered_correctly()).count()
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WritingExplanation {
    /// The original phrase or word with the error.
    pub original: String,
    /// The corrected phrase or word.
    pub correction: String,
    /// A simple explanation of why the correction was needed.
    pub reason: String,
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WritingFeedback {
    /// The full text with all corrections applied.
    pub corrected_text: String,
    pub explanations: Vec<WritingExplanation>,
}

#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ChatRole {
    User,
    Model,
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: &str, picked: Option<&str>) -> ComprehensionQuestion {
        ComprehensionQuestion {
            question: "Which word means 'happy'?".to_string(),
            options: vec![
                "joyful".to_string(),
                "tired".to_string(),
                "hungry".to_string(),
                "late".to_string(),
            ],
            correct_answer: correct.to_string(),
            user_answer: picked.map(|p| p.to_string()),
            explanation: "'Joyful' is a synonym for 'happy'.".to_string(),
        }
    }

    #[test]
    fn test_score_counts_only_matching_answers() {
        let questions = vec![
            question("joyful", Some("joyful")),
            question("tired", Some("tired")),
            question("hungry", Some("late")),
            question("late", Some("late")),
            question("joyful", None),
        ];

        assert_eq!(comprehension_score(&questions), 3);
    }

    #[test]
    fn test_unanswered_question_is_never_correct() {
        let q = question("joyful", None);
        assert!(!q.answered_correctly());
    }

    #[test]
    fn test_vocabulary_item_rejects_missing_translation() {
        let payload = r#"{
            "word": "resilient",
            "definition": "able to recover quickly from difficulties",
            "example": "She stayed resilient after the setback."
        }"#;

        let result: Result<VocabularyItem, _> = serde_json::from_str(payload);
        assert!(result.is_err());
    }

    #[test]
    fn test_writing_feedback_rejects_missing_reason() {
        let payload = r#"{
            "corrected_text": "I went to the store yesterday.",
            "explanations": [{"original": "goed", "correction": "went"}]
        }"#;

        let result: Result<WritingFeedback, _> = serde_json::from_str(payload);
        assert!(result.is_err());
    }

    #[test]
    fn test_activities_are_ordered_with_summary_first() {
        assert_eq!(ACTIVITIES.first(), Some(&Activity::Summary));
        assert_eq!(ACTIVITIES.len(), 5);
    }
}
