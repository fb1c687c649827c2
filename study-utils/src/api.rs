//! Request and response types for the brushup AI backend.

use crate::{ChatTurn, ComprehensionQuestion, VocabularyItem, WritingFeedback};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct SummarizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct VocabularyRequest {
    pub text: String,
    pub native_language: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct VocabularyResponse {
    pub words: Vec<VocabularyItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ComprehensionRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ComprehensionResponse {
    pub questions: Vec<ComprehensionQuestion>,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WritingRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WritingResponse {
    pub feedback: WritingFeedback,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct TutorRequest {
    /// The text the learner pasted; it anchors the tutor persona.
    pub source_text: String,
    /// Prior turns of the conversation, oldest first.
    pub history: Vec<ChatTurn>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, schemars::JsonSchema, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct TutorResponse {
    pub reply: String,
}
