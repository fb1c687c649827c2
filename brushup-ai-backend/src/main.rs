use axum::{
    Router,
    extract::Json,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use study_utils::{
    ComprehensionQuestion, VocabularyItem, WritingFeedback,
    api::{
        ComprehensionRequest, ComprehensionResponse, SummarizeRequest, SummarizeResponse,
        TutorRequest, TutorResponse, VocabularyRequest, VocabularyResponse, WritingRequest,
        WritingResponse,
    },
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tysm::chat_completions::ChatClient;

const MODEL: &str = "gpt-4o-mini";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

static CLIENT: LazyLock<ChatClient> = LazyLock::new(|| ChatClient::from_env(MODEL).unwrap());

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

/// One free-text round trip to the chat completions endpoint. Used for the
/// calls that want prose back rather than a structured payload.
async fn complete_text(messages: Vec<ChatCompletionMessage>) -> Result<String, StatusCode> {
    let api_key =
        std::env::var("OPENAI_API_KEY").map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let client = reqwest::Client::new();

    let request = ChatCompletionRequest {
        model: MODEL.to_string(),
        messages,
    };

    let response = client
        .post(CHAT_COMPLETIONS_URL)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !response.status().is_success() {
        return Err(StatusCode::BAD_GATEWAY);
    }

    let response: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let reply = response
        .choices
        .into_iter()
        .next()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?
        .message
        .content;

    Ok(reply)
}

fn reject_blank(text: &str) -> Result<(), StatusCode> {
    if text.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

async fn summarize(
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, StatusCode> {
    reject_blank(&request.text)?;

    let instruction = format!(
        "Summarize the following text for an English language learner. Keep it simple and clear. Text: \"{}\"",
        request.text
    );

    let summary = complete_text(vec![ChatCompletionMessage {
        role: "user".to_string(),
        content: instruction,
    }])
    .await?;

    Ok(Json(SummarizeResponse { summary }))
}

async fn extract_vocabulary(
    Json(request): Json<VocabularyRequest>,
) -> Result<Json<VocabularyResponse>, StatusCode> {
    reject_blank(&request.text)?;

    let native_language = if request.native_language.trim().is_empty() {
        "Spanish".to_string()
    } else {
        request.native_language
    };

    let system_prompt = format!(
        r#"The user is learning English. Extract up to 8 key vocabulary words from the text they provide. Pick the words a learner is most likely to stumble on, not the most common ones. For each word, provide a simple English definition, an example sentence using the word in context, and its translation into {native_language}.

Respond with JSON."#,
    );

    #[derive(Debug, Deserialize, schemars::JsonSchema)]
    struct VocabularyLlmResponse {
        words: Vec<VocabularyItem>,
    }

    let response: VocabularyLlmResponse = CLIENT
        .chat_with_system_prompt(system_prompt, &request.text)
        .await
        .inspect_err(|e| eprintln!("Error: {e:?}"))
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(VocabularyResponse {
        words: response.words,
    }))
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct QuestionLlm {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
}

impl From<QuestionLlm> for ComprehensionQuestion {
    fn from(question: QuestionLlm) -> Self {
        ComprehensionQuestion {
            question: question.question,
            options: question.options,
            correct_answer: question.correct_answer,
            user_answer: None,
            explanation: question.explanation,
        }
    }
}

async fn generate_comprehension_questions(
    Json(request): Json<ComprehensionRequest>,
) -> Result<Json<ComprehensionResponse>, StatusCode> {
    reject_blank(&request.text)?;

    let system_prompt = r#"Generate 5 multiple-choice reading comprehension questions based on the text the user provides. The user is an English language learner. For each question, provide 4 answer options, indicate the correct answer, and a brief explanation for why it is correct. The correct answer must match one of the 4 options character for character.

Respond with JSON."#;

    #[derive(Debug, Deserialize, schemars::JsonSchema)]
    struct ComprehensionLlmResponse {
        questions: Vec<QuestionLlm>,
    }

    let response: ComprehensionLlmResponse = CLIENT
        .chat_with_system_prompt(system_prompt.to_string(), &request.text)
        .await
        .inspect_err(|e| eprintln!("Error: {e:?}"))
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(ComprehensionResponse {
        questions: response.questions.into_iter().map(Into::into).collect(),
    }))
}

async fn check_writing(
    Json(request): Json<WritingRequest>,
) -> Result<Json<WritingResponse>, StatusCode> {
    reject_blank(&request.text)?;

    let system_prompt = r#"Act as an English teacher. Review the text the user provides. Provide a corrected version of the full text. Then, list each correction you made, with the original phrase, the corrected phrase, and a brief, simple explanation of why the correction was needed. If the text has no errors, return it unchanged with an empty list of corrections.

Respond with JSON."#;

    let feedback: WritingFeedback = CLIENT
        .chat_with_system_prompt(system_prompt.to_string(), &request.text)
        .await
        .inspect_err(|e| eprintln!("Error: {e:?}"))
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(WritingResponse { feedback }))
}

async fn tutor_reply(
    Json(request): Json<TutorRequest>,
) -> Result<Json<TutorResponse>, StatusCode> {
    reject_blank(&request.message)?;

    let persona = format!(
        "You are a friendly and patient English tutor. Your goal is to help a student understand a text they have provided. Be encouraging and clear. The student's text is: \"{}\"",
        request.source_text
    );

    let mut messages = vec![ChatCompletionMessage {
        role: "system".to_string(),
        content: persona,
    }];
    for turn in request.history {
        messages.push(ChatCompletionMessage {
            role: match turn.role {
                study_utils::ChatRole::User => "user".to_string(),
                study_utils::ChatRole::Model => "assistant".to_string(),
            },
            content: turn.text,
        });
    }
    messages.push(ChatCompletionMessage {
        role: "user".to_string(),
        content: request.message,
    });

    let reply = complete_text(messages).await?;

    Ok(Json(TutorResponse { reply }))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // A missing API credential should kill the process at launch, not on the
    // first request.
    LazyLock::force(&CLIENT);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "Hello from fly.io!" }))
        .route("/summarize", post(summarize))
        .route("/vocabulary", post(extract_vocabulary))
        .route("/comprehension", post(generate_comprehension_questions))
        .route("/check-writing", post(check_writing))
        .route("/tutor", post(tutor_reply))
        .layer(CompressionLayer::new())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
    println!("Listening on port 8080");
    axum::serve(listener, app).await.unwrap();
}
