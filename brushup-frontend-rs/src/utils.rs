use serde::de::DeserializeOwned;

pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0:?}")]
    Request(fetch_happen::Error),
    #[error("server returned {0}")]
    Http(u16),
    #[error("malformed response: {0:?}")]
    Decode(fetch_happen::Error),
}

pub(crate) async fn hit_ai_server<Request: serde::Serialize, Response: DeserializeOwned>(
    path: &str,
    request: &Request,
) -> Result<Response, GatewayError> {
    let client = fetch_happen::Client;
    let url = if cfg!(feature = "local-backend") {
        "http://localhost:8080"
    } else {
        "https://brushup-ai-backend.fly.dev"
    };
    let response = client
        .post(format!("{url}{path}"))
        .json(request)
        .map_err(GatewayError::Request)?
        .send()
        .await
        .map_err(GatewayError::Request)?;

    if !response.ok() {
        return Err(GatewayError::Http(response.status()));
    }

    response.json().await.map_err(GatewayError::Decode)
}
