use mockito::Matcher;
use provider_bridge::Error;
use provider_bridge::config::OllamaConfig;
use provider_bridge::llm::{ChatProvider, ChatRequest, OllamaModerator, OllamaProvider};
use provider_bridge::moderation::Moderator;
use serde_json::json;

fn config(base_url: String, moderation_enabled: bool) -> OllamaConfig {
    OllamaConfig {
        base_url,
        api_key: Some("sk-test".to_string()),
        org_key: Some("org-test".to_string()),
        moderation_enabled,
        ..Default::default()
    }
}

fn moderation_body(flagged: bool) -> String {
    json!({
        "results": [{
            "flagged": flagged,
            "categories": {"violence": flagged, "hate": false}
        }]
    })
    .to_string()
}

fn completion_body() -> String {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": "Hello!"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
    })
    .to_string()
}

#[tokio::test]
async fn test_chat_moderates_then_completes() {
    let mut server = mockito::Server::new_async().await;
    let moderation = server
        .mock("POST", "/moderations")
        .match_header("authorization", "Bearer sk-test")
        .match_header("openai-organization", "org-test")
        .with_status(200)
        .with_body(moderation_body(false))
        .expect(2)
        .create_async()
        .await;
    let chat = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama3.2:latest",
            "max_tokens": 270,
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .with_status(200)
        .with_body(completion_body())
        .create_async()
        .await;

    let provider = OllamaProvider::new(config(server.url(), true), reqwest::Client::new());
    let completion = provider
        .chat(ChatRequest::prompt("hi", Some("be brief".to_string())))
        .await
        .unwrap();

    moderation.assert_async().await;
    chat.assert_async().await;
    assert_eq!(completion.generated_text, "Hello!");
    assert_eq!(completion.usage.total_tokens, Some(5));
    assert_eq!(completion.original_response["choices"][0]["finish_reason"], "stop");
}

#[tokio::test]
async fn test_flagged_prompt_is_refused_before_chat() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/moderations")
        .with_status(200)
        .with_body(moderation_body(true))
        .create_async()
        .await;
    let chat = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let provider = OllamaProvider::new(config(server.url(), true), reqwest::Client::new());
    let err = provider
        .chat(ChatRequest::prompt("something awful", None))
        .await
        .unwrap_err();

    match err {
        Error::Moderation(msg) => assert!(msg.contains("violence"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
    chat.assert_async().await;
}

#[tokio::test]
async fn test_moderation_disabled_skips_checks() {
    let mut server = mockito::Server::new_async().await;
    let moderation = server
        .mock("POST", "/moderations")
        .expect(0)
        .create_async()
        .await;
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 32})))
        .with_status(200)
        .with_body(completion_body())
        .create_async()
        .await;

    let provider = OllamaProvider::new(config(server.url(), false), reqwest::Client::new());
    let request = ChatRequest {
        max_tokens: Some(32),
        ..ChatRequest::prompt("hi", None)
    };
    provider.chat(request).await.unwrap();
    moderation.assert_async().await;
}

#[tokio::test]
async fn test_vendor_error_keeps_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("model is loading")
        .create_async()
        .await;

    let provider = OllamaProvider::new(config(server.url(), false), reqwest::Client::new());
    let err = provider
        .chat(ChatRequest::prompt("hi", None))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("model is loading"));
}

#[tokio::test]
async fn test_moderator_sends_input() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/moderations")
        .match_body(Matcher::Json(json!({"input": "check me"})))
        .with_status(200)
        .with_body(moderation_body(true))
        .create_async()
        .await;

    let moderator = OllamaModerator::new(config(server.url(), true), reqwest::Client::new());
    let verdict = moderator.check("check me").await.unwrap();

    mock.assert_async().await;
    assert!(verdict.flagged);
    assert_eq!(verdict.categories, vec!["violence".to_string()]);
}
