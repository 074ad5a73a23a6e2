//! Gemini provider against a mock HTTP server.

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trip_planner::error::PlannerError;
use trip_planner::models::GeminiModel;
use trip_planner::provider::{GeminiProvider, ModelProvider, ProviderRequest};
use trip_planner::tools::ToolSpec;
use trip_planner::types::{Content, FinishReason, GenerationSettings};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";
const STREAM_PATH: &str = "/models/gemini-2.5-flash:streamGenerateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(
        GeminiModel::Gemini25Flash,
        "test-key".to_string(),
        server.uri(),
    )
}

fn request() -> ProviderRequest {
    ProviderRequest {
        contents: vec![Content::user("Quero ver cascatas")],
        system_instruction: Some("Recommend places in Angola.".into()),
        tools: vec![ToolSpec::GoogleSearch],
        settings: GenerationSettings::default(),
    }
}

#[tokio::test]
async fn generate_content_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Quero ver cascatas"}]}],
            "systemInstruction": {"parts": [{"text": "Recommend places in Angola."}]},
            "tools": [{"google_search": {}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Kalandula Falls", "thought": false},
                    {"text": " in Malanje."}
                ]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "webSearchQueries": ["cascatas Angola"],
                    "groundingChunks": [{"web": {"uri": "https://example.org/kalandula", "title": "Kalandula"}}]
                }
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .generate_content(&request())
        .await
        .expect("generate should succeed");

    assert_eq!(response.text(), "Kalandula Falls in Malanje.");
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    let grounding = response.grounding.expect("grounding");
    assert_eq!(grounding.web_search_queries, vec!["cascatas Angola".to_string()]);
    assert_eq!(grounding.sources[0].uri, "https://example.org/kalandula");
    assert_eq!(response.usage.unwrap().total_tokens, 20);
}

#[tokio::test]
async fn thought_parts_are_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking about beaches", "thought": true},
                    {"text": "Baía Azul"}
                ]},
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    let response = provider(&server).generate_content(&request()).await.unwrap();
    assert_eq!(response.text(), "Baía Azul");
}

#[tokio::test]
async fn prompt_block_has_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let response = provider(&server).generate_content(&request()).await.unwrap();
    assert!(response.content.is_none());
    assert_eq!(response.block_reason.as_deref(), Some("SAFETY"));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let err = provider(&server).generate_content(&request()).await.unwrap_err();
    assert!(matches!(err, PlannerError::Authentication(_)), "{err:?}");
}

#[tokio::test]
async fn server_error_keeps_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "The model is overloaded."}
        })))
        .mount(&server)
        .await;

    let err = provider(&server).generate_content(&request()).await.unwrap_err();
    match err {
        PlannerError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "The model is overloaded.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn stream_content_yields_each_sse_chunk() {
    let server = MockServer::start().await;

    let sse = concat!(
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Serra \"}]}}]}\n\n",
        "data: not json\n\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"da Leba\"}]},\"finishReason\":\"STOP\"}]}\n\n",
    );

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .expect(1)
        .mount(&server)
        .await;

    let chunks: Vec<_> = provider(&server)
        .stream_content(&request())
        .await
        .expect("stream should open")
        .collect()
        .await;

    let texts: Vec<String> = chunks
        .iter()
        .map(|chunk| chunk.as_ref().unwrap().text())
        .collect();
    assert_eq!(texts, vec!["Serra ".to_string(), "da Leba".to_string()]);
    assert_eq!(
        chunks[1].as_ref().unwrap().finish_reason,
        Some(FinishReason::Stop)
    );
}

/// Serve `body` as an SSE response in two TCP writes split at `split`.
async fn serve_in_two_writes(body: Vec<u8>, split: usize) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let Some(head_end) = request.windows(4).position(|w| w == &b"\r\n\r\n"[..]) else {
                continue;
            };
            let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= head_end + 4 + content_length {
                break;
            }
        }

        let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body[..split]).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        socket.write_all(&body[split..]).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn stream_content_keeps_characters_split_across_chunks() {
    let body = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Benguela é linda\"}]},\"finishReason\":\"STOP\"}]}\n\n"
        .as_bytes()
        .to_vec();
    let e_acute = body.windows(2).position(|w| w == &[0xC3u8, 0xA9][..]).unwrap();
    let base_url = serve_in_two_writes(body, e_acute + 1).await;

    let provider = GeminiProvider::new(GeminiModel::Gemini25Flash, "test-key".to_string(), base_url);
    let chunks: Vec<_> = provider
        .stream_content(&request())
        .await
        .expect("stream should open")
        .collect()
        .await;

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].as_ref().unwrap().text(), "Benguela é linda");
}
