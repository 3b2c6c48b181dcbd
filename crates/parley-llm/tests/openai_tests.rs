#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use parking_lot::Mutex;
    use parley_core::{InvocationMode, ParleyError, Turn};
    use parley_llm::{ChatEndpoint, ChatRequest, OpenAiEndpoint};
    use serde_json::{Value, json};

    #[derive(Debug, Clone)]
    struct Captured {
        authorization: Option<String>,
        content_type: Option<String>,
        body: Value,
    }

    /// Serve one canned body on `/v1/chat/completions`, recording every request.
    async fn fake_endpoint(
        status: StatusCode,
        content_type: &'static str,
        body: String,
    ) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, raw: String| {
                let sink = Arc::clone(&sink);
                let body = body.clone();
                async move {
                    let header_str = |name: header::HeaderName| {
                        headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    sink.lock().push(Captured {
                        authorization: header_str(header::AUTHORIZATION),
                        content_type: header_str(header::CONTENT_TYPE),
                        body: serde_json::from_str(&raw).unwrap_or(Value::Null),
                    });
                    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v1"), captured)
    }

    fn request() -> ChatRequest {
        ChatRequest::new("gpt-3.5-turbo", vec![Turn::user("What is 2+2?")]).with_functions(
            vec![json!({"name": "python", "description": "", "parameters": {"type": "object", "properties": {}, "required": []}})],
            InvocationMode::Auto,
        )
    }

    #[tokio::test]
    async fn test_success_body_and_headers() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "4"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
        });
        let (base, captured) =
            fake_endpoint(StatusCode::OK, "application/json", body.to_string()).await;

        let endpoint = OpenAiEndpoint::new("sk-test").with_base_url(base);
        let reply = endpoint.complete(&request()).await.unwrap().into_reply().unwrap();
        assert_eq!(reply.text(), "4");

        let captured = captured.lock();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].authorization.as_deref(), Some("Bearer sk-test"));
        assert_eq!(captured[0].content_type.as_deref(), Some("application/json"));
        assert_eq!(captured[0].body["model"], "gpt-3.5-turbo");
        assert_eq!(captured[0].body["messages"][0]["content"], "What is 2+2?");
        assert_eq!(captured[0].body["function_call"], "auto");
        assert_eq!(captured[0].body["functions"][0]["name"], "python");
    }

    #[tokio::test]
    async fn test_invocation_reply_keeps_raw_arguments() {
        let body = json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "function_call": {"name": "python", "arguments": "{\"code\": \"print(4)\"}"}
            }}]
        });
        let (base, _) = fake_endpoint(StatusCode::OK, "application/json", body.to_string()).await;

        let endpoint = OpenAiEndpoint::new("sk-test").with_base_url(base);
        let reply = endpoint.complete(&request()).await.unwrap().into_reply().unwrap();
        let inv = reply.invocation.unwrap();
        assert_eq!(inv.name, "python");
        assert_eq!(inv.arguments, json!("{\"code\": \"print(4)\"}"));
    }

    #[tokio::test]
    async fn test_error_body_is_extracted() {
        let body = json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}});
        let (base, _) =
            fake_endpoint(StatusCode::UNAUTHORIZED, "application/json", body.to_string()).await;

        let endpoint = OpenAiEndpoint::new("sk-wrong").with_base_url(base);
        match endpoint.complete(&request()).await.unwrap_err() {
            ParleyError::Transport { message, error_type } => {
                assert_eq!(message, "Incorrect API key provided");
                assert_eq!(error_type.as_deref(), Some("invalid_request_error"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_reports_status() {
        let (base, _) = fake_endpoint(
            StatusCode::BAD_GATEWAY,
            "text/plain",
            "upstream unavailable".to_string(),
        )
        .await;

        let endpoint = OpenAiEndpoint::new("sk-test").with_base_url(base);
        let err = endpoint.complete(&request()).await.unwrap_err().to_string();
        assert!(err.contains("502"));
        assert!(err.contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let (base, _) = fake_endpoint(StatusCode::OK, "application/json", "not json".to_string()).await;

        let endpoint = OpenAiEndpoint::new("sk-test").with_base_url(base);
        let err = endpoint.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = OpenAiEndpoint::new("sk-test").with_base_url(format!("http://{addr}/v1"));
        let result = endpoint.complete(&request()).await;
        assert!(matches!(result, Err(ParleyError::Transport { .. })));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let endpoint = OpenAiEndpoint::new("k").with_base_url("http://localhost:8000/v1/");
        assert_eq!(endpoint.base_url(), "http://localhost:8000/v1");
        assert_eq!(endpoint.name(), "openai");
    }
}
