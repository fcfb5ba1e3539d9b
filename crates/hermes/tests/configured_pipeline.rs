//! Builds handlers from loaded configuration and drives them end to end.

use bytes::Bytes;
use hermes::prelude::*;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use serde::Serialize;
use serde_json::{json, Value};

struct Greeter;

#[derive(Serialize)]
struct Greeting {
    text: String,
    repeat: i64,
}

fn greeter_handler(config: &HermesConfig) -> JsonRequestHandler<Greeter> {
    let binding = HandlerBinding::sync(Greeter, |call: Invocation<Greeter>| {
        let name: String = call.arguments.required_as("name")?;
        let repeat: Option<i64> = call.arguments.get_as("repeat")?;
        Ok::<_, HandlerError>(Greeting {
            text: format!("hello, {name}"),
            repeat: repeat.unwrap_or(1),
        })
    });

    JsonRequestHandler::builder(
        binding,
        vec![
            ParameterDescriptor::body("name")
                .shape(ValueShape::String)
                .required(true),
            ParameterDescriptor::body("repeat").shape(ValueShape::Integer),
        ],
    )
    .route("/greet")
    .settings(config.dispatch.pipeline_settings())
    .build()
    .unwrap()
}

fn post(body: &'static str) -> Request<Full<Bytes>> {
    Request::post("/greet")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_default_config_compact_output() {
    let config = ConfigLoader::new().load().unwrap();
    let handler = greeter_handler(&config);

    let response = handler.handle(post(r#"{"name": "ada"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        r#"{"text":"hello, ada","repeat":1}"#
    );
}

#[tokio::test]
async fn test_pretty_output_from_toml() {
    let config = ConfigLoader::new()
        .with_string("[dispatch]\npretty_json = true\n", "toml")
        .unwrap()
        .load()
        .unwrap();
    let handler = greeter_handler(&config);

    let response = handler
        .handle(post(r#"{"name": "ada", "repeat": 2}"#))
        .await
        .unwrap();
    let text = body_text(response).await;
    assert!(text.contains('\n'));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, json!({"text": "hello, ada", "repeat": 2}));
}

#[tokio::test]
async fn test_strict_bodies_from_config() {
    let config = ConfigLoader::new()
        .with_string(r#"{"dispatch": {"deny_unknown_fields": true}}"#, "json")
        .unwrap()
        .load()
        .unwrap();
    let handler = greeter_handler(&config);

    let response = handler
        .handle(post(r#"{"name": "ada", "shout": true}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["status"], 400);
}

#[tokio::test]
async fn test_body_limit_from_config() {
    let config = ConfigLoader::new()
        .with_string("[dispatch]\nmax_body_bytes = 8\n", "toml")
        .unwrap()
        .load()
        .unwrap();
    let handler = greeter_handler(&config);

    let response = handler
        .handle(post(r#"{"name": "a much longer name"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_missing_required_name() {
    let config = HermesConfig::default();
    let handler = greeter_handler(&config);

    let response = handler.handle(post(r#"{"repeat": 3}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        value,
        json!({"message": "name body parameter is required", "status": 400})
    );
}

#[test]
fn test_logging_config_bridges() {
    let config = HermesConfig::development();
    let log_config = config.logging.to_log_config();
    assert_eq!(log_config.format, LogFormat::Pretty);
    assert_eq!(log_config.level, "debug");
}
