use axum::{
    Router,
    extract::{Json, Path, Query, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{CalcError, FormValues, Tool, ToolInfo, evaluate};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct CatalogueResponse {
    tools: Vec<ToolInfo>,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/tools", get(tools_handler))
        .route("/api/tools/:tool", get(tool_handler))
        .route(
            "/api/calc/:tool",
            get(calc_get_handler).post(calc_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, tools = Tool::ALL.len(), "toolhub HTTP API listening");
    tracing::info!("local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn tools_handler() -> Response {
    let tools = Tool::ALL.into_iter().map(Tool::info).collect();
    json_response(StatusCode::OK, CatalogueResponse { tools })
}

async fn tool_handler(Path(tool): Path<String>) -> Response {
    match Tool::from_id(&tool) {
        Ok(tool) => json_response(StatusCode::OK, tool.info()),
        Err(err) => calc_error_response(&err),
    }
}

async fn calc_get_handler(Path(tool): Path<String>, Query(values): Query<FormValues>) -> Response {
    calc_handler_impl(&tool, values)
}

async fn calc_post_handler(
    Path(tool): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", rejection.body_text()),
            );
        }
    };
    match form_values_from_json(body) {
        Ok(values) => calc_handler_impl(&tool, values),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn calc_handler_impl(tool: &str, values: FormValues) -> Response {
    let evaluation = Tool::from_id(tool).and_then(|tool| {
        tracing::info!(tool = tool.id(), fields = values.len(), "evaluating");
        evaluate(tool, &values)
    });
    match evaluation {
        Ok(evaluation) => json_response(StatusCode::OK, evaluation),
        Err(err) => {
            tracing::warn!(tool, error = %err, "evaluation rejected");
            calc_error_response(&err)
        }
    }
}

// `null` counts as a missing field.
fn form_values_from_json(body: Map<String, Value>) -> Result<FormValues, String> {
    let mut values = FormValues::new();
    for (key, value) in body {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(format!("Field '{key}' must be a string or number"));
            }
        };
        values.insert(key, text);
    }
    Ok(values)
}

fn status_for(err: &CalcError) -> StatusCode {
    match err {
        CalcError::UnknownTool(_) => StatusCode::NOT_FOUND,
        CalcError::UnknownOption { .. }
        | CalcError::OutOfRange { .. }
        | CalcError::InvalidDate { .. } => StatusCode::BAD_REQUEST,
    }
}

fn calc_error_response(err: &CalcError) -> Response {
    error_response(status_for(err), &err.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = router().oneshot(request).await.expect("infallible");
        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, cache, json)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[test]
    fn json_numbers_and_strings_become_form_values() {
        let body: Map<String, Value> = serde_json::from_str(
            r#"{"amps": 20, "volts": "48", "phase": "dc", "powerFactor": null}"#,
        )
        .expect("valid json");
        let values = form_values_from_json(body).expect("flat object");
        assert_eq!(values.get("amps").map(String::as_str), Some("20"));
        assert_eq!(values.get("volts").map(String::as_str), Some("48"));
        assert!(!values.contains_key("powerFactor"));
    }

    #[test]
    fn nested_json_is_rejected() {
        let body: Map<String, Value> =
            serde_json::from_str(r#"{"amps": [1, 2]}"#).expect("valid json");
        let err = form_values_from_json(body).expect_err("rejected");
        assert!(err.contains("amps"));
    }

    #[test]
    fn unknown_tool_maps_to_not_found() {
        assert_eq!(
            status_for(&CalcError::UnknownTool("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&CalcError::out_of_range("spot", "must be positive")),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn get_calc_reads_query_string() {
        let (status, cache, json) =
            send(get_request("/api/calc/amps-to-kw?phase=dc&amps=20&volts=48")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert_eq!(json["tool"], "amps-to-kw");
        let kw = json["result"]["kilowatts"].as_f64().expect("number");
        assert!((kw - 0.96).abs() < 1e-9);
    }

    #[tokio::test]
    async fn post_calc_accepts_numbers() {
        let (status, _, json) = send(post_request(
            "/api/calc/percent-to-fraction",
            r#"{"percent": 12.5}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"]["fraction"], "1/8");
    }

    #[tokio::test]
    async fn malformed_post_body_is_bad_request() {
        let (status, cache, json) =
            send(post_request("/api/calc/mortgage", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert!(json["error"].as_str().is_some_and(|e| e.starts_with("Invalid JSON body")));
    }

    #[tokio::test]
    async fn out_of_range_is_bad_request() {
        let (status, _, json) = send(get_request("/api/calc/black-scholes?spot=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_routes_and_tools_are_not_found() {
        let (status, _, json) = send(get_request("/api/calc/warp-drive")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().is_some_and(|e| e.contains("warp-drive")));

        let (status, _, _) = send(get_request("/api/tools/warp-drive")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, json) = send(get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Not found");
    }
}
