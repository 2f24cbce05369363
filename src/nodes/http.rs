//! HTTP request and web scrape executors.

use std::time::Duration;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::core::RunContext;
use crate::error::NodeError;
use crate::graph::types::{AuthConfig, HttpRequestConfig, Node, WebScrapeConfig};
use crate::nodes::NodeRunResult;
use crate::template;

/// Perform the configured request. Non-2xx status is not an error: the
/// status lands in the result and downstream logic decides.
pub async fn request(
    node: &Node,
    config: &HttpRequestConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let url = template::resolve(&config.url, &node.id, rc.graph, rc.results);
    if url.is_empty() {
        return Err(NodeError::ConfigError("URL is required".to_string()));
    }

    let method = reqwest::Method::from_bytes(config.method.to_uppercase().as_bytes())
        .map_err(|_| NodeError::ConfigError(format!("Invalid HTTP method: {}", config.method)))?;
    let timeout = config.timeout_secs.unwrap_or(rc.config.http_timeout_secs);

    let mut builder = rc
        .http
        .request(method, &url)
        .timeout(Duration::from_secs(timeout));

    for header in &config.headers {
        let value = template::resolve(&header.value, &node.id, rc.graph, rc.results);
        builder = builder.header(&header.key, value);
    }

    builder = match &config.authorization {
        Some(AuthConfig::BearerToken { token }) => {
            builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
        }
        Some(AuthConfig::BasicAuth { username, password }) => {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", username, password));
            builder.header(reqwest::header::AUTHORIZATION, format!("Basic {}", encoded))
        }
        None => builder,
    };

    if let Some(body) = &config.body {
        let body = template::resolve(body, &node.id, rc.graph, rc.results);
        builder = builder.body(body);
    }

    let response = tokio::select! {
        _ = rc.cancellation.cancelled() => return Err(NodeError::Cancelled),
        response = builder.send() => response?,
    };

    Ok(NodeRunResult::success(response_value(response).await?))
}

async fn response_value(response: reqwest::Response) -> Result<Value, NodeError> {
    let status = response.status().as_u16();
    let mut headers = Map::new();
    for (name, value) in response.headers() {
        headers.insert(
            name.to_string(),
            Value::String(value.to_str().unwrap_or_default().to_string()),
        );
    }

    let text = response.text().await?;
    // JSON bodies come back structured; everything else stays text.
    let data = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

    Ok(json!({
        "status": status,
        "data": data,
        "headers": Value::Object(headers),
    }))
}

/// GET a page and strip it down to text.
pub async fn scrape(
    node: &Node,
    config: &WebScrapeConfig,
    rc: &RunContext<'_>,
) -> Result<NodeRunResult, NodeError> {
    let url = template::resolve(&config.url, &node.id, rc.graph, rc.results);
    if url.is_empty() {
        return Err(NodeError::ConfigError("URL is required".to_string()));
    }
    let timeout = config.timeout_secs.unwrap_or(rc.config.http_timeout_secs);

    let response = tokio::select! {
        _ = rc.cancellation.cancelled() => return Err(NodeError::Cancelled),
        response = rc.http.get(&url).timeout(Duration::from_secs(timeout)).send() => response?,
    };

    let status = response.status().as_u16();
    let html = response.text().await?;

    Ok(NodeRunResult::success(json!({
        "url": url,
        "status": status,
        "text": strip_html(&html),
    })))
}

/// Drop script/style blocks, then tags, then collapse whitespace.
/// Scraping fidelity is the caller's problem, not the engine's.
fn strip_html(html: &str) -> String {
    let no_scripts = Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>")
        .unwrap()
        .replace_all(html, " ");
    let no_tags = Regex::new(r"(?s)<[^>]*>")
        .unwrap()
        .replace_all(&no_scripts, " ");
    Regex::new(r"\s+")
        .unwrap()
        .replace_all(no_tags.trim(), " ")
        .into_owned()
}
