//! HTTP handlers.
//!
//! Endpoints:
//! - GET       /                 - index page with an example link
//! - GET|POST  /parse            - parse to dependencies (default output)
//! - GET|POST  /parse/:output    - dependencies | xml | treebank_triples
//!                                 (JSON), or naf | nerc (NAF attachment)
//! - GET|POST  /annotate         - module chain, modules=alpino,nerc,coref
//!
//! Text comes from the `text=` query parameter on GET or the raw body on
//! POST; `tokenized=Y|y|1` skips tokenization for the JSON outputs.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, Method};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Deserialize;

use crate::chain::ModuleChain;
use crate::classify;
use crate::config::Config;
use crate::error::{AppError, ServerError};
use crate::pipeline::{OutputKind, ParsePipeline};

const NAF_CONTENT_TYPE: &str = "application/naf+xml";
const NAF_DISPOSITION: &str = "attachment; filename=\"result.naf\"";

const INDEX: &str = concat!(
    "Simple web API for Alpino, see this ",
    r#"<a href="/parse?text=dit is een test">example</a>."#
);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<ParsePipeline>,
    pub chain: Arc<ModuleChain>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            pipeline: Arc::new(ParsePipeline::new(Arc::clone(&config))),
            chain: Arc::new(ModuleChain::new(Arc::clone(&config))),
            config,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ParseQuery {
    text: Option<String>,
    tokenized: Option<String>,
    modules: Option<String>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX)
}

pub async fn parse(
    method: Method,
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    handle_parse(state, "dependencies", method, query, body).await
}

pub async fn parse_output(
    Path(output): Path<String>,
    method: Method,
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    handle_parse(state, &output, method, query, body).await
}

pub async fn annotate(
    method: Method,
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = request_payload(&method, &query, body)?;
    let modules = query.modules.as_deref().unwrap_or("alpino");
    let annotated = state.chain.run(payload, modules).await?;
    Ok(naf_response(annotated))
}

async fn handle_parse(
    state: AppState,
    output: &str,
    method: Method,
    query: ParseQuery,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = request_payload(&method, &query, body)?;
    match output {
        "naf" => {
            let text = text_payload(&payload)?;
            let naf = classify::parse_to_naf(&state.pipeline, &text).await?;
            Ok(naf_response(naf))
        }
        "nerc" => {
            let parsed = classify::classify_and_parse(&state.pipeline, &payload).await?;
            let tagged = state.chain.run(parsed, "nerc").await?;
            Ok(naf_response(tagged))
        }
        other => {
            let kind = OutputKind::from_str(other)?;
            let text = text_payload(&payload)?;
            let tokenized = matches!(query.tokenized.as_deref(), Some("Y" | "y" | "1"));
            let result = state.pipeline.parse(&text, kind, tokenized).await?;
            Ok(Json(result).into_response())
        }
    }
}

fn request_payload(
    method: &Method,
    query: &ParseQuery,
    body: Bytes,
) -> Result<Vec<u8>, ServerError> {
    let payload = if method == Method::GET {
        query.text.as_deref().unwrap_or_default().as_bytes().to_vec()
    } else {
        body.to_vec()
    };
    if payload.is_empty() {
        return Err(ServerError::Input(
            "provide text as POST data or the text= query parameter".into(),
        ));
    }
    Ok(payload)
}

fn text_payload(payload: &[u8]) -> Result<String, ServerError> {
    String::from_utf8(payload.to_vec())
        .map_err(|_| ServerError::Input("text must be valid UTF-8".into()))
}

fn naf_response(bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, NAF_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, NAF_DISPOSITION),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_takes_text_from_the_query() {
        let query = ParseQuery {
            text: Some("dit is een test".into()),
            ..Default::default()
        };
        let payload = request_payload(&Method::GET, &query, Bytes::new()).unwrap();
        assert_eq!(payload, b"dit is een test");
    }

    #[test]
    fn post_takes_text_from_the_body() {
        let query = ParseQuery::default();
        let payload =
            request_payload(&Method::POST, &query, Bytes::from_static(b"body text")).unwrap();
        assert_eq!(payload, b"body text");
    }

    #[test]
    fn missing_text_is_an_input_error() {
        let err = request_payload(&Method::GET, &ParseQuery::default(), Bytes::new()).unwrap_err();
        assert!(matches!(err, ServerError::Input(_)));
    }
}
