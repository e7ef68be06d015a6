//! Input classification: already-annotated NAF, unannotated NAF, or raw
//! text. The three-way branch is what makes re-submitting a fully
//! annotated document a no-op.

use tracing::debug;

use crate::error::ServerError;
use crate::naf::{self, NafDocument};
use crate::pipeline::{OutputKind, ParsePipeline};

/// Route `payload` to the parser based on what it already is:
/// - well-formed NAF with a dependency layer — returned byte-identical;
/// - well-formed NAF without one — its raw layer is parsed;
/// - anything else — parsed as plain UTF-8 text.
pub async fn classify_and_parse(
    pipeline: &ParsePipeline,
    payload: &[u8],
) -> Result<Vec<u8>, ServerError> {
    match NafDocument::try_parse(payload) {
        Ok(doc) if doc.has_dependencies() => {
            debug!("input already parsed");
            Ok(payload.to_vec())
        }
        Ok(doc) => {
            debug!("parsing from NAF raw layer");
            parse_to_naf(pipeline, doc.raw_text()).await
        }
        Err(_) => {
            debug!("parsing from raw text");
            let text = std::str::from_utf8(payload).map_err(|_| {
                ServerError::Input("payload is neither NAF nor valid UTF-8 text".into())
            })?;
            parse_to_naf(pipeline, text).await
        }
    }
}

/// Full parse of plain text, wrapped as a NAF document.
pub async fn parse_to_naf(pipeline: &ParsePipeline, text: &str) -> Result<Vec<u8>, ServerError> {
    if text.trim().is_empty() {
        return Err(ServerError::Input("no text to parse".into()));
    }
    let result = pipeline
        .parse(text, OutputKind::Dependencies, false)
        .await?;
    Ok(naf::build(text, &result).into_bytes())
}
