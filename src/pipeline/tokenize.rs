//! Tokenizer adapter.

use crate::error::ServerError;

use super::invoke::ToolRunner;

/// Run the Alpino tokenizer over `text`. The tokenizer decorates its output
/// with `|`, which doubles as the field separator in downstream triple
/// output, so every occurrence is stripped here before it can leak through.
pub async fn tokenize(
    runner: &ToolRunner,
    cmd: &[String],
    text: &str,
) -> Result<String, ServerError> {
    let out = runner.run_stdout(cmd, Some(text)).await?;
    Ok(out.replace('|', ""))
}
