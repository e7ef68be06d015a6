//! Output assembly: one or two Alpino invocations per output kind.
//!
//! - dependencies: one parse call, triples read straight off stdout.
//! - xml: one parse call writing one file per sentence into a scoped
//!   temporary workspace, which is read back into the result map.
//! - treebank_triples: the xml procedure, then a second invocation over the
//!   generated files whose triples are overlaid onto the same map.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tempfile::TempDir;
use tracing::debug;

use crate::config::Config;
use crate::error::ServerError;

use super::invoke::ToolRunner;
use super::tokenize::tokenize;
use super::triples::{read_triples, ResultMap, SentenceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Dependencies,
    Xml,
    TreebankTriples,
}

impl FromStr for OutputKind {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dependencies" => Ok(Self::Dependencies),
            "xml" => Ok(Self::Xml),
            "treebank_triples" => Ok(Self::TreebankTriples),
            other => Err(ServerError::Input(format!("unknown output kind: {other}"))),
        }
    }
}

/// The tokenize-then-assemble pipeline. Holds no per-request state; safe to
/// share across request tasks.
pub struct ParsePipeline {
    config: Arc<Config>,
    runner: ToolRunner,
}

impl ParsePipeline {
    pub fn new(config: Arc<Config>) -> Self {
        let runner = ToolRunner::new(config.alpino_home.clone(), config.process_timeout);
        Self { config, runner }
    }

    pub fn runner(&self) -> &ToolRunner {
        &self.runner
    }

    /// Parse `text` to the given output kind, tokenizing first unless the
    /// caller says the text already is.
    pub async fn parse(
        &self,
        text: &str,
        output: OutputKind,
        tokenized: bool,
    ) -> Result<ResultMap, ServerError> {
        let tokens = if tokenized {
            text.to_string()
        } else {
            tokenize(&self.runner, &self.config.tokenize_cmd, text).await?
        };
        match output {
            OutputKind::Dependencies => self.dependencies(&tokens).await,
            OutputKind::Xml => self.xml(&tokens).await,
            OutputKind::TreebankTriples => self.treebank_triples(&tokens).await,
        }
    }

    async fn dependencies(&self, tokens: &str) -> Result<ResultMap, ServerError> {
        let argv = vec![
            self.config.alpino_cmd.clone(),
            "end_hook=dependencies".to_string(),
            "-parse".to_string(),
        ];
        let out = self.runner.run_stdout(&argv, Some(tokens)).await?;
        let mut result = ResultMap::new();
        read_triples(&out, &mut result, false);
        Ok(result)
    }

    async fn xml(&self, tokens: &str) -> Result<ResultMap, ServerError> {
        let workspace = TempDir::with_prefix("alpinoserver-")?;
        self.xml_into(tokens, workspace.path()).await
        // workspace dropped (and removed) here, success or failure
    }

    async fn treebank_triples(&self, tokens: &str) -> Result<ResultMap, ServerError> {
        let workspace = TempDir::with_prefix("alpinoserver-")?;
        let mut result = self.xml_into(tokens, workspace.path()).await?;

        // Second phase over the files the first one generated; ids come
        // back as full paths and are stripped to stems to join the map.
        let mut argv = vec![
            self.config.alpino_cmd.clone(),
            "-treebank_triples".to_string(),
        ];
        argv.extend(
            result
                .keys()
                .map(|id| workspace.path().join(format!("{id}.xml")).display().to_string()),
        );
        let out = self.runner.run_stdout(&argv, None).await?;
        read_triples(&out, &mut result, true);
        Ok(result)
    }

    /// Run the xml end hook against `dir` and read back the per-sentence
    /// files it generated. Zero files is an unconditional parse failure:
    /// the tool exited but produced nothing.
    async fn xml_into(&self, tokens: &str, dir: &Path) -> Result<ResultMap, ServerError> {
        let argv = vec![
            self.config.alpino_cmd.clone(),
            "end_hook=xml".to_string(),
            "-parse".to_string(),
            "-flag".to_string(),
            "treebank".to_string(),
            dir.display().to_string(),
        ];
        // stdout is not useful here; the files in `dir` are the output.
        let out = self.runner.run(&argv, Some(tokens.as_bytes())).await?;

        let mut result = ResultMap::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem() else { continue };
            let id = stem.to_string_lossy().into_owned();
            let xml = std::fs::read_to_string(&path)?;
            result.insert(
                id,
                SentenceResult {
                    triples: Vec::new(),
                    xml: Some(xml),
                },
            );
        }
        debug!(sentences = result.len(), "read treebank workspace");

        if result.is_empty() {
            return Err(self
                .runner
                .empty_output(&argv, Some(tokens.as_bytes()), out.stderr_text()));
        }
        Ok(result)
    }
}
