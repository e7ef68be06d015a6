//! Module chain: sequential byte-to-byte annotation stages.
//!
//! Stage names are resolved — and each stage's configuration validated —
//! before anything runs, so a chain with a bad later stage has no side
//! effects at all. Each stage then consumes the exact byte output of its
//! predecessor; the first failure aborts the chain.

use std::sync::Arc;

use tracing::debug;

use crate::classify;
use crate::config::Config;
use crate::error::ServerError;
use crate::pipeline::{ParsePipeline, ToolRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Parse (with input classification) and serialize to NAF.
    Alpino,
    /// Named-entity tagging via the ixa-pipe-nerc jar.
    Nerc,
    /// Coreference resolution via the configured external module.
    Coref,
}

impl Stage {
    pub fn resolve(name: &str) -> Result<Self, ServerError> {
        match name.trim() {
            "alpino" => Ok(Self::Alpino),
            "nerc" => Ok(Self::Nerc),
            "coref" => Ok(Self::Coref),
            other => Err(ServerError::Configuration(format!(
                "unknown module: {other}"
            ))),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Alpino => "alpino",
            Self::Nerc => "nerc",
            Self::Coref => "coref",
        }
    }
}

pub struct ModuleChain {
    config: Arc<Config>,
    pipeline: ParsePipeline,
    runner: ToolRunner,
}

impl ModuleChain {
    pub fn new(config: Arc<Config>) -> Self {
        let pipeline = ParsePipeline::new(Arc::clone(&config));
        let runner = ToolRunner::new(config.alpino_home.clone(), config.process_timeout);
        Self {
            config,
            pipeline,
            runner,
        }
    }

    /// Thread `payload` through the comma-separated `modules` in order.
    pub async fn run(&self, payload: Vec<u8>, modules: &str) -> Result<Vec<u8>, ServerError> {
        let stages = modules
            .split(',')
            .filter(|name| !name.trim().is_empty())
            .map(Stage::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        if stages.is_empty() {
            return Err(ServerError::Configuration("no modules requested".into()));
        }
        for stage in &stages {
            self.validate(*stage)?;
        }

        let mut payload = payload;
        for stage in stages {
            debug!(stage = stage.name(), "running chain stage");
            payload = self.run_stage(stage, payload).await?;
        }
        Ok(payload)
    }

    /// Configuration check before any process is spawned.
    fn validate(&self, stage: Stage) -> Result<(), ServerError> {
        match stage {
            Stage::Alpino => Ok(()),
            Stage::Nerc => {
                let nerc = self.nerc_config()?;
                if !nerc.jar.exists() {
                    return Err(ServerError::Configuration(format!(
                        "NERC jar not found at {}",
                        nerc.jar.display()
                    )));
                }
                if !nerc.model.exists() {
                    return Err(ServerError::Configuration(format!(
                        "NERC model not found at {}",
                        nerc.model.display()
                    )));
                }
                Ok(())
            }
            Stage::Coref => self.coref_cmd().map(|_| ()),
        }
    }

    async fn run_stage(&self, stage: Stage, payload: Vec<u8>) -> Result<Vec<u8>, ServerError> {
        match stage {
            Stage::Alpino => classify::classify_and_parse(&self.pipeline, &payload).await,
            Stage::Nerc => {
                let nerc = self.nerc_config()?;
                let argv = vec![
                    "java".to_string(),
                    "-jar".to_string(),
                    nerc.jar.display().to_string(),
                    "tag".to_string(),
                    "-m".to_string(),
                    nerc.model.display().to_string(),
                ];
                self.module_output(stage, &argv, &payload).await
            }
            Stage::Coref => {
                let argv = self.coref_cmd()?.to_vec();
                self.module_output(stage, &argv, &payload).await
            }
        }
    }

    /// Run a downstream module over the document. Anything on stderr is an
    /// upstream failure, as is empty stdout.
    async fn module_output(
        &self,
        stage: Stage,
        argv: &[String],
        payload: &[u8],
    ) -> Result<Vec<u8>, ServerError> {
        let out = self.runner.run(argv, Some(payload)).await?;
        let stderr = out.stderr_text();
        if !stderr.trim().is_empty() {
            return Err(ServerError::Upstream {
                stage: stage.name().to_string(),
                detail: stderr,
            });
        }
        if out.stdout.is_empty() {
            return Err(ServerError::EmptyOutput {
                command: argv.join(" "),
                stderr,
                diagnostic: None,
            });
        }
        Ok(out.stdout)
    }

    fn nerc_config(&self) -> Result<&crate::config::NercConfig, ServerError> {
        self.config.nerc.as_ref().ok_or_else(|| {
            ServerError::Configuration("NERC_JAR and NERC_MODEL must be set".into())
        })
    }

    fn coref_cmd(&self) -> Result<&[String], ServerError> {
        self.config
            .coref_cmd
            .as_deref()
            .ok_or_else(|| ServerError::Configuration("COREF_CMD must be set".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_stages() {
        assert_eq!(Stage::resolve("alpino").unwrap(), Stage::Alpino);
        assert_eq!(Stage::resolve("nerc").unwrap(), Stage::Nerc);
        assert_eq!(Stage::resolve(" coref ").unwrap(), Stage::Coref);
    }

    #[test]
    fn unknown_stage_is_a_configuration_error() {
        assert!(matches!(
            Stage::resolve("nonexistent"),
            Err(ServerError::Configuration(_))
        ));
    }
}
