//! `ureq`-backed [`ComputationService`].
//!
//! `ureq` is blocking, so every request runs on tokio's blocking pool and the
//! async caller only awaits the join handle. This keeps the UI loop free
//! while a structure downloads.

use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::Agent;

use super::types::{ApiEnvelope, CalculateRequest, SetupRequest};
use super::{
    BackendError, ChargeConfig, ComputationId, ComputationService,
    ComputationSettings, StructureId, StructurePayload,
};
use crate::options::BackendOptions;

/// Upper bound on a single structure download.
const MAX_STRUCTURE_BYTES: u64 = 256 * 1024 * 1024;

/// HTTP client for the charge computation REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
}

impl HttpBackend {
    /// Build a client from backend options.
    #[must_use]
    pub fn new(options: &BackendOptions) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(options.timeout_secs)))
            .build();
        Self {
            agent: Agent::new_with_config(config),
            base_url: options.base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Run a blocking request closure on the blocking pool.
    async fn run<T, F>(&self, request: F) -> Result<T, BackendError>
    where
        F: FnOnce(&Agent) -> Result<T, BackendError> + Send + 'static,
        T: Send + 'static,
    {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || request(&agent))
            .await
            .map_err(|e| BackendError::Task(e.to_string()))?
    }
}

impl ComputationService for HttpBackend {
    async fn create_computation(
        &self,
        file_refs: &[String],
        configs: &[ChargeConfig],
        settings: &ComputationSettings,
    ) -> Result<ComputationId, BackendError> {
        let setup_body = encode(&SetupRequest {
            file_hashes: file_refs,
            settings,
        })?;
        let setup_url = self.url("/charges/setup");
        let computation: String = self
            .run(move |agent| post_json(agent, &setup_url, &[], &setup_body))
            .await?;
        log::debug!("computation {computation} set up");

        let calculate_body = encode(&CalculateRequest {
            file_hashes: file_refs,
            configs,
            settings,
        })?;
        let calculate_url = self.url("/charges/calculate");
        let query = vec![
            ("response_format".to_owned(), "none".to_owned()),
            ("computation_id".to_owned(), computation),
        ];
        let id: String = self
            .run(move |agent| {
                post_json(agent, &calculate_url, &query, &calculate_body)
            })
            .await?;
        log::info!("computation {id} calculated");
        Ok(ComputationId::new(id))
    }

    async fn list_molecules(
        &self,
        computation: &ComputationId,
    ) -> Result<Vec<StructureId>, BackendError> {
        let url = self.url(&format!("/charges/{computation}/molecules"));
        let molecules: Vec<String> =
            self.run(move |agent| get_json(agent, &url)).await?;
        Ok(molecules.into_iter().map(StructureId::from).collect())
    }

    async fn get_structure(
        &self,
        computation: &ComputationId,
        structure: &StructureId,
    ) -> Result<StructurePayload, BackendError> {
        let url = self.url("/charges/mmcif");
        let computation = computation.as_str().to_owned();
        let molecule = structure.as_str().to_owned();
        let data = self
            .run(move |agent| {
                let response = agent
                    .get(&url)
                    .query("computation_id", &computation)
                    .query("molecule", &molecule)
                    .call()
                    .map_err(transport)?;
                let mut body = response.into_body();
                body.with_config()
                    .limit(MAX_STRUCTURE_BYTES)
                    .read_to_vec()
                    .map_err(transport)
            })
            .await?;
        Ok(StructurePayload::mmcif(structure.clone(), data))
    }
}

fn encode<T: serde::Serialize>(body: &T) -> Result<String, BackendError> {
    serde_json::to_string(body).map_err(|e| BackendError::Decode(e.to_string()))
}

fn transport(e: ureq::Error) -> BackendError {
    match e {
        ureq::Error::StatusCode(code) => BackendError::Status(code),
        other => BackendError::Transport(other.to_string()),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str::<ApiEnvelope<T>>(body)
        .map_err(|e| BackendError::Decode(e.to_string()))?
        .into_result()
}

fn get_json<T: DeserializeOwned>(
    agent: &Agent,
    url: &str,
) -> Result<T, BackendError> {
    let body = agent
        .get(url)
        .call()
        .map_err(transport)?
        .into_body()
        .read_to_string()
        .map_err(transport)?;
    decode(&body)
}

fn post_json<T: DeserializeOwned>(
    agent: &Agent,
    url: &str,
    query: &[(String, String)],
    body: &str,
) -> Result<T, BackendError> {
    let mut request = agent
        .post(url)
        .header("Content-Type", "application/json");
    for (key, value) in query {
        request = request.query(key, value);
    }
    let response = request
        .send(body)
        .map_err(transport)?
        .into_body()
        .read_to_string()
        .map_err(transport)?;
    decode(&response)
}
