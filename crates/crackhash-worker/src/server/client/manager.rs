//! HTTP client for the manager: one-time registration at startup and task
//! completion callbacks.

use crate::server::service::completer::Completer;
use anyhow::{Context, bail};
use core::time::Duration;
use crackhash::{CompletedTask, Error, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/internal/api/manager";
const REGISTER_PATH: &str = "/register";
const COMPLETE_PATH: &str = "/request";

#[derive(Debug, Serialize)]
struct RegisterRequest {
    worker_port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegisterResponse {
    worker_id: String,
}

#[derive(Clone, Debug)]
pub struct ManagerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ManagerClient {
    /// Builds a client for the manager at `manager_address` (a base URL with
    /// scheme), applying `timeout` to every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(manager_address: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: format!("{}{BASE_PATH}", manager_address.trim_end_matches('/')),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Registers this worker and returns the id the manager assigned to it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, on any status other than
    /// `202 Accepted`, or if the response body is not a registration
    /// response.
    pub async fn register(&self, worker_port: u16) -> anyhow::Result<String> {
        let request = RegisterRequest { worker_port };
        let response = self
            .http
            .post(self.url(REGISTER_PATH))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("error sending register request {request:?}"))?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            bail!("error registering worker: unexpected status code {status}");
        }

        let response: RegisterResponse = response
            .json()
            .await
            .context("error decoding register response body")?;

        Ok(response.worker_id)
    }
}

impl Completer for ManagerClient {
    #[tracing::instrument(skip_all, fields(request_id = %task.request_id, task_id = %task.task_id))]
    async fn complete(&self, task: CompletedTask) -> Result<()> {
        tracing::debug!(?task, "Sending complete request");

        let response = self
            .http
            .patch(self.url(COMPLETE_PATH))
            .json(&task)
            .send()
            .await
            .map_err(|e| Error::Completion {
                reason: format!("error executing http request: {e}"),
            })?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            return Err(Error::Completion {
                reason: format!("unexpected http status code: {status}"),
            });
        }

        tracing::info!(matches = task.data.len(), "Task completed successfully");
        Ok(())
    }
}
