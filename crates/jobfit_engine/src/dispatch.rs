use jobfit_core::{AnalysisInput, JobHandle, ResumeSource, SubmissionRequest};
use jobfit_logging::{jobfit_info, jobfit_warn};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::{EngineError, SubmitError};

#[derive(Debug, Deserialize)]
struct CreatedJob {
    file_id: String,
}

/// Server operations on analysis jobs.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    /// Validates `input` locally, then issues a single job-creation request.
    /// Invalid input never reaches the network.
    async fn submit(&self, input: &AnalysisInput) -> Result<JobHandle, SubmitError> {
        let request = input.validate()?;
        self.create_job(&request).await
    }

    /// Issues the job-creation request for already validated input.
    async fn create_job(&self, request: &SubmissionRequest) -> Result<JobHandle, SubmitError>;

    /// Asks the server to stop working on `job_id`.
    async fn cancel(&self, job_id: &str) -> Result<(), SubmitError>;
}

/// Creates analysis jobs on the server over HTTP.
#[derive(Clone)]
pub struct SubmissionDispatcher {
    client: reqwest::Client,
    config: EngineConfig,
}

impl SubmissionDispatcher {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl JobApi for SubmissionDispatcher {
    async fn create_job(&self, request: &SubmissionRequest) -> Result<JobHandle, SubmitError> {
        let form = build_form(request).await?;
        let url = self.config.endpoint("upload");
        jobfit_info!(
            "POST {} company={} resume={}",
            url,
            request.company_name,
            request.resume.kind()
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            jobfit_warn!("job creation rejected with {}", status);
            return Err(SubmitError::transport(format!(
                "server responded with {status}"
            )));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let created: CreatedJob = serde_json::from_slice(&body)
            .map_err(|err| SubmitError::transport(format!("unexpected server response: {err}")))?;

        Ok(JobHandle {
            file_id: created.file_id,
            name: request.resume.display_name(),
            created_at: (self.config.clock)(),
        })
    }

    async fn cancel(&self, job_id: &str) -> Result<(), SubmitError> {
        let url = self.config.endpoint(&format!("cancel/{job_id}"));
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SubmitError::transport(format!(
                "cancel rejected with {status}"
            )))
        }
    }
}

async fn build_form(request: &SubmissionRequest) -> Result<Form, SubmitError> {
    let mut form = Form::new()
        .text("company_name", request.company_name.clone())
        .text("job_description", request.job_description.clone());
    if let Some(position) = &request.position {
        form = form.text("position", position.clone());
    }

    let form = match &request.resume {
        ResumeSource::File(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|err| {
                SubmitError::transport(format!("could not read {}: {err}", path.display()))
            })?;
            let part = Part::bytes(bytes).file_name(request.resume.display_name());
            form.part("file", part)
        }
        ResumeSource::Text(text) => form.text("resume_text", text.clone()),
    };
    Ok(form)
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::transport("the server did not respond in time");
    }
    if err.is_connect() {
        return SubmitError::transport(format!("could not reach the server: {err}"));
    }
    SubmitError::transport(format!("network error: {err}"))
}
