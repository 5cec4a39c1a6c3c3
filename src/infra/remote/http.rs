use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::Form;

use crate::domain::{GenerateResponse, GenerationRequest, PanelError};

use super::GenerationRemote;
use super::env::{read_env_var, read_timeout_from_env};
use super::response_parsing::{parse_generate_response, parse_samples_response, truncate_message};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const ENV_BASE_URL: &str = "GENPANEL_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "GENPANEL_TIMEOUT_SECS";

const SAMPLES_PATH: &str = "samples";
const GENERATE_PATH: &str = "generate";

/// Where the generation service lives and how long a call may take.
///
/// `timeout: None` leaves the transport without a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl RemoteConfig {
    pub fn from_env() -> Result<Self, PanelError> {
        let base_url = read_env_var(ENV_BASE_URL)?.unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = read_timeout_from_env(ENV_TIMEOUT_SECS)?;
        let config = Self { base_url, timeout };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        if self.base_url.trim().is_empty() {
            return Err(PanelError::validation(
                "generation service base URL must not be empty",
            ));
        }
        Ok(())
    }
}

pub struct HttpGenerationRemote {
    api_base_url: String,
    client: Client,
}

impl HttpGenerationRemote {
    pub fn new(config: RemoteConfig) -> Result<Self, PanelError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PanelError::internal(format!("failed to create HTTP client: {err}")))?;

        Ok(Self {
            api_base_url: config.base_url.trim().to_string(),
            client,
        })
    }

    pub fn from_env() -> Result<Self, PanelError> {
        Self::new(RemoteConfig::from_env()?)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PanelError> {
        Self::new(RemoteConfig {
            base_url: base_url.into(),
            timeout: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.api_base_url
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base_url.trim_end_matches('/'))
    }
}

impl GenerationRemote for HttpGenerationRemote {
    fn fetch_samples(&self) -> Result<Vec<String>, PanelError> {
        let response = self
            .client
            .get(self.endpoint_url(SAMPLES_PATH))
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_http_error(status, &body));
        }

        parse_samples_response(&body)
    }

    fn submit_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerateResponse, PanelError> {
        request.validate()?;

        let response = self
            .client
            .post(self.endpoint_url(GENERATE_PATH))
            .multipart(build_generation_form(request))
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_http_error(status, &body));
        }

        parse_generate_response(&body)
    }
}

fn build_generation_form(request: &GenerationRequest) -> Form {
    request
        .form_fields()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}

fn map_http_error(status: StatusCode, body: &str) -> PanelError {
    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        return PanelError::Timeout;
    }

    let message = match truncate_message(body) {
        message if message.is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        message => message,
    };
    PanelError::Http {
        status: status.as_u16(),
        message,
    }
}

fn map_transport_error(error: reqwest::Error) -> PanelError {
    if error.is_timeout() {
        return PanelError::Timeout;
    }
    PanelError::Transport {
        message: error.to_string(),
    }
}
