use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use super::{GuidanceScale, PanelError, StepCount};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

pub const PROMPT_FIELD: &str = "prompt";
pub const NUM_STEPS_FIELD: &str = "num_steps";
pub const GUIDANCE_FIELD: &str = "guidance";

/// Snapshot of the panel inputs taken when Generate is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub steps: StepCount,
    pub guidance: GuidanceScale,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        steps: StepCount,
        guidance: GuidanceScale,
    ) -> Result<Self, PanelError> {
        let request = Self {
            prompt: prompt.into(),
            steps,
            guidance,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        validate_prompt(&self.prompt)
    }

    /// Multipart text fields in submission order.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            (PROMPT_FIELD, self.prompt.clone()),
            (NUM_STEPS_FIELD, self.steps.form_value()),
            (GUIDANCE_FIELD, self.guidance.form_value()),
        ]
    }
}

/// Only the exact empty string counts as "no prompt"; whitespace is passed through.
pub fn validate_prompt(prompt: &str) -> Result<(), PanelError> {
    if prompt.is_empty() {
        return Err(PanelError::validation("prompt must not be empty"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplesResponse {
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub image: String,
}

/// A decoded generation result. Cloning is cheap; payload and bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    payload: Arc<str>,
    bytes: Arc<[u8]>,
}

impl GeneratedImage {
    pub fn from_response(response: GenerateResponse) -> Result<Self, PanelError> {
        if response.image.is_empty() {
            return Err(PanelError::invalid_response("image payload is empty"));
        }

        let bytes = STANDARD.decode(response.image.as_bytes()).map_err(|err| {
            PanelError::invalid_response(format!("image payload is not valid base64: {err}"))
        })?;

        Ok(Self {
            payload: Arc::from(response.image),
            bytes: Arc::from(bytes),
        })
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn data_uri(&self) -> String {
        format!("{PNG_DATA_URI_PREFIX}{}", self.payload)
    }
}
