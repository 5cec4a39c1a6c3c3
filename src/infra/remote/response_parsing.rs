use crate::domain::{GenerateResponse, PanelError, SamplesResponse};

const MAX_ERROR_MESSAGE_LEN: usize = 256;

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

pub(crate) fn parse_samples_response(body: &str) -> Result<Vec<String>, PanelError> {
    let response: SamplesResponse = serde_json::from_str(body).map_err(|err| {
        PanelError::invalid_response(format!("samples response decode failed: {err}"))
    })?;
    Ok(response.samples)
}

pub(crate) fn parse_generate_response(body: &str) -> Result<GenerateResponse, PanelError> {
    serde_json::from_str(body).map_err(|err| {
        PanelError::invalid_response(format!("generate response decode failed: {err}"))
    })
}
