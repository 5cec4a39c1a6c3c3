use crate::domain::{GenerateResponse, GenerationRequest, PanelError};

/// The two calls the panel makes against the generation service.
///
/// Implementations block the calling thread; the job manager keeps them off
/// the UI thread.
pub trait GenerationRemote: Send + Sync {
    fn fetch_samples(&self) -> Result<Vec<String>, PanelError>;

    fn submit_generation(&self, request: &GenerationRequest)
    -> Result<GenerateResponse, PanelError>;
}
