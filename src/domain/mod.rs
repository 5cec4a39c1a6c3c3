mod errors;
mod generation_contract;
mod generation_params;

pub use errors::PanelError;
pub use generation_contract::{
    GUIDANCE_FIELD, GenerateResponse, GeneratedImage, GenerationRequest, NUM_STEPS_FIELD,
    PNG_DATA_URI_PREFIX, PROMPT_FIELD, SamplesResponse, validate_prompt,
};
pub use generation_params::{GuidanceScale, StepCount};
