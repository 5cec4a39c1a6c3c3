use std::sync::Arc;

use genpanel::{
    app::NoticeLevel,
    domain::{GeneratedImage, GenerationRequest},
    infra::remote::parse_truthy_flag,
};
use gpui::{Image, ImageFormat, PromptLevel};

use super::{DEBUG_PROMPT_LOG_ENV, DEBUG_PROMPT_PREVIEW_CHARS};

pub(super) fn log_generation_request_submission(job_id: u64, request: &GenerationRequest) {
    let prompt_chars = request.prompt.chars().count();
    if debug_prompt_log_enabled() {
        let preview = prompt_preview(&request.prompt, DEBUG_PROMPT_PREVIEW_CHARS);
        tracing::info!(
            job_id,
            prompt_chars,
            prompt_preview = ?preview,
            num_steps = request.steps.get(),
            guidance = %request.guidance.display(),
            "submitting generation request"
        );
    } else {
        tracing::info!(
            job_id,
            prompt_chars,
            num_steps = request.steps.get(),
            guidance = %request.guidance.display(),
            "submitting generation request"
        );
    }
}

fn debug_prompt_log_enabled() -> bool {
    std::env::var(DEBUG_PROMPT_LOG_ENV)
        .ok()
        .as_deref()
        .is_some_and(parse_truthy_flag)
}

pub(super) fn prompt_preview(prompt: &str, max_chars: usize) -> String {
    let mut chars = prompt.chars();
    let mut preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        preview.push_str("...");
    }
    preview
}

pub(super) fn gpui_image(image: &GeneratedImage) -> Arc<Image> {
    Arc::new(Image::from_bytes(ImageFormat::Png, image.bytes().to_vec()))
}

pub(super) fn prompt_level(level: NoticeLevel) -> PromptLevel {
    match level {
        NoticeLevel::Warning => PromptLevel::Warning,
        NoticeLevel::Error => PromptLevel::Critical,
    }
}
