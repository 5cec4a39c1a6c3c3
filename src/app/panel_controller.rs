use crate::domain::{
    GenerateResponse, GeneratedImage, GenerationRequest, GuidanceScale, PanelError, StepCount,
};

use super::panel_view::{
    BUSY_INDICATOR, GENERATE_LABEL, GENERATING_LABEL, OUTPUT_PLACEHOLDER, OutputRegion, PanelView,
};

pub const PROMPT_REQUIRED_MESSAGE: &str = "Please enter a prompt";
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate image.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// `job_id` is `None` between snapshotting the request and the worker accepting it.
    Submitting { job_id: Option<u64> },
    Succeeded { image: GeneratedImage },
    Failed { message: String },
}

impl SubmissionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFetchState {
    #[default]
    NotRequested,
    Pending,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A blocking notification the window must show before the user continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelNotice {
    pub level: NoticeLevel,
    pub message: String,
    pub detail: Option<String>,
}

impl PanelNotice {
    fn prompt_required() -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: PROMPT_REQUIRED_MESSAGE.to_string(),
            detail: None,
        }
    }

    fn generation_failed(error: &PanelError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: GENERATION_FAILED_MESSAGE.to_string(),
            detail: Some(error.user_message()),
        }
    }
}

/// Result of pressing Generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratePress {
    /// Entered `Submitting`; the caller must dispatch this request.
    Dispatch(GenerationRequest),
    PromptRequired(PanelNotice),
    /// A request is already in flight; nothing happens.
    Busy,
}

/// Single owner of all panel state and the submission state machine.
///
/// Every transition is a method call on the UI thread; render from [`view`](Self::view).
#[derive(Debug, Clone, Default)]
pub struct PanelController {
    prompt: String,
    samples: Vec<String>,
    sample_fetch: SampleFetchState,
    steps: StepCount,
    guidance: GuidanceScale,
    submission: SubmissionState,
}

impl PanelController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once, when the sample fetch should be dispatched.
    pub fn mount(&mut self) -> bool {
        if self.sample_fetch != SampleFetchState::NotRequested {
            return false;
        }
        self.sample_fetch = SampleFetchState::Pending;
        true
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn sample_fetch_state(&self) -> SampleFetchState {
        self.sample_fetch
    }

    /// Replaces the prompt with the sample at `index` and returns the new prompt.
    pub fn select_sample(&mut self, index: usize) -> Option<&str> {
        let sample = self.samples.get(index)?.clone();
        self.prompt = sample;
        Some(self.prompt.as_str())
    }

    /// Stores the fetched samples. Failures are logged and leave the list empty.
    ///
    /// The list is fixed once populated; a later result is ignored.
    pub fn apply_samples(&mut self, result: Result<Vec<String>, PanelError>) {
        if self.sample_fetch == SampleFetchState::Loaded {
            tracing::debug!("ignoring sample list after it was already populated");
            return;
        }

        match result {
            Ok(samples) => {
                tracing::info!(count = samples.len(), "sample prompts loaded");
                self.samples = samples;
                self.sample_fetch = SampleFetchState::Loaded;
            }
            Err(error) => {
                tracing::warn!("failed to fetch sample prompts: {error}");
                self.sample_fetch = SampleFetchState::Failed;
            }
        }
    }

    pub fn steps(&self) -> StepCount {
        self.steps
    }

    pub fn set_steps(&mut self, steps: StepCount) {
        self.steps = steps;
    }

    pub fn guidance(&self) -> GuidanceScale {
        self.guidance
    }

    pub fn set_guidance(&mut self, guidance: GuidanceScale) {
        self.guidance = guidance;
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn is_busy(&self) -> bool {
        self.submission.is_busy()
    }

    pub fn output_image(&self) -> Option<&GeneratedImage> {
        match &self.submission {
            SubmissionState::Succeeded { image } => Some(image),
            _ => None,
        }
    }

    /// Handles a Generate press.
    ///
    /// On [`GeneratePress::Dispatch`] the previous image is already gone and the
    /// panel is busy.
    pub fn press_generate(&mut self) -> GeneratePress {
        if self.is_busy() {
            return GeneratePress::Busy;
        }

        let request = match GenerationRequest::new(self.prompt.clone(), self.steps, self.guidance)
        {
            Ok(request) => request,
            Err(_) => return GeneratePress::PromptRequired(PanelNotice::prompt_required()),
        };

        self.submission = SubmissionState::Submitting { job_id: None };
        GeneratePress::Dispatch(request)
    }

    /// Records the job id the worker assigned to the in-flight request.
    pub fn mark_dispatched(&mut self, job_id: u64) {
        if let SubmissionState::Submitting { job_id: current } = &mut self.submission {
            *current = Some(job_id);
        }
    }

    /// Settles a request that never reached the worker.
    pub fn fail_dispatch(&mut self, error: PanelError) -> Option<PanelNotice> {
        if !self.is_busy() {
            return None;
        }
        Some(self.settle_failure(error))
    }

    /// Settles the in-flight request. Completions for any other job are ignored.
    pub fn complete_generation(
        &mut self,
        job_id: u64,
        result: Result<GenerateResponse, PanelError>,
    ) -> Option<PanelNotice> {
        match self.submission {
            SubmissionState::Submitting { job_id: Some(current) } if current == job_id => {}
            SubmissionState::Submitting { job_id: None } => {}
            _ => {
                tracing::debug!(job_id, "ignoring completion for a request that is not in flight");
                return None;
            }
        }

        match result.and_then(GeneratedImage::from_response) {
            Ok(image) => {
                tracing::info!(job_id, image_bytes = image.bytes().len(), "image generated");
                self.submission = SubmissionState::Succeeded { image };
                None
            }
            Err(error) => Some(self.settle_failure(error)),
        }
    }

    fn settle_failure(&mut self, error: PanelError) -> PanelNotice {
        tracing::warn!("image generation failed: {error}");
        let notice = PanelNotice::generation_failed(&error);
        self.submission = SubmissionState::Failed {
            message: error.user_message(),
        };
        notice
    }

    pub fn view(&self) -> PanelView {
        let busy = self.is_busy();
        let output = match &self.submission {
            SubmissionState::Succeeded { image } => OutputRegion::Image(image.clone()),
            SubmissionState::Submitting { .. } => OutputRegion::Busy(BUSY_INDICATOR),
            SubmissionState::Idle | SubmissionState::Failed { .. } => {
                OutputRegion::Placeholder(OUTPUT_PLACEHOLDER)
            }
        };

        PanelView {
            prompt: self.prompt.clone(),
            samples: self.samples.clone(),
            steps_label: self.steps.label(),
            guidance_label: self.guidance.label(),
            generate_label: if busy { GENERATING_LABEL } else { GENERATE_LABEL },
            generate_enabled: !busy,
            output,
        }
    }
}
