use genpanel::app::{SampleFetchState, SubmissionState};
use gpui::Hsla;

use super::theme::ThemeColors;

/// One-line status shown beside the Generate button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum PanelStatus {
    Idle,
    Generating,
    Succeeded,
    Failed { message: String },
}

impl PanelStatus {
    pub(super) fn from_submission(submission: &SubmissionState) -> Self {
        match submission {
            SubmissionState::Idle => Self::Idle,
            SubmissionState::Submitting { .. } => Self::Generating,
            SubmissionState::Succeeded { .. } => Self::Succeeded,
            SubmissionState::Failed { message } => Self::Failed {
                message: message.clone(),
            },
        }
    }

    pub(super) fn label(&self) -> String {
        match self {
            Self::Idle => "Ready".to_string(),
            Self::Generating => "Generating image...".to_string(),
            Self::Succeeded => "Image ready".to_string(),
            Self::Failed { message } => format!("Failed: {message}"),
        }
    }

    pub(super) fn color(&self, colors: &ThemeColors) -> Hsla {
        match self {
            Self::Idle => colors.accent_foreground,
            Self::Generating => colors.progress_foreground,
            Self::Succeeded => colors.success_foreground,
            Self::Failed { .. } => colors.error_foreground,
        }
    }
}

/// Whether the window still needs to drain job updates.
pub(super) fn needs_update_polling(submission: &SubmissionState, samples: SampleFetchState) -> bool {
    submission.is_busy() || samples == SampleFetchState::Pending
}
