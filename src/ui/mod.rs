use gpui::{
    App, AppContext, Application, Bounds, TitlebarOptions, WindowBounds, WindowOptions, px, size,
};
use gpui_component::Root;

mod backend;
mod state;
mod theme;
mod utils;
mod window;

const WINDOW_TITLE: &str = "Image Generator";
const WINDOW_WIDTH: f32 = 640.0;
const WINDOW_HEIGHT: f32 = 820.0;
const PROMPT_EDITOR_ROWS: usize = 3;
const OUTPUT_IMAGE_HEIGHT_PX: f32 = 384.0;
const JOB_UPDATE_POLL_INTERVAL_MS: u64 = 50;

const PROMPT_PLACEHOLDER: &str = "Enter your prompt...";
const QUICK_PROMPTS_LABEL: &str = "Quick Prompts:";
const SERVICE_UNAVAILABLE_MESSAGE: &str = "generation service is not configured";
const DEBUG_PROMPT_LOG_ENV: &str = "GENPANEL_DEBUG_PROMPT_LOG";
const DEBUG_PROMPT_PREVIEW_CHARS: usize = 120;

pub(crate) fn run_gpui_panel() {
    Application::new().run(|cx: &mut App| {
        gpui_component::init(cx);
        theme::apply_default_theme(cx);

        let bounds = Bounds::centered(None, size(px(WINDOW_WIDTH), px(WINDOW_HEIGHT)), cx);
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            titlebar: Some(TitlebarOptions {
                title: Some(WINDOW_TITLE.into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        if let Err(error) = cx.open_window(options, |window, cx| {
            let view = cx.new(|cx| window::GenPanelWindow::new(window, cx));
            cx.new(|cx| Root::new(view, window, cx))
        }) {
            tracing::error!("failed to open panel window: {error}");
            cx.quit();
            return;
        }

        cx.on_window_closed(|cx| {
            if cx.windows().is_empty() {
                cx.quit();
            }
        })
        .detach();

        cx.activate(true);
    });
}

#[cfg(test)]
mod tests {
    use genpanel::app::{NoticeLevel, SampleFetchState, SubmissionState};
    use genpanel::domain::{GenerateResponse, GeneratedImage};
    use gpui::PromptLevel;

    use super::state::{PanelStatus, needs_update_polling};
    use super::theme::PanelTheme;
    use super::utils::{gpui_image, prompt_level, prompt_preview};

    #[test]
    fn prompt_preview_truncates_long_prompts() {
        assert_eq!(prompt_preview("abcdef", 4), "abcd...");
        assert_eq!(prompt_preview("abc", 4), "abc");
        assert_eq!(prompt_preview("äöüß", 2), "äö...");
    }

    #[test]
    fn panel_status_follows_submission_state() {
        let image = GeneratedImage::from_response(GenerateResponse {
            image: "QQ==".to_string(),
        })
        .expect("payload should decode");

        let cases = [
            (SubmissionState::Idle, PanelStatus::Idle, "Ready"),
            (
                SubmissionState::Submitting { job_id: Some(3) },
                PanelStatus::Generating,
                "Generating image...",
            ),
            (
                SubmissionState::Succeeded { image },
                PanelStatus::Succeeded,
                "Image ready",
            ),
        ];

        for (submission, expected_status, expected_label) in cases {
            let status = PanelStatus::from_submission(&submission);
            assert_eq!(status, expected_status);
            assert_eq!(status.label(), expected_label);
        }

        let failed = PanelStatus::from_submission(&SubmissionState::Failed {
            message: "HTTP 500".to_string(),
        });
        assert_eq!(failed.label(), "Failed: HTTP 500");
    }

    #[test]
    fn panel_status_colors_come_from_theme() {
        let colors = PanelTheme::default().colors;
        assert_eq!(PanelStatus::Idle.color(&colors), colors.accent_foreground);
        assert_eq!(
            PanelStatus::Generating.color(&colors),
            colors.progress_foreground
        );
        assert_eq!(
            PanelStatus::Failed {
                message: String::new()
            }
            .color(&colors),
            colors.error_foreground
        );
    }

    #[test]
    fn polling_continues_while_generation_or_sample_fetch_is_pending() {
        assert!(needs_update_polling(
            &SubmissionState::Submitting { job_id: None },
            SampleFetchState::Loaded
        ));
        assert!(needs_update_polling(
            &SubmissionState::Idle,
            SampleFetchState::Pending
        ));
        assert!(!needs_update_polling(
            &SubmissionState::Idle,
            SampleFetchState::Failed
        ));
        assert!(!needs_update_polling(
            &SubmissionState::Failed {
                message: "boom".to_string()
            },
            SampleFetchState::Loaded
        ));
    }

    #[test]
    fn notice_levels_map_to_window_prompt_levels() {
        assert_eq!(prompt_level(NoticeLevel::Warning), PromptLevel::Warning);
        assert_eq!(prompt_level(NoticeLevel::Error), PromptLevel::Critical);
    }

    #[test]
    fn generated_image_bytes_are_handed_to_gpui_unchanged() {
        let image = GeneratedImage::from_response(GenerateResponse {
            image: "iVBORw0KGgo=".to_string(),
        })
        .expect("payload should decode");

        let gpui_image = gpui_image(&image);
        assert_eq!(gpui_image.bytes(), image.bytes());
    }
}
