mod panel_controller;
mod panel_view;
mod remote_job_manager;

pub use panel_controller::{
    GENERATION_FAILED_MESSAGE, GeneratePress, NoticeLevel, PROMPT_REQUIRED_MESSAGE,
    PanelController, PanelNotice, SampleFetchState, SubmissionState,
};
pub use panel_view::{
    BUSY_INDICATOR, GENERATE_LABEL, GENERATING_LABEL, OUTPUT_PLACEHOLDER, OutputRegion, PanelView,
};
pub use remote_job_manager::{RemoteJobManager, RemoteJobUpdate};
