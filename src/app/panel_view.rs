use crate::domain::GeneratedImage;

pub const GENERATE_LABEL: &str = "Generate";
pub const GENERATING_LABEL: &str = "Generating...";
pub const BUSY_INDICATOR: &str = "Loading...";
pub const OUTPUT_PLACEHOLDER: &str = "Output image will appear here.";

/// What the output area shows. Exactly one of these at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRegion {
    Image(GeneratedImage),
    Busy(&'static str),
    Placeholder(&'static str),
}

impl OutputRegion {
    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            Self::Image(image) => Some(image),
            Self::Busy(_) | Self::Placeholder(_) => None,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Image(_) => None,
            Self::Busy(message) | Self::Placeholder(message) => Some(message),
        }
    }
}

/// Everything the window renders, derived from controller state only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub prompt: String,
    pub samples: Vec<String>,
    pub steps_label: String,
    pub guidance_label: String,
    pub generate_label: &'static str,
    pub generate_enabled: bool,
    pub output: OutputRegion,
}
