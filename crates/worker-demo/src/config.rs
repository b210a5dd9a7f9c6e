use std::{fmt, path::PathBuf};

use bon::Builder;

// Edit these before running.
pub const API_URL: &str = "https://your-worker-domain.com/";
pub const API_KEY: &str = "YOUR_API_KEY_HERE";
pub const PROMPT: &str = "Describe a futuristic city at sunset";
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
/// e.g. `Some("image.jpg")`
pub const IMAGE_PATH: Option<&str> = None;
pub const STREAM: bool = false;
/// Where a returned image is written
pub const OUTPUT_PATH: &str = "ai_output.jpg";

/// Everything one run of the driver needs.
#[derive(Clone, Builder)]
pub struct DriverConfig {
    #[builder(into)]
    pub api_url: String,
    #[builder(into)]
    pub api_key: String,
    #[builder(into)]
    pub prompt: String,
    #[builder(into)]
    pub system_prompt: String,
    #[builder(into)]
    pub image_path: Option<PathBuf>,
    #[builder(default)]
    pub stream: bool,
    #[builder(into, default = PathBuf::from(OUTPUT_PATH))]
    pub output_path: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::builder()
            .api_url(API_URL)
            .api_key(API_KEY)
            .prompt(PROMPT)
            .system_prompt(SYSTEM_PROMPT)
            .maybe_image_path(IMAGE_PATH)
            .stream(STREAM)
            .build()
    }
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("prompt", &self.prompt)
            .field("system_prompt", &self.system_prompt)
            .field("image_path", &self.image_path)
            .field("stream", &self.stream)
            .field("output_path", &self.output_path)
            .finish()
    }
}
