use std::time::Duration;

pub const DEFAULT_EXCERPT_CHARS: usize = 200;
pub const DEFAULT_CONTENT_CHARS: usize = 5000;
pub const DEFAULT_REFERENCE_CHARS: usize = 3000;
pub const DEFAULT_PROMPT_REFERENCE_CHARS: usize = 1000;
pub const DEFAULT_MAX_REFERENCES: usize = 2;
pub const DEFAULT_PAGE_WINDOW: u32 = 3;
pub const DEFAULT_STUBS_PER_PAGE: usize = 5;
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Policy limits for the crawl and enrichment pipeline.
///
/// Every truncation, cap, window and timeout lives here so callers can tune
/// them without touching the components.
#[derive(Debug, Clone)]
pub struct Limits {
    pub excerpt_chars: usize,
    pub content_chars: usize,
    pub reference_chars: usize,
    pub prompt_reference_chars: usize,
    pub max_references: usize,
    pub page_window: u32,
    pub stubs_per_page: usize,
    pub pacing: Duration,
    pub navigation_timeout: Duration,
    pub element_timeout: Duration,
    pub reference_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            content_chars: DEFAULT_CONTENT_CHARS,
            reference_chars: DEFAULT_REFERENCE_CHARS,
            prompt_reference_chars: DEFAULT_PROMPT_REFERENCE_CHARS,
            max_references: DEFAULT_MAX_REFERENCES,
            page_window: DEFAULT_PAGE_WINDOW,
            stubs_per_page: DEFAULT_STUBS_PER_PAGE,
            pacing: Duration::from_secs(5),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            element_timeout: Duration::from_secs(10),
            reference_timeout: Duration::from_secs(15),
        }
    }
}

impl Limits {
    pub fn with_page_window(mut self, pages: u32) -> Self {
        self.page_window = pages.max(1);
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}
