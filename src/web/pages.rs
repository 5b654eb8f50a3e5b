//! HTML rendering for the form pages

use serde::{Deserialize, Serialize};

use crate::core::models::{BatchReport, MediaFormat, OutcomeStatus, TruncationWarning};
use crate::core::translator::{Localizer, SUPPORTED_LANGUAGES};

/// Pages reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Video,
    Mp3,
    Mp4,
    About,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Video, Page::Mp3, Page::Mp4, Page::About];

    pub fn from_slug(slug: Option<&str>) -> Self {
        match slug.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("mp3") => Self::Mp3,
            Some("mp4") => Self::Mp4,
            Some("about") => Self::About,
            _ => Self::Video,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::About => "about",
        }
    }

    /// Format downloaded by this page; `None` for pages without a form
    pub fn format(&self) -> Option<MediaFormat> {
        match self {
            Self::Video | Self::Mp4 => Some(MediaFormat::Mp4),
            Self::Mp3 => Some(MediaFormat::Mp3),
            Self::About => None,
        }
    }

    fn menu_label(&self) -> &'static str {
        match self {
            Self::Video => "YouTube Video Downloader",
            Self::Mp3 => "YouTube to MP3",
            Self::Mp4 => "YouTube to MP4",
            Self::About => "About Us",
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            Self::Video => "YouTube Video Downloader",
            Self::Mp3 => "YouTube to MP3 Converter",
            Self::Mp4 => "YouTube to MP4 Converter",
            Self::About => "About Video Batch Downloader",
        }
    }

    fn button_label(&self) -> &'static str {
        match self {
            Self::Video => "Download Videos",
            Self::Mp3 => "Convert and Download MP3s",
            Self::Mp4 => "Download MP4s",
            Self::About => "",
        }
    }

    fn limit_warning(&self, limit: usize) -> String {
        match self {
            Self::Mp3 => format!("You can convert up to {} videos to MP3 at a time.", limit),
            _ => format!("You can download up to {} videos at a time.", limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "notice success",
            Self::Warning => "notice warning",
            Self::Error => "notice error",
        }
    }
}

/// One status line shown under the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Per-attempt errors and retries first, then one line per final outcome
pub fn report_notices(report: &BatchReport, max_attempts: u32) -> Vec<Notice> {
    let mut notices = Vec::new();
    let mut results = Vec::new();

    for outcome in &report.outcomes {
        let (error_label, retry_label) = if outcome.format.is_audio() {
            ("Conversion error", "Retrying conversion")
        } else {
            ("Download error", "Retrying download")
        };

        for (index, error) in outcome.attempt_errors.iter().enumerate() {
            let attempt = index as u32 + 1;
            notices.push(Notice::new(
                NoticeKind::Error,
                format!("{} for {}: {}", error_label, outcome.url, error),
            ));
            if attempt < outcome.attempts_used {
                notices.push(Notice::new(
                    NoticeKind::Warning,
                    format!(
                        "{} for {} ({}/{})...",
                        retry_label, outcome.url, attempt, max_attempts
                    ),
                ));
            }
        }

        let kind = match outcome.status {
            OutcomeStatus::Success => NoticeKind::Success,
            OutcomeStatus::Failed => NoticeKind::Error,
        };
        results.push(Notice::new(kind, outcome.message.clone()));
    }

    notices.extend(results);
    notices
}

/// What the form should show besides the static labels
#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub urls: String,
    pub truncation: Option<TruncationWarning>,
    pub notices: Vec<Notice>,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"<style>
body { font-family: Arial, sans-serif; margin: 0; display: flex; }
.sidebar { width: 240px; padding: 20px; background: #f0f2f6; min-height: 100vh; }
.main { flex: 1; padding: 20px 40px; max-width: 800px; }
.banner { background-color: #007BFF; color: white; padding: 15px; text-align: center; font-size: 24px; margin-bottom: 20px; }
textarea { width: 100%; min-height: 120px; }
.notice { padding: 10px; margin: 6px 0; border-radius: 4px; }
.success { background: #d4edda; color: #155724; }
.warning { background: #fff3cd; color: #856404; }
.error { background: #f8d7da; color: #721c24; }
.section h2 { color: #007BFF; }
.section p { line-height: 1.6; }
</style>"#;

const ABOUT_SECTIONS: &[(&str, &str)] = &[
    (
        "Multiple Format Support",
        "Download videos as MP4 or extract the audio track straight to MP3, ready for any PC, tablet or phone.",
    ),
    (
        "High-Quality Video Downloads",
        "Videos are fetched in the best MP4 quality the source offers and audio is encoded at 192 kbps.",
    ),
    (
        "User-Friendly Interface",
        "Pick a page, paste your links and press one button. No technical knowledge needed.",
    ),
    (
        "Batch Downloads",
        "Paste several links separated by commas and they are fetched in parallel, each retried on its own when something goes wrong.",
    ),
    (
        "No Software Installation Required",
        "Everything runs on the server: open the page, paste the links and start downloading.",
    ),
    (
        "Fast Download Speeds",
        "Links in a batch are downloaded side by side instead of one after another.",
    ),
];

const ABOUT_REASONS_TITLE: &str = "Why Choose Video Batch Downloader?";

const ABOUT_REASONS: &[&str] = &[
    "Free to use, with no accounts or subscriptions.",
    "Best available quality for both video and audio downloads.",
    "Works from any browser on desktop or mobile.",
    "Transient failures are retried automatically before an error is reported.",
    "The interface can be shown in ten languages.",
];

const FORM_URLS_LABEL: &str = "Enter YouTube Video URLs (comma-separated)";

/// Every translatable string a page will show, in render order
fn page_labels(page: Page, view: &PageView, max_batch_size: usize) -> Vec<String> {
    let mut labels = vec![
        "YouTube Video Downloader".to_string(),
        "Select Page".to_string(),
    ];
    labels.extend(Page::ALL.iter().map(|p| p.menu_label().to_string()));
    labels.push(page.heading().to_string());

    if page == Page::About {
        for (title, body) in ABOUT_SECTIONS {
            labels.push(title.to_string());
            labels.push(body.to_string());
        }
        labels.push(ABOUT_REASONS_TITLE.to_string());
        labels.extend(ABOUT_REASONS.iter().map(|r| r.to_string()));
    } else {
        labels.push(FORM_URLS_LABEL.to_string());
        labels.push(page.button_label().to_string());
        if view.truncation.is_some() {
            labels.push(page.limit_warning(max_batch_size));
        }
    }

    labels
}

/// Render a full HTML page in the localizer's language
pub async fn render_page(
    localizer: &mut Localizer,
    page: Page,
    view: &PageView,
    max_batch_size: usize,
) -> String {
    let lang = localizer.language();
    let labels = page_labels(page, view, max_batch_size);
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    localizer.prefetch(&label_refs).await;

    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    html.push_str(&format!(
        "<title>{}</title>",
        escape_html(&localizer.t("YouTube Video Downloader").await)
    ));
    html.push_str(STYLE);
    html.push_str("</head><body>");

    // Sidebar: language and page selectors
    html.push_str("<div class=\"sidebar\"><form method=\"get\" action=\"/\">");
    html.push_str("<label>Select Language</label><br><select name=\"lang\" onchange=\"this.form.submit()\">");
    for (code, name) in SUPPORTED_LANGUAGES {
        let selected = if *code == lang { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            code, selected, name
        ));
    }
    html.push_str("</select><br><br>");
    html.push_str(&format!(
        "<label>{}</label><br><select name=\"page\" onchange=\"this.form.submit()\">",
        escape_html(&localizer.t("Select Page").await)
    ));
    for candidate in Page::ALL {
        let selected = if candidate == page { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            candidate.slug(),
            selected,
            escape_html(&localizer.t(candidate.menu_label()).await)
        ));
    }
    html.push_str("</select></form></div>");

    html.push_str("<div class=\"main\">");
    html.push_str("<div class=\"banner\">Welcome to Video Batch Downloader</div>");
    html.push_str(&format!(
        "<h1>{}</h1>",
        escape_html(&localizer.t("YouTube Video Downloader").await)
    ));
    html.push_str(&format!(
        "<h2>{}</h2>",
        escape_html(&localizer.t(page.heading()).await)
    ));

    if page == Page::About {
        html.push_str("<div class=\"about-page\">");
        for (title, body) in ABOUT_SECTIONS {
            html.push_str(&format!(
                "<div class=\"section\"><h2>{}</h2><p>{}</p></div>",
                escape_html(&localizer.t(title).await),
                escape_html(&localizer.t(body).await)
            ));
        }
        html.push_str(&format!(
            "<div class=\"section\"><h2>{}</h2><ul>",
            escape_html(&localizer.t(ABOUT_REASONS_TITLE).await)
        ));
        for reason in ABOUT_REASONS {
            html.push_str(&format!(
                "<li>{}</li>",
                escape_html(&localizer.t(reason).await)
            ));
        }
        html.push_str("</ul></div></div>");
    } else {
        html.push_str("<form method=\"post\" action=\"/download\">");
        html.push_str(&format!(
            "<input type=\"hidden\" name=\"page\" value=\"{}\"><input type=\"hidden\" name=\"lang\" value=\"{}\">",
            page.slug(),
            lang
        ));
        html.push_str(&format!(
            "<label>{}</label><br><textarea name=\"urls\">{}</textarea><br>",
            escape_html(
                &localizer
                    .t(FORM_URLS_LABEL)
                    .await
            ),
            escape_html(&view.urls)
        ));
        html.push_str(&format!(
            "<button type=\"submit\">{}</button></form>",
            escape_html(&localizer.t(page.button_label()).await)
        ));

        if view.truncation.is_some() {
            html.push_str(&format!(
                "<div class=\"{}\">{}</div>",
                NoticeKind::Warning.css_class(),
                escape_html(&localizer.t(&page.limit_warning(max_batch_size)).await)
            ));
        }

        for notice in &view.notices {
            html.push_str(&format!(
                "<div class=\"{}\">{}</div>",
                notice.kind.css_class(),
                escape_html(&notice.text)
            ));
        }
    }

    if let Some(error) = localizer.errors().first() {
        html.push_str(&format!(
            "<div class=\"{}\">Translation error: {}</div>",
            NoticeKind::Warning.css_class(),
            escape_html(error)
        ));
    }

    html.push_str("</div></body></html>");
    html
}
