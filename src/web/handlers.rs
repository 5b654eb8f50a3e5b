use axum::{
    extract::{Query, State},
    response::Html,
    Form,
};
use serde::Deserialize;
use tracing::info;

use crate::core::translator::Localizer;
use crate::utils::validation::build_requests;
use crate::web::pages::{render_page, report_notices, Page, PageView};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub urls: String,
    pub page: Option<String>,
    pub lang: Option<String>,
}

fn localizer_for(state: &AppState, lang: Option<&str>) -> Localizer {
    let fallback = state.config.translation.default_language.as_str();
    Localizer::new(state.translator.clone(), Some(lang.unwrap_or(fallback)))
}

/// Render the selected page with an empty form
pub async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    let page = Page::from_slug(query.page.as_deref());
    let mut localizer = localizer_for(&state, query.lang.as_deref());

    Html(
        render_page(
            &mut localizer,
            page,
            &PageView::default(),
            state.runner.max_batch_size(),
        )
        .await,
    )
}

/// Run the submitted URLs as one batch and render the results
pub async fn submit(State(state): State<AppState>, Form(form): Form<DownloadForm>) -> Html<String> {
    let page = Page::from_slug(form.page.as_deref());
    let mut localizer = localizer_for(&state, form.lang.as_deref());
    let max_batch_size = state.runner.max_batch_size();

    let mut view = PageView {
        urls: form.urls.clone(),
        ..PageView::default()
    };

    if let Some(format) = page.format() {
        let requests = build_requests(&form.urls, format);
        if !requests.is_empty() {
            info!(
                "📨 Form submission: {} URLs as {} (page {})",
                requests.len(),
                format,
                page.slug()
            );

            let report = state.runner.run_batch(requests).await;
            view.truncation = report.truncation;
            view.notices = report_notices(&report, state.runner.policy().max_attempts);
        }
    }

    Html(render_page(&mut localizer, page, &view, max_batch_size).await)
}

pub async fn health() -> &'static str {
    "ok"
}
