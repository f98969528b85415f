//! HTML views for the profile page.
//!
//! Three views share one document shell: the profile itself, a loader shown
//! while no data exists yet, and an error view shown when the first read
//! failed and there is nothing to fall back to.

use html_escape::{encode_double_quoted_attribute, encode_text};
use persona_core::{FetchError, ProfileInfo, StyledTextFragment};
use persona_swr::PageState;
use serde::{Deserialize, Serialize};

use crate::richtext::rich_text_html;

/// Heading used when the profile has no name.
pub const DEFAULT_HEADING: &str = "Hello 👋";

/// Seconds between reloads of the loader view.
const LOADING_REFRESH_SECS: u32 = 2;

const EXTERNAL_LINK_ICON: &str = "<svg class=\"ml-1 h-4 w-4\" aria-hidden=\"true\" \
viewBox=\"0 0 20 20\" fill=\"currentColor\"><path d=\"M11 3a1 1 0 100 2h2.586l-6.293 \
6.293a1 1 0 101.414 1.414L15 6.414V9a1 1 0 102 0V4a1 1 0 00-1-1h-5z\"/><path d=\"M5 5a2 \
2 0 00-2 2v8a2 2 0 002 2h8a2 2 0 002-2v-3a1 1 0 10-2 0v3H5V7h3a1 1 0 000-2H5z\"/></svg>";

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMeta {
    /// `<title>` text.
    pub title: String,
    /// Meta description.
    pub description: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Persona".to_string(),
            description: "Personal profile".to_string(),
        }
    }
}

/// Where a profile link points.
///
/// An `email` label (any case) becomes a `mailto:` link; everything else
/// uses the fragment text as-is, or `#` when it is empty.
pub fn link_target(label: &str, fragment: &StyledTextFragment) -> String {
    if label.eq_ignore_ascii_case("email") {
        format!("mailto:{}", fragment.plain_text)
    } else if fragment.plain_text.is_empty() {
        "#".to_string()
    } else {
        fragment.plain_text.clone()
    }
}

/// Renders the page for whatever state the loader is in.
pub fn render_state(state: &PageState<ProfileInfo>, meta: &SiteMeta) -> String {
    match state {
        PageState::Loading => render_loading(meta),
        PageState::Error(err) => render_error(err, meta),
        PageState::Ready(profile) => render_profile(profile, meta),
    }
}

/// Renders the full profile page.
pub fn render_profile(profile: &ProfileInfo, meta: &SiteMeta) -> String {
    let mut body = String::new();
    body.push_str("<div class=\"p-4 flex flex-col justify-center gap-4 lg:flex-row\">");

    if let Some(picture) = &profile.profile_picture {
        let alt = match profile.display_name() {
            Some(name) => format!("{name}'s profile picture"),
            None => "Profile picture".to_string(),
        };
        body.push_str("<div class=\"flex-1\"><img class=\"image grayscale\" src=\"");
        body.push_str(&encode_double_quoted_attribute(picture));
        body.push_str("\" alt=\"");
        body.push_str(&encode_double_quoted_attribute(&alt));
        body.push_str("\" width=\"300\" height=\"400\" style=\"object-fit: cover\"></div>");
    }

    body.push_str("<div class=\"flex-1 max-w-lg my-auto\">");

    body.push_str("<h1 class=\"my-2 text-5xl font-bold font-serif text-gray-900\">");
    match &profile.name {
        Some(name) => body.push_str(&rich_text_html(name)),
        None => body.push_str(DEFAULT_HEADING),
    }
    body.push_str("</h1>");

    body.push_str("<p class=\"my-1 text-sm text-gray-700\">");
    body.push_str(&rich_text_html(profile.headline.as_deref().unwrap_or_default()));
    body.push_str("</p>");

    body.push_str("<p class=\"mt-4 mb-0 text-base text-gray-900\"><b>");
    body.push_str(&rich_text_html(profile.salutation.as_deref().unwrap_or_default()));
    body.push_str("</b></p>");

    if let Some(description) = &profile.description {
        body.push_str("<p class=\"mt-0 mb-4 text-base text-gray-900 text-justify\">");
        body.push_str(&rich_text_html(description));
        body.push_str("</p>");
    }

    render_links(profile, &mut body);

    if let Some(copyright) = &profile.copyright {
        body.push_str("<p class=\"mt-12 text-sm text-gray-700\">");
        body.push_str(&rich_text_html(copyright));
        body.push_str("</p>");
    }

    body.push_str("</div></div>");
    document(meta, "flex items-center justify-center", None, &body)
}

fn render_links(profile: &ProfileInfo, body: &mut String) {
    if profile.links.is_empty() {
        return;
    }

    body.push_str("<ul class=\"mt-4 flex flex-wrap gap-x-4 gap-y-1\">");
    for (label, text) in profile.links.iter() {
        let Some(first) = text.first() else {
            continue;
        };
        body.push_str("<li><a href=\"");
        body.push_str(&encode_double_quoted_attribute(&link_target(label, first)));
        body.push_str(
            "\" target=\"_blank\" rel=\"noopener noreferrer\" \
             class=\"inline-flex items-center justify-center underline underline-offset-2 \
             decoration-2 text-gray-700 cursor-pointer\">",
        );
        body.push_str(&encode_text(label));
        body.push_str(EXTERNAL_LINK_ICON);
        body.push_str("</a></li>");
    }
    body.push_str("</ul>");
}

/// Renders the error view.
pub fn render_error(err: &FetchError, meta: &SiteMeta) -> String {
    let mut body = String::new();
    body.push_str("<div class=\"p-4 max-w-lg\" role=\"alert\">");
    body.push_str("<h1 class=\"my-2 text-3xl font-bold font-serif text-gray-900\">Something went wrong</h1>");
    body.push_str("<p class=\"my-1 text-sm text-gray-700\">");
    body.push_str(&encode_text(&err.to_string()));
    body.push_str("</p></div>");
    document(meta, "flex items-center justify-center", None, &body)
}

/// Renders the loader view. It reloads itself until data arrives.
pub fn render_loading(meta: &SiteMeta) -> String {
    let body = "<div class=\"loader\" role=\"status\" aria-live=\"polite\">Loading…</div>";
    document(meta, "min-h-full", Some(LOADING_REFRESH_SECS), body)
}

fn document(meta: &SiteMeta, class: &str, refresh: Option<u32>, body: &str) -> String {
    let title = encode_text(&meta.title);
    let description = encode_double_quoted_attribute(&meta.description);

    let mut html = String::with_capacity(body.len() + 512);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if let Some(secs) = refresh {
        html.push_str(&format!("<meta http-equiv=\"refresh\" content=\"{secs}\">\n"));
    }
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str(&format!("<meta name=\"description\" content=\"{description}\">\n"));
    html.push_str(&format!("<meta property=\"og:title\" content=\"{}\">\n", encode_double_quoted_attribute(&meta.title)));
    html.push_str(&format!("<meta property=\"og:description\" content=\"{description}\">\n"));
    html.push_str("</head>\n<body>\n");
    html.push_str("<div class=\"min-h-full selection:bg-gray-800 selection:text-white ");
    html.push_str(class);
    html.push_str("\">");
    html.push_str(body);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

// ============================================================================
// Tests
// ============================================================================
