//! HTML for the single planner page.

use crate::travel_team::TravelPlan;
use pulldown_cmark::{html, Event, Options, Parser};

pub const PAGE_TITLE: &str = "✈️ AI Travel Planner";
pub const INTRO: &str = "Plan your dream trip! Enter your travel preferences, and we'll create a personalized travel plan.";
pub const REQUEST_LABEL: &str = "Your travel preferences (e.g., 'Plan a 7-day trip to Kyoto for two, focusing on culture and food, with a moderate budget.')";
pub const SUBMIT_LABEL: &str = "Generate Travel Plan";
pub const SPINNER_TEXT: &str = "Generating your travel plan...";
pub const RESULT_HEADER: &str = "Your Personalized Travel Plan";
pub const HISTORY_LABEL: &str = "View Conversation History";
pub const NO_PLAN_WARNING: &str = "No final travel plan content available.";
pub const NO_HISTORY_INFO: &str = "No conversation history to display.";
pub const API_KEY_HINT: &str = "Please ensure your `GROQ_API_KEY` is correctly set in secrets.toml or .env file and try again.";

const STYLE: &str = "body{font-family:sans-serif;max-width:64rem;margin:2rem auto;padding:0 1rem;color:#262730}\
textarea{width:100%;font:inherit}\
button{margin-top:.5rem;padding:.4rem 1rem}\
.error{background:#ffe4e4;color:#7d1a1a;padding:.75rem 1rem;border-radius:.4rem;margin:1rem 0}\
.warning{background:#fff6d6;padding:.75rem 1rem;border-radius:.4rem}\
.info{background:#e4efff;padding:.75rem 1rem;border-radius:.4rem}\
details{margin-top:1.5rem;border:1px solid #ddd;border-radius:.4rem;padding:.5rem 1rem}";

/// What to show around the form.
#[derive(Default)]
pub struct PageView<'a> {
    /// Text to put back into the textarea.
    pub request: &'a str,
    /// Error banners, shown in order above the results.
    pub errors: Vec<String>,
    /// Markdown hints shown under the errors.
    pub notes: Vec<&'a str>,
    /// The result panel, when there is one.
    pub plan: Option<&'a TravelPlan>,
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render Markdown to HTML. Raw HTML in the source is shown as text, never interpreted.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>AI Travel Planner</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        STYLE, body
    )
}

fn error_banner(message: &str) -> String {
    format!("<div class=\"error\" role=\"alert\">{}</div>\n", escape_html(message))
}

/// The page shown when the server cannot plan at all: the error and nothing else.
pub fn startup_error_page(message: &str) -> String {
    document(&error_banner(message))
}

fn result_panel(plan: &TravelPlan) -> String {
    let transcript = plan.transcript();
    let mut out = format!("<section id=\"result\">\n<h2>{}</h2>\n", RESULT_HEADER);

    match plan.final_answer() {
        Some(answer) => out.push_str(&markdown_to_html(answer)),
        None => out.push_str(&format!("<div class=\"warning\">{}</div>\n", NO_PLAN_WARNING)),
    }

    out.push_str(&format!("<details>\n<summary>{}</summary>\n", HISTORY_LABEL));
    if transcript.is_empty() {
        out.push_str(&format!("<div class=\"info\">{}</div>\n", NO_HISTORY_INFO));
    }
    for turn in transcript {
        let name = if turn.name.is_empty() {
            "Unknown Agent"
        } else {
            turn.name.as_str()
        };
        let content = if turn.content.is_empty() {
            "(No content)"
        } else {
            turn.content.as_str()
        };
        out.push_str(&markdown_to_html(&format!("**{}**: {}", name, content)));
    }
    out.push_str("</details>\n</section>\n");
    out
}

/// The planner page: title, form, banners and, when available, the result panel.
pub fn planner_page(view: &PageView<'_>) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n{}\
         <form method=\"post\" action=\"/\" onsubmit=\"document.getElementById('spinner').hidden=false\">\n\
         <label for=\"request\">{}</label>\n\
         <textarea id=\"request\" name=\"request\" rows=\"7\">{}</textarea>\n\
         <button type=\"submit\">{}</button>\n\
         </form>\n\
         <p id=\"spinner\" hidden>{}</p>\n",
        PAGE_TITLE,
        markdown_to_html(INTRO),
        escape_html(REQUEST_LABEL),
        escape_html(view.request),
        SUBMIT_LABEL,
        SPINNER_TEXT
    );

    for error in &view.errors {
        body.push_str(&error_banner(error));
    }
    for note in &view.notes {
        body.push_str(&markdown_to_html(note));
    }
    if let Some(plan) = view.plan {
        if !plan.transcript().is_empty() {
            body.push_str(&result_panel(plan));
        }
    }
    document(&body)
}
