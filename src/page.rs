//! Server-rendered HTML for the trainer form.

use crate::submission::Outcome;

pub const TITLE: &str = "FitFocus AI Trainer";
pub const FIELD_LABEL: &str = "What are we training today?";
pub const PLACEHOLDER: &str = "e.g. Leg and glute workout";
pub const BUTTON_LABEL: &str = "Generate workout plan";
pub const BUSY_TEXT: &str = "Building your workout...";

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
.warning{color:#8a6d00}.error{color:#b00020}.answer{white-space:pre-wrap}";

/// The form page, optionally showing the outcome of the last submission.
///
/// `goal` is echoed back into the input so the user can edit and resubmit.
pub fn form(goal: &str, outcome: Option<&Outcome>) -> String {
    let mut body = format!(
        r#"<form method="post" action="/" onsubmit="document.getElementById('busy').hidden=false">
<label for="goal">{label}</label>
<input type="text" id="goal" name="goal" value="{goal}" placeholder="{placeholder}">
<button type="submit">{button}</button>
</form>
<p id="busy" hidden>{busy}</p>
"#,
        label = FIELD_LABEL,
        goal = escape(goal),
        placeholder = PLACEHOLDER,
        button = BUTTON_LABEL,
        busy = BUSY_TEXT,
    );

    match outcome {
        None => {}
        Some(Outcome::Warning(text)) => {
            body.push_str(&format!("<p class=\"warning\">{}</p>\n", escape(text)));
        }
        Some(Outcome::Answer(text)) => {
            body.push_str(&format!("<hr>\n<div class=\"answer\">{}</div>\n", escape(text)));
        }
        Some(Outcome::Failed { message, .. }) => {
            body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(message)));
        }
    }

    layout(&body)
}

/// Shown instead of the form when the service cannot accept submissions.
pub fn halted(message: &str) -> String {
    layout(&format!("<p class=\"error\">{}</p>\n", escape(message)))
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{TITLE}</title>
<style>{STYLE}</style>
</head>
<body>
<h1>{TITLE}</h1>
{body}</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
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
