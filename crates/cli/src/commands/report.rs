//! HTML report rendering
//!
//! Turns the JSON run report the suite writes into a single
//! self-contained HTML page: no external assets, screenshots and videos
//! embedded as data URIs, trace links kept clickable.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use drover_core::report::{Attachment, AttachmentBody, RunReport, ScenarioReport};

#[derive(Args)]
pub struct ReportArgs {
    /// Path to the run report produced by the suite
    #[arg(long, default_value = "test-results/report.json")]
    pub input: PathBuf,

    /// Where to write the HTML page
    #[arg(long, default_value = "test-results/report.html")]
    pub output: PathBuf,
}

pub async fn execute(args: ReportArgs) -> anyhow::Result<()> {
    let report = RunReport::load(&args.input).with_context(|| {
        format!(
            "No run report at {}; run the suite first",
            args.input.display()
        )
    })?;

    let html = render(&report);

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.output, html)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "📄 Report location: {}",
        args.output.display().to_string().cyan()
    );
    Ok(())
}

// Palette lifted from the suite's old dark theme
const STYLE: &str = "<style>\n\
body { font-family: sans-serif; background-color: #1e1e1e; color: #d4d4d4; margin: 2em; }\n\
h1, h2 { font-weight: 600; }\n\
.meta { color: #9d9d9d; }\n\
.summary { background-color: #252526; border: 1px solid #3e3e42; padding: 0.5em 1em; }\n\
.badge { font-size: 0.6em; padding: 2px 8px; border-radius: 4px; vertical-align: middle; }\n\
.badge.passed, tr.passed td:nth-child(2) { background-color: #107c10; color: #fff; }\n\
.badge.failed, tr.failed td:nth-child(2) { background-color: #c50f1f; color: #fff; }\n\
.badge.skipped, tr.skipped td:nth-child(2) { background-color: #ca5010; color: #fff; }\n\
.badge.undefined, tr.undefined td:nth-child(2) { background-color: #0078d4; color: #fff; }\n\
table { border-collapse: collapse; margin: 1em 0; width: 100%; }\n\
th, td { border: 1px solid #3e3e42; padding: 4px 10px; text-align: left; }\n\
pre.error { background-color: #252526; border: 1px solid #c50f1f; padding: 0.5em; white-space: pre-wrap; }\n\
.attachment { max-width: 100%; margin: 0.5em 0; }\n\
a { color: #4ec9b0; }\n\
</style>\n";

fn render(report: &RunReport) -> String {
    let s = &report.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Drover Test Results</title>\n");
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Drover Test Results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Generated {} by drover v{} · run started {}</p>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        drover_core::VERSION,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ));
    html.push_str(&format!(
        "<div class=\"summary\">\n<p>{} scenarios ({} passed, {} failed, {} skipped)</p>\n\
         <p>{} steps ({} passed, {} failed, {} skipped)</p>\n<p>Duration: {:.1}s</p>\n</div>\n",
        s.scenarios_total,
        s.scenarios_passed,
        s.scenarios_failed,
        s.scenarios_skipped,
        s.steps_total,
        s.steps_passed,
        s.steps_failed,
        s.steps_skipped,
        s.duration_ms as f64 / 1000.0,
    ));

    for scenario in &report.scenarios {
        html.push_str(&render_scenario(scenario));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_scenario(scenario: &ScenarioReport) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<section class=\"scenario\">\n<h2>{} <span class=\"badge {}\">{}</span></h2>\n",
        escape_html(&scenario.name),
        scenario.status,
        scenario.status,
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} · {} ms</p>\n",
        escape_html(&scenario.uri),
        scenario.duration_ms,
    ));
    if let Some(error) = &scenario.error {
        html.push_str(&format!(
            "<pre class=\"error\">{}</pre>\n",
            escape_html(error)
        ));
    }

    html.push_str("<table>\n<tr><th>Step</th><th>Status</th><th>Duration</th></tr>\n");
    for step in &scenario.steps {
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{} {}</td><td>{}</td><td>{} ms</td></tr>\n",
            step.status,
            escape_html(&step.keyword),
            escape_html(&step.text),
            step.status,
            step.duration_ms,
        ));
        if let Some(error) = &step.error {
            html.push_str(&format!(
                "<tr><td colspan=\"3\"><pre class=\"error\">{}</pre></td></tr>\n",
                escape_html(error)
            ));
        }
    }
    html.push_str("</table>\n");

    for attachment in &scenario.attachments {
        html.push_str(&render_attachment(attachment));
    }

    html.push_str("</section>\n");
    html
}

fn render_attachment(attachment: &Attachment) -> String {
    match &attachment.body {
        // markup attachments (trace links) embed as-is
        AttachmentBody::Text(body) if attachment.media_type == "text/html" => {
            format!("<div class=\"attachment\">{body}</div>\n")
        }
        AttachmentBody::Text(body) => {
            format!("<pre class=\"attachment\">{}</pre>\n", escape_html(body))
        }
        AttachmentBody::Base64(body) if attachment.media_type.starts_with("image/") => format!(
            "<img class=\"attachment\" alt=\"{}\" src=\"data:{};base64,{}\">\n",
            attachment.media_type, attachment.media_type, body,
        ),
        AttachmentBody::Base64(body) if attachment.media_type.starts_with("video/") => format!(
            "<video class=\"attachment\" controls src=\"data:{};base64,{}\"></video>\n",
            attachment.media_type, body,
        ),
        AttachmentBody::Base64(body) => format!(
            "<p class=\"attachment\">Attachment ({}, {} base64 chars)</p>\n",
            attachment.media_type,
            body.len(),
        ),
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
