use super::templates::escape;
use crate::codec::{data_uri, detect_image_mime};
use crate::models::{DetectionResult, Panel, PanelOutcome, ScrewDetection};
use std::fmt::Write as _;

/// Table kinds rendered inside a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Details,
    Text,
    Screw,
}

impl TableKind {
    fn as_str(self) -> &'static str {
        match self {
            TableKind::Details => "details",
            TableKind::Text => "text",
            TableKind::Screw => "screw",
        }
    }
}

/// Element id of a table. Unique per upload, kind and panel so tables never
/// share identity (or sort state) across panels.
pub fn table_id(panel: &Panel, kind: TableKind) -> String {
    format!("{}_{}_{}", panel.upload.id, kind.as_str(), panel.index + 1)
}

/// Render one panel: the upload, result images, then the mode's tables.
pub fn render_panel(panel: &Panel) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<section class="panel" id="panel-{}" data-upload="{}">"#,
        panel.index + 1,
        panel.upload.id
    );

    // Preview type comes from the bytes; the declared type is client input.
    push_figure(
        &mut html,
        &data_uri(detect_image_mime(&panel.upload.bytes), &panel.upload.bytes),
        &panel.upload.file_name,
    );

    match &panel.outcome {
        PanelOutcome::Ready(result) => push_result(&mut html, panel, result),
        PanelOutcome::Failed(message) => {
            let _ = write!(
                html,
                r#"<div class="error">Analysis failed: {}</div>"#,
                escape(message)
            );
        }
    }

    html.push_str("</section>");
    html
}

fn push_result(html: &mut String, panel: &Panel, result: &DetectionResult) {
    if let Some(image) = &result.primary_image {
        push_figure(html, &image.to_data_uri(), "Detections Visualization");
    }
    if let Some(image) = result.secondary_image() {
        push_figure(html, &image.to_data_uri(), "Detections Visualization");
    }

    let rows = result.identity_rows();
    if !rows.is_empty() {
        let _ = write!(
            html,
            r#"<table class="label-value" id="{}"><tbody>"#,
            table_id(panel, TableKind::Details)
        );
        for (label, value) in rows {
            let _ = write!(
                html,
                "<tr><td>{}:</td><td>{}</td></tr>",
                escape(label),
                escape(value)
            );
        }
        html.push_str("</tbody></table>");
    }

    let texts = result.texts();
    if !texts.is_empty() {
        html.push_str("<p>Texts:</p>");
        push_sortable(
            html,
            &table_id(panel, TableKind::Text),
            &["Text"],
            texts.iter().map(|t| vec![t.as_str()]),
        );
    }

    let screws = result.screws();
    if !screws.is_empty() {
        html.push_str("<p>Screws:</p>");
        push_sortable(
            html,
            &table_id(panel, TableKind::Screw),
            &["Angle", "Screw Number"],
            screws
                .iter()
                .map(|ScrewDetection { angle, id }| vec![angle.as_str(), id.as_str()]),
        );
    }

    let raw = serde_json::to_string_pretty(&strip_images(&result.raw))
        .unwrap_or_else(|_| result.raw.to_string());
    let _ = write!(
        html,
        "<details><summary>Result</summary><pre>{}</pre></details>",
        escape(&raw)
    );
}

fn push_figure(html: &mut String, src: &str, caption: &str) {
    let _ = write!(
        html,
        r#"<figure><img src="{}" alt="{}"><figcaption>{}</figcaption></figure>"#,
        escape(src),
        escape(caption),
        escape(caption)
    );
}

fn push_sortable<'a, I>(html: &mut String, id: &str, headers: &[&str], rows: I)
where
    I: Iterator<Item = Vec<&'a str>>,
{
    let _ = write!(html, r#"<table id="{}" data-sortable><thead><tr>"#, id);
    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape(header));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
}

/// The raw view elides base64 payloads; the images are already shown above.
fn strip_images(raw: &serde_json::Value) -> serde_json::Value {
    let mut raw = raw.clone();
    if let Some(fields) = raw.as_object_mut() {
        for key in ["image", "image_em"] {
            if let Some(value) = fields.get_mut(key) {
                if let Some(s) = value.as_str() {
                    *value = serde_json::Value::String(format!("<{} base64 chars>", s.len()));
                }
            }
        }
    }
    raw
}
