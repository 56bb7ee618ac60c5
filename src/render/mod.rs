//! HTML rendering for the login page, the console and its result panels.

pub mod panel;
pub mod templates;

pub use panel::{render_panel, table_id, TableKind};

use crate::models::{DetectionMode, Panel};
use templates::escape;

pub const PAGE_TITLE: &str = "Watches project";

/// What the console page shows after a request.
#[derive(Debug, Default)]
pub struct ConsoleView {
    pub selected: Option<DetectionMode>,
    pub panels: Vec<Panel>,
    pub notice: Option<String>,
}

fn page(body: &str) -> String {
    templates::render(templates::LAYOUT, &[("title", PAGE_TITLE), ("body", body)])
}

/// Login form, optionally with the rejection warning and the email typed so
/// far.
pub fn render_login(warning: Option<&str>, email: &str) -> String {
    let warning = warning
        .map(|w| format!(r#"<div class="warning">{}</div>"#, escape(w)))
        .unwrap_or_default();
    let email = escape(email);
    let body = templates::render(
        templates::LOGIN,
        &[("email", email.as_str()), ("warning", warning.as_str())],
    );
    page(&body)
}

pub fn render_console(view: &ConsoleView) -> String {
    let selected = view.selected.unwrap_or(DetectionMode::Text);
    let mode_options: String = DetectionMode::ALL
        .into_iter()
        .map(|mode| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                mode.path(),
                if mode == selected { " selected" } else { "" },
                escape(mode.path())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut panels = String::new();
    if let Some(notice) = &view.notice {
        panels.push_str(&format!(r#"<div class="warning">{}</div>"#, escape(notice)));
    }
    if !view.panels.is_empty() {
        panels.push_str(r#"<div class="panels">"#);
        for panel in &view.panels {
            panels.push_str(&render_panel(panel));
        }
        panels.push_str("</div>");
    }

    let main_class = if view.panels.len() > 1 {
        "main wide"
    } else {
        "main"
    };

    let body = templates::render(
        templates::CONSOLE,
        &[
            ("mode_options", mode_options.as_str()),
            ("main_class", main_class),
            ("panels", panels.as_str()),
        ],
    );
    page(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PanelOutcome, UploadedImage};

    fn failed_panel(index: usize) -> Panel {
        Panel {
            index,
            upload: UploadedImage::new(format!("{index}.png"), "image/png".into(), vec![1]),
            outcome: PanelOutcome::Failed("boom".into()),
        }
    }

    #[test]
    fn test_login_page() {
        let html = render_login(None, "");
        assert!(html.contains("<title>Watches project</title>"));
        assert!(html.contains(r#"action="/login""#));
        assert!(!html.contains("class=\"warning\""));

        let html = render_login(Some("Email or password are incorrect."), "a\"b@x");
        assert!(html.contains("Email or password are incorrect."));
        assert!(html.contains("value=\"a&quot;b@x\""));
    }

    #[test]
    fn test_console_lists_every_mode_and_selects_one() {
        let html = render_console(&ConsoleView {
            selected: Some(DetectionMode::CartierTool),
            ..Default::default()
        });

        for mode in DetectionMode::ALL {
            assert!(html.contains(&format!("value=\"{}\"", mode.path())));
        }
        assert!(html.contains(r#"<option value="/cartier-tool" selected>"#));
        assert!(!html.contains(r#"class="panels""#));
    }

    #[test]
    fn test_console_renders_panels_in_order_and_widens() {
        let view = ConsoleView {
            selected: Some(DetectionMode::Text),
            panels: vec![failed_panel(0), failed_panel(1)],
            notice: None,
        };

        let html = render_console(&view);
        let first = html.find("id=\"panel-1\"").unwrap();
        let second = html.find("id=\"panel-2\"").unwrap();
        assert!(first < second);
        assert!(html.contains(r#"class="main wide""#));

        let single = render_console(&ConsoleView {
            panels: vec![failed_panel(0)],
            ..Default::default()
        });
        assert!(single.contains(r#"class="main""#));
    }

    #[test]
    fn test_console_notice() {
        let html = render_console(&ConsoleView {
            notice: Some("Upload at least one image.".into()),
            ..Default::default()
        });
        assert!(html.contains("Upload at least one image."));
    }
}
