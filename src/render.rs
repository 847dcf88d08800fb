use anyhow::{Context, Result};
use handlebars::Handlebars;

use crate::report::{Severity, Verdict};

const CHECK_PAGE: &str = r#"<html>
<head><title>Rancher {{title}}</title></head>
<body>
<b>{{level}}:</b> {{alarm}}<br>
<small>checked {{checked_at}}</small>
</body>
</html>
"#;

/// The plugin result line, e.g. `CRITICAL: app/db in env Default is unhealthy`.
pub fn render_text(verdict: &Verdict) -> String {
    let alarm = verdict.alarm();
    match verdict.severity {
        Severity::Ok if alarm.is_empty() => "OK".to_string(),
        Severity::Unknown => format!("UNKNOWN ({}): {}", verdict.exit_code(), alarm),
        severity => format!("{}: {}", severity, alarm),
    }
}

pub fn page_templates() -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars
        .register_template_string("check", CHECK_PAGE)
        .context("Failed to register check page template")?;
    Ok(handlebars)
}

/// HTML page for one check; the alarm text is escaped.
pub fn render_html(templates: &Handlebars<'_>, title: &str, verdict: &Verdict) -> Result<String> {
    let data = serde_json::json!({
        "title": title,
        "level": verdict.severity.label(),
        "alarm": verdict.alarm(),
        "checked_at": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    });
    templates
        .render("check", &data)
        .context("Failed to render check page")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(severity: Severity, message: &str) -> Verdict {
        Verdict {
            severity,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render_text(&Verdict::new()), "OK");
        assert_eq!(render_text(&verdict(Severity::Ok, " no hosts in scope")), "OK: no hosts in scope");
        assert_eq!(
            render_text(&verdict(Severity::Warning, "docker02 is inactive  3 of 5 hosts available")),
            "WARNING: docker02 is inactive  3 of 5 hosts available"
        );
        assert_eq!(
            render_text(&verdict(Severity::Critical, "app/db in env Default is unhealthy ")),
            "CRITICAL: app/db in env Default is unhealthy"
        );
        assert_eq!(
            render_text(&Verdict::unknown("hosts unavailable")),
            "UNKNOWN (3): hosts unavailable"
        );
    }

    #[test]
    fn test_render_html_page() {
        let templates = page_templates().unwrap();
        let page = render_html(&templates, "stacks", &verdict(Severity::Critical, "app in env Default (active/degraded) ")).unwrap();

        assert!(page.contains("<title>Rancher stacks</title>"));
        assert!(page.contains("<b>CRITICAL:</b> app in env Default (active/degraded)<br>"));
        assert!(page.contains("checked "));
    }

    #[test]
    fn test_render_html_escapes_alarm() {
        let templates = page_templates().unwrap();
        let page = render_html(&templates, "services", &verdict(Severity::Critical, "<script>x</script>/svc is unhealthy")).unwrap();

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
