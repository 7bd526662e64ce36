// Static HTML snapshot of the dashboard
use crate::domain::dashboard::{Cards, TableRow};
use crate::domain::format::escape_markup;
use crate::domain::logs::LogLine;
use anyhow::Context;
use std::fmt::Write as _;
use std::path::Path;

const STYLE: &str = "body{background:#0f172a;color:#e2e8f0;font-family:Inter,sans-serif;margin:2rem}\
.cards{display:flex;gap:1rem}.card{background:#1e293b;border-radius:8px;padding:1rem 1.5rem}\
.value{font-size:2rem;font-weight:700}.unit{font-size:.9rem;color:#94a3b8}\
table{border-collapse:collapse;margin-top:1.5rem}td,th{padding:.3rem .8rem;text-align:right}\
#log-viewer{background:#020617;padding:1rem;margin-top:1.5rem;font-family:monospace}\
.log-line{display:block}.log-error{color:#f87171}.log-warning{color:#fbbf24}.log-info{color:#cbd5e1}";

pub struct Snapshot<'a> {
    pub generated_at: String,
    pub badge: Option<String>,
    pub cards: &'a Cards,
    pub table: &'a [TableRow],
    pub logs: &'a [LogLine],
}

impl Snapshot<'_> {
    pub fn render(&self) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>NetChecker snapshot</title>\n<style>{}</style>\n</head>\n<body>\n",
            STYLE
        );
        let _ = writeln!(
            html,
            "<h1>NetChecker</h1>\n<p class=\"unit\">Snapshot taken {}</p>",
            escape_markup(&self.generated_at)
        );
        if let Some(badge) = &self.badge {
            let _ = writeln!(html, "<p class=\"unit\">{}</p>", escape_markup(badge));
        }

        html.push_str("<div class=\"cards\">\n");
        for card in self.cards.iter() {
            let _ = writeln!(
                html,
                "<div class=\"card\"><div>{}</div><div class=\"value\">{} <span class=\"unit\">{}</span></div></div>",
                card.title,
                escape_markup(&card.value),
                card.unit
            );
        }
        html.push_str("</div>\n");

        html.push_str("<table>\n<tr><th>Time</th><th>Download</th><th>Upload</th><th>Ping</th></tr>\n");
        if self.table.is_empty() {
            html.push_str("<tr><td colspan=\"4\">No data</td></tr>\n");
        }
        for row in self.table {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_markup(&row.time),
                escape_markup(&row.download),
                escape_markup(&row.upload),
                escape_markup(&row.ping)
            );
        }
        html.push_str("</table>\n");

        html.push_str("<div id=\"log-viewer\">");
        for line in self.logs {
            let _ = write!(
                html,
                "<span class=\"log-line {}\">{}</span>",
                line.level.css_class(),
                escape_markup(&line.text)
            );
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.render())
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))
    }
}
