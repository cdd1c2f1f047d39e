use crate::insight::InsightStatus;
use crate::models::{Category, DashboardResponse, Source, SourceDashboard};
use crate::seed::category_color;
use crate::state::Workspace;
use std::fmt::Write;

pub fn render_login() -> String {
    page("EstatePulse", LOGIN_BODY)
}

pub fn render_index(
    user: &str,
    today: &str,
    dashboard: &DashboardResponse,
    workspace: &Workspace,
    insight: &InsightStatus,
) -> String {
    let body = INDEX_BODY
        .replace("{{USER}}", &escape_html(user))
        .replace("{{ENTRY_COUNT}}", &dashboard.entry_count.to_string())
        .replace("{{OWNER}}", &source_section(&dashboard.owner))
        .replace("{{BROKER}}", &source_section(&dashboard.broker))
        .replace("{{PORTFOLIO}}", &portfolio_cards(dashboard))
        .replace("{{DRAFT}}", &draft_rows(workspace))
        .replace("{{TODAY}}", today)
        .replace("{{SOURCES}}", &source_options())
        .replace("{{HISTORY}}", &history_rows(workspace))
        .replace("{{INSIGHT}}", &insight_panel(insight));
    page("EstatePulse Dashboard", &body)
}

fn page(title: &str, body: &str) -> String {
    PAGE_HTML.replace("{{TITLE}}", title).replace("{{BODY}}", body)
}

fn source_section(section: &SourceDashboard) -> String {
    let max = section
        .totals
        .iter()
        .map(|total| total.count)
        .max()
        .unwrap_or(0)
        .max(1);

    let mut bars = String::new();
    for total in &section.totals {
        let width = total.count.saturating_mul(100) / max;
        let _ = write!(
            bars,
            r#"<div class="bar-row"><span class="bar-label">{label}</span><span class="bar" style="width:{width}%;background:{color}"></span><span class="bar-value">{count}</span></div>"#,
            label = total.category,
            color = total.color,
            count = total.count,
        );
    }

    let mut daily = String::from("<tr><th>Date</th>");
    for category in Category::ALL {
        let _ = write!(daily, "<th>{category}</th>");
    }
    daily.push_str("</tr>");
    if section.daily.is_empty() {
        let _ = write!(
            daily,
            r#"<tr><td colspan="{}" class="muted">No activity logged.</td></tr>"#,
            Category::COUNT + 1
        );
    }
    for row in &section.daily {
        let _ = write!(daily, "<tr><td>{}</td>", row.date);
        for (_, count) in row.totals.iter() {
            let _ = write!(daily, "<td>{count}</td>");
        }
        daily.push_str("</tr>");
    }

    format!(
        r#"<section class="card"><h2>{source} inventory <span class="pill">{grand}</span></h2><div class="bars">{bars}</div><h3>Daily trend</h3><div class="scroll"><table>{daily}</table></div></section>"#,
        source = section.source,
        grand = section.grand_total,
    )
}

fn portfolio_cards(dashboard: &DashboardResponse) -> String {
    let mut cards = String::new();
    for (category, total) in dashboard.totals_by_category.iter() {
        let _ = write!(
            cards,
            r#"<div class="tile" style="border-color:{color}"><span class="muted">{category}</span><strong>{total}</strong></div>"#,
            color = category_color(category),
        );
    }
    cards
}

fn draft_rows(workspace: &Workspace) -> String {
    let mut rows = String::new();
    for (category, count) in workspace.draft.counts().iter() {
        let label = category.label();
        let _ = write!(
            rows,
            r#"<div class="draft-row"><span>{label}</span>
<form method="post" action="/draft/adjust"><input type="hidden" name="category" value="{label}"><input type="hidden" name="delta" value="-1"><button class="ghost" {disabled}>-</button></form>
<form method="post" action="/draft/set"><input type="hidden" name="category" value="{label}"><input type="number" name="count" min="0" value="{count}" aria-label="{label}"></form>
<form method="post" action="/draft/adjust"><input type="hidden" name="category" value="{label}"><input type="hidden" name="delta" value="1"><button class="ghost">+</button></form></div>"#,
            disabled = if *count == 0 { "disabled" } else { "" },
        );
    }
    rows
}

fn history_rows(workspace: &Workspace) -> String {
    let logs = workspace.logs.logs();
    if logs.is_empty() {
        return r#"<tr><td colspan="5" class="muted">No entries.</td></tr>"#.to_string();
    }
    let mut rows = String::new();
    for log in logs {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            log.date,
            log.category,
            log.source,
            log.count,
            escape_html(&log.recorded_by),
        );
    }
    rows
}

fn insight_panel(insight: &InsightStatus) -> String {
    let (text, disabled) = match insight {
        InsightStatus::Idle => (
            "Generate a summary of the current portfolio.".to_string(),
            "",
        ),
        InsightStatus::Pending => ("Analyzing portfolio...".to_string(), "disabled"),
        InsightStatus::Ready { text, generated_at } => (
            format!(
                r#"{}<br><span class="muted">Generated {}</span>"#,
                escape_html(text),
                escape_html(generated_at)
            ),
            "",
        ),
    };
    format!(
        r#"<p>{text}</p><form method="post" action="/insights"><button {disabled}>AI Strategy</button></form>"#
    )
}

fn source_options() -> String {
    Source::ALL
        .iter()
        .map(|source| format!(r#"<option value="{source}">{source}</option>"#))
        .collect()
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // keeps user text from forming template placeholders
            '{' => out.push_str("&#123;"),
            _ => out.push(ch),
        }
    }
    out
}

const LOGIN_BODY: &str = r#"<main class="login card">
  <h1>EstatePulse</h1>
  <p class="muted">Professional Inventory Hub</p>
  <form method="post" action="/login">
    <label for="name">Team Identity</label>
    <input id="name" name="name" type="text" placeholder="Full Name" required />
    <button type="submit">Access Dashboard</button>
  </form>
  <p class="muted small">Data is stored locally on this device.</p>
</main>"#;

const INDEX_BODY: &str = r#"<header class="top">
  <div>
    <h1>EstatePulse</h1>
    <p class="muted">{{ENTRY_COUNT}} entries logged</p>
  </div>
  <div class="actions">
    <a class="button ghost" href="/api/export.csv">Excel Export</a>
    <span class="pill">{{USER}}</span>
    <form method="post" action="/logout"><button class="ghost">Log out</button></form>
  </div>
</header>
<div class="grid">
  {{OWNER}}
  {{BROKER}}
</div>
<section class="card">
  <h2>Portfolio totals</h2>
  <div class="tiles">{{PORTFOLIO}}</div>
</section>
<section class="card">
  <h2>Log New Report</h2>
  <div class="draft">{{DRAFT}}</div>
  <form method="post" action="/draft/submit" class="submit-row">
    <input type="date" name="date" value="{{TODAY}}" />
    <select name="source">{{SOURCES}}</select>
    <button type="submit">Save report</button>
  </form>
</section>
<section class="card" id="insights">
  <h2>AI Strategy</h2>
  {{INSIGHT}}
</section>
<section class="card">
  <h2>Audit Log</h2>
  <div class="scroll"><table>
    <tr><th>Date</th><th>Category</th><th>Source</th><th>Count</th><th>Recorded by</th></tr>
    {{HISTORY}}
  </table></div>
  <form method="post" action="/logs/reset" class="submit-row">
    <label><input type="checkbox" name="confirm" value="yes" required /> I understand this cannot be undone</label>
    <button class="danger">Clear All Records</button>
  </form>
</section>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f8fafc;
      --ink: #0f172a;
      --muted: #64748b;
      --accent: #2563eb;
      --danger: #e11d48;
      --card: #ffffff;
      --line: #e2e8f0;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 28px 18px 48px;
      display: grid;
      gap: 20px;
      max-width: 1200px;
      margin-inline: auto;
    }

    h1, h2, h3 {
      margin: 0 0 12px;
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 20px;
      padding: 24px;
    }

    .login {
      max-width: 420px;
      margin: 10vh auto;
      display: grid;
      gap: 12px;
    }

    .top, .actions, .submit-row, .draft-row, .bar-row {
      display: flex;
      align-items: center;
      gap: 12px;
    }

    .top {
      justify-content: space-between;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 20px;
    }

    .bar-label {
      width: 130px;
      font-size: 0.85rem;
    }

    .bar {
      height: 14px;
      border-radius: 0 8px 8px 0;
      min-width: 2px;
    }

    .bar-value {
      font-weight: 600;
    }

    .tiles, .draft {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(170px, 1fr));
      gap: 12px;
    }

    .tile {
      border-left: 6px solid;
      padding: 12px;
      display: grid;
      gap: 4px;
    }

    .draft-row input[type="number"] {
      width: 5em;
      text-align: center;
    }

    .draft-row {
      justify-content: space-between;
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 8px 12px;
    }

    .scroll {
      overflow-x: auto;
    }

    table {
      border-collapse: collapse;
      width: 100%;
      font-size: 0.85rem;
    }

    th, td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid var(--line);
    }

    .muted {
      color: var(--muted);
    }

    .small {
      font-size: 0.75rem;
    }

    .pill {
      background: var(--ink);
      color: #fff;
      border-radius: 999px;
      padding: 2px 10px;
      font-size: 0.8rem;
    }

    input, select {
      padding: 10px 12px;
      border: 2px solid var(--line);
      border-radius: 12px;
      font: inherit;
    }

    button, .button {
      border: none;
      border-radius: 12px;
      padding: 10px 16px;
      font: inherit;
      font-weight: 600;
      background: var(--accent);
      color: #fff;
      cursor: pointer;
      text-decoration: none;
    }

    button:disabled {
      opacity: 0.4;
      cursor: not-allowed;
    }

    .ghost {
      background: transparent;
      color: var(--ink);
      border: 1px solid var(--line);
    }

    .danger {
      background: var(--danger);
    }
  </style>
</head>
<body>
{{BODY}}
</body>
</html>
"#;
