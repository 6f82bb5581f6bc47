use crate::analytics::{AnalyticsPage, Card};
use crate::lifecycle::Notice;
use crate::management::TaskPage;
use crate::shell::Tab;
use std::fmt::Write;

pub fn render_tasks(page: &TaskPage) -> String {
    render_shell(Tab::Tasks, &page.notices, &tasks_body(page))
}

pub fn render_analytics(page: &AnalyticsPage) -> String {
    render_shell(Tab::Analytics, &page.notices, &analytics_body(page))
}

fn render_shell(active: Tab, notices: &[Notice], body: &str) -> String {
    let tabs: String = Tab::ALL
        .iter()
        .map(|tab| {
            let class = if *tab == active { "tab active" } else { "tab" };
            format!(
                r#"<a class="{class}" href="/?tab={}" role="tab" aria-selected="{}">{}</a>"#,
                tab.slug(),
                *tab == active,
                tab.title()
            )
        })
        .collect();

    let notices: String = notices
        .iter()
        .map(|notice| {
            let kind = match notice {
                Notice::Validation(_) => "validation",
                Notice::Error(_) => "error",
            };
            format!(
                r#"<div class="status" data-type="{kind}">{}</div>"#,
                escape(notice.message())
            )
        })
        .collect();

    SHELL_HTML
        .replace("{{TABS}}", &tabs)
        .replace("{{TITLE}}", active.title())
        .replace("{{SUBTITLE}}", active.subtitle())
        .replace("{{NOTICES}}", &notices)
        .replace("{{BODY}}", body)
}

fn tasks_body(page: &TaskPage) -> String {
    let form = &page.form;
    let mut html = String::new();

    let task_options: String = page
        .task_types
        .iter()
        .map(|name| option(name, name, *name == form.task_name))
        .collect();
    let roommate_options: String = page
        .roommates
        .iter()
        .map(|roommate| option(&roommate.id, &roommate.name, roommate.id == form.roommate_id))
        .collect();
    let date = form
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let _ = write!(
        html,
        r#"<form class="entry" method="post" action="/tasks">
  <label>Task
    <select name="task_name"><option value="">Select task</option>{task_options}</select>
  </label>
  <label>Date Completed
    <input type="date" name="date" value="{date}" />
  </label>
  <label>Done By
    <select name="roommate_id"><option value="">Select roommate</option>{roommate_options}</select>
  </label>
  <button class="btn-add" type="submit">Add Task</button>
</form>
<section class="add-row">
  <form method="post" action="/roommates">
    <label>Add New Roommate
      <span class="inline"><input name="name" placeholder="Roommate name" value="{}" /><button type="submit">+</button></span>
    </label>
  </form>
  <form method="post" action="/task-types">
    <label>Add New Task Type
      <span class="inline"><input name="name" placeholder="Task type" value="{}" /><button type="submit">+</button></span>
    </label>
  </form>
</section>
"#,
        escape(&form.new_roommate),
        escape(&form.new_task_type)
    );

    html.push_str(
        "<table>\n<thead><tr><th>Task Name</th><th>Date Completed</th><th>Completed By</th></tr></thead>\n<tbody>\n",
    );
    for row in &page.rows {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&row.name),
            escape(&row.date),
            escape(&row.completed_by)
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn analytics_body(page: &AnalyticsPage) -> String {
    let totals: Vec<(String, u64)> = page
        .totals
        .iter()
        .map(|total| (total.name.clone(), total.tasks))
        .collect();
    let monthly: Vec<(String, u64)> = page
        .monthly
        .iter()
        .map(|datum| (format!("{} · {}", datum.month, datum.name), datum.task_count))
        .collect();

    format!(
        r#"<section class="panel">
{}
{}
</section>
<section class="chart-card">
  <h2>Tasks Completed by Roommate</h2>
  {}
</section>
<section class="chart-card">
  <h2>Monthly Task Completion by Roommate</h2>
  {}
</section>
"#,
        summary_card("Most Active Roommate", &page.most_active),
        summary_card("Least Active Roommate", &page.least_active),
        bar_chart(&totals, "bar-total"),
        bar_chart(&monthly, "bar-monthly")
    )
}

fn summary_card(title: &str, card: &Card) -> String {
    let (value, detail) = match card {
        Card::Active { name, tasks } => (tasks.to_string(), escape(name)),
        Card::NoData => ("–".to_string(), "No data".to_string()),
    };
    format!(
        r#"<div class="stat"><span class="label">{title}</span><span class="value">{value}</span><span class="detail">{detail}</span></div>"#
    )
}

fn bar_chart(points: &[(String, u64)], class: &str) -> String {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 260.0;
    const PAD_X: f64 = 44.0;
    const PAD_BOTTOM: f64 = 34.0;
    const TOP: f64 = 24.0;
    const TICKS: u64 = 4;

    if points.is_empty() {
        return format!(
            r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img"><text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text></svg>"#
        );
    }

    let max = points.iter().map(|(_, value)| *value).max().unwrap_or(0);
    // whole-number gridlines
    let step = max.div_ceil(TICKS).max(1);
    let top_value = step * TICKS;
    let plot_height = HEIGHT - TOP - PAD_BOTTOM;
    let y = |value: u64| HEIGHT - PAD_BOTTOM - value as f64 / top_value as f64 * plot_height;
    let slot = (WIDTH - PAD_X * 2.0) / points.len() as f64;
    let bar_width = slot * 0.6;

    let mut svg = format!(r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img">"#);
    for tick in 0..=TICKS {
        let value = step * tick;
        let y_pos = y(value);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PAD_X}" y1="{y_pos:.2}" x2="{}" y2="{y_pos:.2}" /><text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{value}</text>"#,
            WIDTH - PAD_X,
            PAD_X - 10.0,
            y_pos + 4.0
        );
    }
    for (index, (label, value)) in points.iter().enumerate() {
        let x = PAD_X + slot * index as f64 + (slot - bar_width) / 2.0;
        let top = y(*value);
        let _ = write!(
            svg,
            r#"<rect class="{class}" x="{x:.2}" y="{top:.2}" width="{bar_width:.2}" height="{:.2}"><title>{}: {value}</title></rect><text class="chart-label" x="{:.2}" y="{}" text-anchor="middle">{}</text>"#,
            HEIGHT - PAD_BOTTOM - top,
            escape(label),
            x + bar_width / 2.0,
            HEIGHT - PAD_BOTTOM + 18.0,
            escape(label)
        );
    }
    svg.push_str("</svg>");
    svg
}

fn option(value: &str, label: &str, selected: bool) -> String {
    let selected = if selected { " selected" } else { "" };
    format!(
        r#"<option value="{}"{selected}>{}</option>"#,
        escape(value),
        escape(label)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const SHELL_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Chore Board · {{TITLE}}</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #7ebf8e;
      --accent-2: #2f4858;
      --warn: #ff6b6b;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
    }

    nav.tabs {
      display: flex;
      justify-content: space-around;
      background: #374151;
      padding: 18px;
    }

    .tab {
      color: #d1d5db;
      text-decoration: none;
      font-weight: 600;
      padding: 8px 14px;
      border-radius: 999px;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
    }

    main {
      width: min(1080px, 100%);
      margin: 0 auto;
      padding: 32px 18px 48px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: 1.9rem;
      font-weight: 500;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    .entry, .add-row {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      font-weight: 500;
    }

    .inline {
      display: flex;
      gap: 8px;
    }

    input, select {
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font: inherit;
      width: 100%;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: var(--card);
      border-radius: 12px;
      box-shadow: var(--shadow);
    }

    th, td {
      text-align: left;
      padding: 12px 16px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .stat, .chart-card {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .chart-card h2 {
      margin: 0;
      font-size: 1.2rem;
    }

    .chart {
      width: 100%;
      height: 260px;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .bar-total {
      fill: #8884d8;
    }

    .bar-monthly {
      fill: #82ca9d;
    }

    .status {
      padding: 10px 14px;
      border-radius: 10px;
      background: #fdecea;
      color: #c63b2b;
    }

    .status[data-type="validation"] {
      background: #fff4e5;
      color: #8a5300;
    }
  </style>
</head>
<body>
  <nav class="tabs" role="tablist">{{TABS}}</nav>
  <main>
    <header>
      <h1>{{TITLE}}</h1>
      <p class="subtitle">{{SUBTITLE}}</p>
    </header>
    {{NOTICES}}
    {{BODY}}
  </main>
</body>
</html>
"#;
