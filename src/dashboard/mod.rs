//! Dashboard shell
//!
//! Server-rendered pages. Chart data is embedded as JSON and drawn by the
//! inline page script. All KPI and user text goes through `escape`.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::charts::{self, ChartSpec};
use crate::error::DashboardError;
use crate::history::ChatTurn;
use crate::models::{Domain, KpiLoadStatus};
use crate::orchestrator::LeadOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Chat,
    Analytics(Domain),
    Settings,
}

impl Page {
    pub const NAV: [Page; 6] = [
        Page::Overview,
        Page::Chat,
        Page::Analytics(Domain::Sales),
        Page::Analytics(Domain::Hr),
        Page::Analytics(Domain::Finance),
        Page::Settings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Chat => "chat",
            Page::Analytics(domain) => domain.as_str(),
            Page::Settings => "settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Executive Dashboard",
            Page::Chat => "AI Business Analyst",
            Page::Analytics(Domain::Sales) => "Sales Analytics",
            Page::Analytics(Domain::Hr) => "HR Analytics",
            Page::Analytics(Domain::Finance) => "Finance Analytics",
            Page::Settings => "Settings",
        }
    }
}

impl FromStr for Page {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "overview" => Ok(Page::Overview),
            "chat" => Ok(Page::Chat),
            "settings" => Ok(Page::Settings),
            other => other
                .parse::<Domain>()
                .map(Page::Analytics)
                .map_err(|_| DashboardError::UnknownPage(other.to_string())),
        }
    }
}

/// Everything a page needs that is computed outside the renderer
pub struct PageContext<'a> {
    pub orchestrator: &'a LeadOrchestrator,
    pub masked_key: String,
    /// Overview only
    pub executive_summary: Option<String>,
    /// Chat only
    pub session_id: Option<String>,
    pub chat_turns: Vec<ChatTurn>,
}

pub fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

pub fn render_page(page: Page, ctx: &PageContext<'_>) -> String {
    let body = match page {
        Page::Overview => overview_body(ctx),
        Page::Chat => chat_body(ctx),
        Page::Analytics(domain) => analytics_body(domain, ctx),
        Page::Settings => settings_body(ctx),
    };
    layout(page, ctx, &body)
}

fn layout(page: Page, ctx: &PageContext<'_>, body: &str) -> String {
    let mut nav = String::new();
    for item in Page::NAV {
        let class = if item == page { " class=\"active\"" } else { "" };
        let _ = write!(
            nav,
            "<li><a href=\"/pages/{}\"{}>{}</a></li>",
            item.slug(),
            class,
            item.title()
        );
    }

    let banner = if ctx.orchestrator.ai_enabled() {
        String::new()
    } else {
        "<div class=\"banner error\"><strong>Google API key not found.</strong> \
         Add <code>GOOGLE_API_KEY=your-api-key</code> to <code>.env</code> and restart. \
         Charts still work; AI answers are disabled.</div>"
            .to_string()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · AI Business Intelligence Dashboard</title>
<style>{css}</style>
</head>
<body>
<aside>
<h1>Navigation</h1>
<ul>{nav}</ul>
<h2>Key Metrics</h2>
{metrics}
</aside>
<main>
<header><div class="main-header">AI-Powered Business Intelligence Dashboard</div></header>
{banner}
<h1>{title}</h1>
{body}
</main>
<script>{script}</script>
</body>
</html>"#,
        title = page.title(),
        css = STYLE,
        nav = nav,
        metrics = sidebar_metrics(ctx.orchestrator),
        banner = banner,
        body = body,
        script = SCRIPT,
    )
}

fn sidebar_metrics(orchestrator: &LeadOrchestrator) -> String {
    let kpis = orchestrator.kpis();
    if !Domain::ALL.iter().all(|d| kpis.is_loaded(*d)) {
        return "<p class=\"warning\">Data files not found. Please run the ETL pipeline first.</p>"
            .to_string();
    }

    let metric = |label: &str, value: String| {
        format!("<div class=\"metric\"><span>{}</span><b>{}</b></div>", label, escape(&value))
    };

    let revenue = kpis.record(Domain::Sales).metric_f64("total_revenue").unwrap_or(0.0);
    let employees = kpis.record(Domain::Hr).metric_f64("total_employees").unwrap_or(0.0);
    let health = kpis
        .record(Domain::Finance)
        .metric_f64("financial_health_score")
        .unwrap_or(0.0);

    [
        metric("Total Revenue", charts::format_value(revenue, charts::ValueFormat::Money { decimals: 0 })),
        metric("Employees", charts::format_value(employees, charts::ValueFormat::Integer)),
        metric("Health Score", charts::format_value(health, charts::ValueFormat::Score)),
    ]
    .concat()
}

fn overview_body(ctx: &PageContext<'_>) -> String {
    let summary = ctx
        .executive_summary
        .as_deref()
        .unwrap_or("Executive summary unavailable.");

    format!(
        "<h2>Executive Summary</h2><div class=\"agent-response\">{}</div>\
         <h2>Performance Overview</h2>{}",
        escape(summary),
        chart_grid(&charts::overview_charts(ctx.orchestrator.kpis())),
    )
}

fn chat_body(ctx: &PageContext<'_>) -> String {
    let mut out = String::from(
        "<p class=\"info\"><b>Tip:</b> Ask about sales, HR or finance. \
         Your question is routed to the matching specialist agent.</p>\
         <form id=\"chat-form\"><input id=\"chat-input\" name=\"query\" \
         placeholder=\"e.g., What is our attrition rate?\" autocomplete=\"off\">\
         <button type=\"submit\">Ask AI</button>\
         <button type=\"button\" id=\"chat-clear\">Clear History</button></form>",
    );

    if let Some(session_id) = &ctx.session_id {
        let _ = write!(
            out,
            "<input type=\"hidden\" id=\"session-id\" value=\"{}\">",
            escape(session_id)
        );
    }

    if !ctx.chat_turns.is_empty() {
        out.push_str("<h2>Conversation History</h2>");
    }

    for turn in ctx.chat_turns.iter().rev() {
        let class = if turn.success { "chat-ai" } else { "chat-ai error" };
        let _ = write!(
            out,
            "<div class=\"chat-message chat-user\"><strong>You</strong><p>{}</p></div>\
             <div class=\"chat-message {}\"><strong>AI Analyst ({})</strong>\
             <div class=\"response\">{}</div></div>",
            escape(&turn.query),
            class,
            turn.routed_to.label(),
            escape(&turn.response),
        );
    }

    out
}

fn analytics_body(domain: Domain, ctx: &PageContext<'_>) -> String {
    let kpis = ctx.orchestrator.kpis();
    let record = kpis.record(domain);
    let agent = ctx.orchestrator.domain_agent(domain);

    let mut out = String::new();

    match kpis.status(domain) {
        KpiLoadStatus::Loaded => {}
        KpiLoadStatus::Missing => {
            let _ = write!(
                out,
                "<div class=\"banner warning\">No {} KPI file found. Charts show placeholders.</div>",
                domain.label()
            );
        }
        KpiLoadStatus::Invalid(reason) => {
            let _ = write!(
                out,
                "<div class=\"banner warning\">The {} KPI file could not be read: {}</div>",
                domain.label(),
                escape(reason)
            );
        }
    }

    out.push_str(&chart_grid(&charts::domain_charts(domain, record)));

    out.push_str("<h2>AI-Generated Insights</h2><div class=\"analyses\">");
    for analysis in agent.analyses() {
        let _ = write!(
            out,
            "<button class=\"analysis\" data-url=\"/api/agents/{}/analyses/{}\">{}</button>",
            domain.as_str(),
            analysis.slug,
            analysis.title
        );
    }
    out.push_str("</div><div id=\"analysis-result\" class=\"agent-response\" hidden></div>");

    out.push_str("<h2>Key Insights</h2>");
    out.push_str(&list(&record.insights, "No insights available."));

    if domain != Domain::Sales {
        out.push_str("<h2>Recommendations</h2>");
        out.push_str(&list(&record.recommendations, "No recommendations available."));
    }

    out
}

fn settings_body(ctx: &PageContext<'_>) -> String {
    let orchestrator = ctx.orchestrator;
    let mut out = format!(
        "<h2>Google AI API Configuration</h2><p class=\"info\">Current API Key: <code>{}</code></p>\
         <p>Set <code>GOOGLE_API_KEY</code> in <code>.env</code> and restart to change it.</p>\
         <h2>Agent Status</h2><table><tr><th>Agent</th><th>ID</th><th>Status</th></tr>",
        escape(&ctx.masked_key)
    );

    for status in orchestrator.agent_statuses() {
        let state = if status.data_loaded {
            "<span class=\"ok\">Active</span>"
        } else {
            "<span class=\"err\">No data</span>"
        };
        let _ = write!(
            out,
            "<tr><td>{} Agent</td><td><code>{}</code></td><td>{}</td></tr>",
            status.agent_type.label(),
            status.agent_id,
            state
        );
    }

    let _ = write!(
        out,
        "</table><h2>System Information</h2><ul>\
         <li><b>AI Model:</b> {}</li>\
         <li><b>KPI Directory:</b> <code>{}</code></li>\
         <li><b>Agents:</b> Sales, HR, Finance, General + Lead Orchestrator</li></ul>",
        escape(orchestrator.model().unwrap_or("disabled")),
        escape(&orchestrator.kpis().data_dir().display().to_string()),
    );

    out
}

fn chart_grid(charts: &[ChartSpec]) -> String {
    // `<` is escaped so a label cannot close the script element
    let json = serde_json::to_string(charts)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c");

    let mut out = String::from("<div class=\"charts\">");
    for chart in charts {
        let _ = write!(
            out,
            "<figure class=\"chart{}\" id=\"chart-{}\"><figcaption>{}</figcaption></figure>",
            if chart.placeholder { " placeholder" } else { "" },
            chart.id,
            escape(&chart.title)
        );
    }
    let _ = write!(
        out,
        "</div><script type=\"application/json\" class=\"chart-data\">{}</script>",
        json
    );
    out
}

fn list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!("<p class=\"muted\">{}</p>", empty);
    }
    let mut out = String::from("<ul class=\"insights\">");
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>");
    out
}

const STYLE: &str = r#"
* { font-family: 'Inter', -apple-system, 'Segoe UI', sans-serif; box-sizing: border-box; }
body { margin: 0; display: flex; color: #1e293b; background: #fff; }
aside { width: 260px; min-height: 100vh; padding: 1.5rem; background: #f8fafc; border-right: 2px solid #e2e8f0; }
aside ul { list-style: none; padding: 0; }
aside li a { display: block; padding: .4rem .6rem; color: #334155; text-decoration: none; border-radius: 6px; }
aside li a.active { background: #dbeafe; color: #1e40af; font-weight: 600; }
main { flex: 1; padding: 2rem; max-width: 1400px; }
h1, h2 { color: #1e40af; }
h2 { border-bottom: 3px solid #3b82f6; padding-bottom: .4rem; }
.main-header { font-size: 2rem; font-weight: 800; color: #2563eb; }
.metric { background: #fff; border: 1px solid #e2e8f0; border-radius: 8px; padding: .6rem; margin-bottom: .5rem; }
.metric span { display: block; font-size: .75rem; text-transform: uppercase; color: #475569; }
.banner { padding: 1rem; border-radius: 8px; margin: 1rem 0; }
.banner.error, .chat-ai.error { background: #fee2e2; border-left: 4px solid #ef4444; }
.banner.warning, .warning { background: #fef3c7; border-left: 4px solid #f59e0b; padding: .5rem; }
.info { background: #dbeafe; border-left: 4px solid #3b82f6; padding: .75rem; border-radius: 8px; }
.agent-response, .response { white-space: pre-wrap; line-height: 1.6; }
.agent-response { border: 2px solid #3b82f6; border-radius: 12px; padding: 1.5rem; }
.charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1.5rem; }
.chart { border: 1px solid #e2e8f0; border-radius: 12px; padding: 1rem; margin: 0; min-height: 200px; }
.chart.placeholder::after { content: "No data available"; color: #94a3b8; }
.chat-message { padding: 1rem 1.5rem; border-radius: 12px; margin-bottom: 1rem; }
.chat-user { background: #dbeafe; border-left: 4px solid #2563eb; }
.chat-ai { background: #dcfce7; border-left: 4px solid #10b981; }
.muted { color: #64748b; }
.ok { color: #047857; } .err { color: #b91c1c; }
button { background: #2563eb; color: #fff; border: none; border-radius: 8px; padding: .5rem 1.2rem; cursor: pointer; }
#chat-input { width: 60%; padding: .6rem; border: 1px solid #cbd5e1; border-radius: 8px; }
"#;

const SCRIPT: &str = r#"
(function () {
  function el(tag, attrs, text) {
    var node = document.createElementNS('http://www.w3.org/2000/svg', tag);
    for (var k in attrs) node.setAttribute(k, attrs[k]);
    if (text !== undefined) node.textContent = text;
    return node;
  }
  var COLORS = ['#3b82f6', '#10b981', '#f59e0b', '#ef4444', '#8b5cf6', '#06b6d4', '#ec4899'];
  function tip(node, chart, i) {
    node.appendChild(el('title', {}, chart.labels[i] + ': ' + chart.values[i].toLocaleString()));
    return node;
  }
  function arc(cx, cy, r, from, to) {
    var large = to - from > Math.PI ? 1 : 0;
    return 'M ' + (cx + r * Math.cos(from)) + ' ' + (cy + r * Math.sin(from)) +
      ' A ' + r + ' ' + r + ' 0 ' + large + ' 1 ' + (cx + r * Math.cos(to)) + ' ' + (cy + r * Math.sin(to));
  }
  var DRAWERS = {
    cards: function (chart, fig) {
      chart.labels.forEach(function (label, i) {
        var card = document.createElement('div');
        card.className = 'metric';
        var name = document.createElement('span');
        name.textContent = label;
        var value = document.createElement('b');
        value.textContent = chart.display[i];
        card.appendChild(name); card.appendChild(value); fig.appendChild(card);
      });
    },
    bar: function (chart, svg) {
      var max = Math.max.apply(null, chart.values.concat([1]));
      var w = 280 / chart.values.length;
      chart.values.forEach(function (v, i) {
        var h = 130 * Math.max(v, 0) / max;
        svg.appendChild(tip(el('rect', { x: 10 + i * w, y: 140 - h, width: Math.max(w - 4, 2), height: h,
          fill: COLORS[0] }), chart, i));
      });
    },
    line: function (chart, svg) {
      var max = Math.max.apply(null, chart.values.concat([1]));
      var step = chart.values.length > 1 ? 280 / (chart.values.length - 1) : 0;
      var points = chart.values.map(function (v, i) {
        return [10 + i * step, 140 - 130 * Math.max(v, 0) / max];
      });
      svg.appendChild(el('polyline', { points: points.map(function (p) { return p.join(','); }).join(' '),
        fill: 'none', stroke: COLORS[0], 'stroke-width': 2 }));
      points.forEach(function (p, i) {
        svg.appendChild(tip(el('circle', { cx: p[0], cy: p[1], r: 3, fill: COLORS[0] }), chart, i));
      });
    },
    pie: function (chart, svg) {
      var total = chart.values.reduce(function (a, v) { return a + Math.max(v, 0); }, 0) || 1;
      var angle = -Math.PI / 2;
      chart.values.forEach(function (v, i) {
        var sweep = 2 * Math.PI * Math.max(v, 0) / total;
        if (sweep >= 2 * Math.PI) sweep = 2 * Math.PI - 0.0001;
        var d = arc(150, 80, 70, angle, angle + sweep) + ' L 150 80 Z';
        svg.appendChild(tip(el('path', { d: d, fill: COLORS[i % COLORS.length] }), chart, i));
        angle += sweep;
      });
    },
    gauge: function (chart, svg) {
      var score = Math.min(Math.max(chart.values[0], 0), 100);
      svg.appendChild(el('path', { d: arc(150, 140, 110, Math.PI, 2 * Math.PI), fill: 'none',
        stroke: '#e2e8f0', 'stroke-width': 24 }));
      if (score > 0) {
        svg.appendChild(tip(el('path', { d: arc(150, 140, 110, Math.PI, Math.PI + Math.PI * score / 100),
          fill: 'none', stroke: score >= 70 ? COLORS[1] : score >= 40 ? COLORS[2] : COLORS[3],
          'stroke-width': 24 }), chart, 0));
      }
      svg.appendChild(el('text', { x: 150, y: 135, 'text-anchor': 'middle', 'font-size': 28 }, score.toFixed(1)));
    }
  };
  function draw(chart) {
    var fig = document.getElementById('chart-' + chart.id);
    var drawer = DRAWERS[chart.kind];
    if (!fig || chart.placeholder || !drawer) return;
    if (chart.kind === 'cards') {
      drawer(chart, fig);
      return;
    }
    var svg = el('svg', { viewBox: '0 0 300 160', width: '100%' });
    drawer(chart, svg);
    fig.appendChild(svg);
  }
  document.querySelectorAll('script.chart-data').forEach(function (s) {
    JSON.parse(s.textContent).forEach(draw);
  });

  document.querySelectorAll('button.analysis').forEach(function (b) {
    b.addEventListener('click', function () {
      var out = document.getElementById('analysis-result');
      out.hidden = false; out.textContent = 'Analyzing...';
      fetch(b.dataset.url, { method: 'POST' }).then(function (r) { return r.json(); }).then(function (r) {
        out.textContent = r.data ? r.data.response : r.error;
      });
    });
  });

  var form = document.getElementById('chat-form');
  if (form) {
    var sid = document.getElementById('session-id');
    form.addEventListener('submit', function (e) {
      e.preventDefault();
      var q = document.getElementById('chat-input').value;
      if (!q) return;
      fetch('/api/chat', { method: 'POST', headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ session_id: sid ? sid.value : null, query: q }) })
        .then(function (r) { return r.json(); })
        .then(function (r) {
          var id = r.data && r.data.session_id;
          window.location = '/pages/chat' + (id ? '?session=' + encodeURIComponent(id) : '');
        });
    });
    document.getElementById('chat-clear').addEventListener('click', function () {
      if (!sid) return;
      fetch('/api/chat/' + encodeURIComponent(sid.value), { method: 'DELETE' })
        .then(function () { window.location.reload(); });
    });
  }
})();
"#;
