use crate::models::{AnalyticsResponse, Student, View};
use crate::settings::{APPS_SCRIPT_TEMPLATE, SETUP_STEPS, SettingsPanel};
use crate::stats::layout_bars;
use crate::table::{avatar_initial, delete_action, display_date, filter_students};
use chrono::FixedOffset;
use maud::{html, Markup, PreEscaped};

const CHART_WIDTH: f64 = 540.0;
const CHART_HEIGHT: f64 = 200.0;

pub fn render_page(view: View, loading: bool, content: Markup) -> String {
    let overlay = html! {
        @if loading {
            div.overlay #overlay { div.spinner {} }
        }
    };

    // Content goes in last so record text can never fill a placeholder.
    PAGE_HTML
        .replace("{{NAV}}", &render_nav(view).into_string())
        .replace("{{VIEW}}", view.as_str())
        .replace("{{LOADING}}", if loading { "true" } else { "false" })
        .replace("{{OVERLAY}}", &overlay.into_string())
        .replace("{{CONTENT}}", &content.into_string())
}

fn render_nav(active: View) -> Markup {
    let tabs = [
        (View::Entry, "Thêm học sinh"),
        (View::List, "Danh sách"),
        (View::Analytics, "Thống kê AI"),
        (View::Settings, "Cài đặt"),
    ];

    html! {
        @for (view, label) in tabs {
            form method="post" action="/view" {
                input type="hidden" name="view" value=(view.as_str());
                button class=(if view == active { "tab active" } else { "tab" }) type="submit" { (label) }
            }
        }
    }
}

pub fn render_entry() -> Markup {
    html! {
        section.intro {
            h2 { "Thu thập thông tin" }
            p.subtitle { "Dữ liệu sẽ được đồng bộ trực tiếp với Google Sheets" }
        }
        form.card.entry method="post" action="/students" {
            label {
                "Họ và Tên"
                input type="text" name="fullName" required placeholder="Nguyễn Văn A";
            }
            label {
                "Lớp"
                input type="text" name="className" required placeholder="12A1";
            }
            label {
                "Ngày tháng năm sinh"
                input type="date" name="birthDate" required;
            }
            button.btn-primary type="submit" { "Lưu thông tin" }
            p.hint { "Dữ liệu sẽ được lưu trữ đồng bộ với hệ thống quản lý học sinh." }
        }
    }
}

pub fn render_list(students: &[Student], query: &str, offset: FixedOffset) -> Markup {
    let visible = filter_students(students, query);

    html! {
        section.list-header {
            h2 { "Danh sách học sinh" }
            form method="post" action="/refresh" {
                button.icon type="submit" title="Làm mới" { "↻" }
            }
        }
        section.card.table-card {
            div.toolbar {
                form method="get" action="/" {
                    input type="search" name="q" value=(query) placeholder="Tìm kiếm theo tên hoặc lớp...";
                }
                span.count { "Hiển thị " (visible.len()) " kết quả" }
            }
            table {
                thead {
                    tr {
                        th { "Họ tên" }
                        th { "Lớp" }
                        th { "Ngày sinh" }
                        th { "Ngày tạo" }
                        th.right { "Thao tác" }
                    }
                }
                tbody {
                    @if visible.is_empty() {
                        tr { td.empty colspan="5" { "Không tìm thấy học sinh nào..." } }
                    }
                    @for student in &visible {
                        (render_row(student, offset))
                    }
                }
            }
        }
    }
}

fn render_row(student: &Student, offset: FixedOffset) -> Markup {
    html! {
        tr {
            td {
                span.avatar { (avatar_initial(&student.full_name)) }
                " "
                strong { (student.full_name) }
            }
            td { span.badge { (student.class_name) } }
            td { (display_date(&student.birth_date, offset)) }
            td.muted { (display_date(&student.created_at, offset)) }
            td.right {
                form method="post" action=(delete_action(&student.id)) {
                    button.icon.danger type="submit" title="Xóa" { "✕" }
                }
            }
        }
    }
}

pub fn render_analytics(data: &AnalyticsResponse) -> Markup {
    let generating = if data.insight.generating { "true" } else { "false" };

    html! {
        section.panel {
            div.stat { span.label { "Tổng số học sinh" } span.value { (data.summary.total) } }
            div.stat { span.label { "Số lượng lớp" } span.value { (data.summary.class_count) } }
            div.stat { span.label { "Trung bình / Lớp" } span.value.net { (data.summary.average) } }
        }
        section.split {
            div.card {
                h3 { "Phân bổ theo lớp" }
                svg #chart viewBox="0 0 600 260" role="img" aria-label="Phân bổ theo lớp" {
                    (render_chart(data))
                }
            }
            div.card.insight {
                h3 { "Gemini AI Phân tích" }
                div #insight data-generating=(generating) {
                    @if data.insight.generating {
                        div.thinking {
                            div.spinner.small {}
                            p { "Đang suy luận..." }
                        }
                    } @else {
                        p { (data.insight.text) }
                    }
                }
            }
        }
    }
}

fn render_chart(data: &AnalyticsResponse) -> Markup {
    let bars = layout_bars(&data.classes, CHART_WIDTH, CHART_HEIGHT);
    let label_y = CHART_HEIGHT + 20.0;

    html! {
        @if bars.is_empty() {
            text.chart-label x="50%" y="50%" text-anchor="middle" { "Chưa có dữ liệu" }
        } @else {
            g transform="translate(40 20)" {
                line.chart-grid x1="0" y1=(CHART_HEIGHT) x2=(CHART_WIDTH) y2=(CHART_HEIGHT) {}
                @for bar in &bars {
                    @let center = format!("{:.1}", bar.x + bar.width / 2.0);
                    rect x=(format!("{:.1}", bar.x)) y=(format!("{:.1}", bar.y))
                        width=(format!("{:.1}", bar.width)) height=(format!("{:.1}", bar.height))
                        rx="4" fill=(bar.color) {
                        title { (bar.label) ": " (bar.count) }
                    }
                    text.chart-label x=(center) y=(format!("{:.1}", bar.y - 6.0)) text-anchor="middle" { (bar.count) }
                    text.chart-label x=(center) y=(label_y) text-anchor="middle" { (bar.label) }
                }
            }
        }
    }
}

pub fn render_settings(panel: &SettingsPanel) -> Markup {
    html! {
        section.card.settings {
            h2 { "Cài đặt kết nối" }
            p.subtitle { "Kết nối ứng dụng với Google Sheets thông qua Apps Script" }
            form method="post" action="/settings" {
                label {
                    "Google Apps Script Web App URL"
                    input type="url" name="url" value=(panel.input_url)
                        placeholder="https://script.google.com/macros/s/.../exec";
                }
                div.notice {
                    strong { "Hướng dẫn tạo Apps Script:" }
                    ol {
                        @for step in SETUP_STEPS {
                            li { (PreEscaped(step)) }
                        }
                    }
                }
                div.code {
                    div.code-header {
                        span { "Apps Script Code" }
                        button.link type="button" # "copy-script" { "Sao chép mã" }
                    }
                    pre # "script-template" { (APPS_SCRIPT_TEMPLATE) }
                }
                button.btn-primary type="submit" { "Lưu cài đặt & Kết nối" }
            }
        }
    }
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="vi">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>StudentHub</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef0fb;
      --bg-2: #d9d4f7;
      --ink: #1e1b3a;
      --accent: #6366f1;
      --accent-2: #7c3aed;
      --muted: #7a7890;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(49, 46, 129, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f4f1ff 60%, #faf9ff 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 0 18px 48px;
    }

    header {
      max-width: 1080px;
      margin: 0 auto;
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      padding: 20px 0;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: 1.8rem;
      margin: 0;
      color: var(--accent);
    }

    h2, h3 {
      margin: 0 0 8px;
    }

    main {
      max-width: 1080px;
      margin: 0 auto;
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    nav {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(99, 102, 241, 0.08);
      border-radius: 999px;
    }

    nav form {
      margin: 0;
    }

    button {
      appearance: none;
      border: none;
      cursor: pointer;
      font: inherit;
      transition: transform 150ms ease, box-shadow 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    .tab {
      background: transparent;
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      color: var(--muted);
    }

    .tab.active {
      background: white;
      color: var(--accent);
      box-shadow: 0 8px 16px rgba(49, 46, 129, 0.12);
    }

    .card {
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    .intro {
      text-align: center;
    }

    .subtitle, .hint, .muted {
      color: var(--muted);
    }

    .hint {
      font-size: 0.8rem;
      text-align: center;
      margin: 0;
    }

    .entry, .settings {
      width: min(640px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 18px;
    }

    .settings form {
      display: grid;
      gap: 18px;
    }

    label {
      display: grid;
      gap: 6px;
      font-weight: 600;
      font-size: 0.9rem;
    }

    input {
      font: inherit;
      padding: 12px 14px;
      border-radius: 14px;
      border: 1px solid rgba(30, 27, 58, 0.15);
      background: white;
    }

    .btn-primary {
      background: linear-gradient(90deg, var(--accent), var(--accent-2));
      color: white;
      font-weight: 700;
      padding: 16px 20px;
      border-radius: 16px;
      box-shadow: 0 10px 24px rgba(99, 102, 241, 0.3);
    }

    .list-header, .toolbar, .code-header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .toolbar {
      margin-bottom: 16px;
    }

    .toolbar form {
      margin: 0;
      width: min(320px, 100%);
    }

    .toolbar input {
      width: 100%;
    }

    .count {
      font-size: 0.8rem;
      color: var(--muted);
    }

    .icon {
      background: transparent;
      color: var(--accent);
      font-size: 1.2rem;
      padding: 6px 10px;
      border-radius: 10px;
    }

    .icon.danger {
      color: var(--muted);
    }

    .icon.danger:hover {
      color: #e11d48;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th {
      text-align: left;
      font-size: 0.7rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
      padding: 10px 12px;
    }

    td {
      padding: 12px;
      border-top: 1px solid rgba(30, 27, 58, 0.06);
    }

    td form {
      margin: 0;
    }

    .right {
      text-align: right;
    }

    .empty {
      text-align: center;
      font-style: italic;
      color: var(--muted);
      padding: 48px 12px;
    }

    .avatar {
      display: inline-grid;
      place-items: center;
      width: 32px;
      height: 32px;
      border-radius: 50%;
      background: rgba(99, 102, 241, 0.12);
      color: var(--accent);
      font-weight: 700;
      font-size: 0.8rem;
    }

    .badge {
      padding: 4px 8px;
      border-radius: 8px;
      background: #f1f5f9;
      font-size: 0.75rem;
      font-weight: 700;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 20px;
      padding: 20px;
      display: grid;
      gap: 6px;
      box-shadow: var(--shadow);
    }

    .stat .label {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 2.2rem;
      font-weight: 600;
      color: var(--accent);
    }

    .stat .value.net {
      color: #10b981;
    }

    .split {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 24px;
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-grid {
      stroke: rgba(30, 27, 58, 0.12);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .insight {
      background: linear-gradient(135deg, #312e81, #581c87);
      color: #eef2ff;
    }

    .insight p {
      line-height: 1.6;
    }

    .thinking {
      display: grid;
      place-items: center;
      gap: 12px;
      min-height: 160px;
    }

    .notice {
      background: #fffbeb;
      border: 1px solid #fde68a;
      border-radius: 14px;
      padding: 14px 18px;
      color: #92400e;
      font-size: 0.8rem;
    }

    .code {
      background: #0f172a;
      border-radius: 14px;
      padding: 14px 18px;
    }

    .code-header span {
      color: #94a3b8;
      font-size: 0.65rem;
      font-weight: 700;
      text-transform: uppercase;
    }

    .code pre {
      color: #34d399;
      font-size: 0.7rem;
      overflow-x: auto;
    }

    .link {
      background: transparent;
      color: #818cf8;
      font-size: 0.75rem;
      font-weight: 700;
    }

    .overlay {
      position: fixed;
      inset: 0;
      background: rgba(255, 255, 255, 0.5);
      backdrop-filter: blur(4px);
      display: grid;
      place-items: center;
      z-index: 60;
    }

    .spinner {
      width: 48px;
      height: 48px;
      border-radius: 50%;
      border: 3px solid transparent;
      border-bottom-color: var(--accent);
      animation: spin 900ms linear infinite;
    }

    .spinner.small {
      width: 32px;
      height: 32px;
      border-bottom-color: white;
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .card {
        padding: 22px 18px;
      }
      nav {
        width: 100%;
        justify-content: space-between;
      }
    }
  </style>
</head>
<body data-view="{{VIEW}}" data-loading="{{LOADING}}">
  <header>
    <h1>StudentHub</h1>
    <nav>{{NAV}}</nav>
  </header>

  <main>
    {{OVERLAY}}
    {{CONTENT}}
  </main>

  <script>
    const body = document.body;
    const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));

    const waitForLoad = async () => {
      while (true) {
        await sleep(500);
        try {
          const res = await fetch('/api/status');
          if (res.ok && !(await res.json()).loading) {
            window.location.reload();
            return;
          }
        } catch (err) {
          console.error(err);
        }
      }
    };

    const waitForInsight = async (box) => {
      while (box.dataset.generating === 'true') {
        await sleep(1000);
        try {
          const res = await fetch('/api/analytics');
          if (!res.ok) {
            continue;
          }
          const data = await res.json();
          if (!data.insight.generating) {
            const p = document.createElement('p');
            p.textContent = data.insight.text;
            box.replaceChildren(p);
            box.dataset.generating = 'false';
          }
        } catch (err) {
          console.error(err);
        }
      }
    };

    if (body.dataset.loading === 'true') {
      waitForLoad();
    }

    const insightBox = document.getElementById('insight');
    if (insightBox) {
      waitForInsight(insightBox);
    }

    const copyBtn = document.getElementById('copy-script');
    if (copyBtn) {
      copyBtn.addEventListener('click', async () => {
        const code = document.getElementById('script-template').textContent;
        try {
          await navigator.clipboard.writeText(code);
        } catch (err) {
          console.error(err);
        }
        alert('Đã sao chép mã script!');
      });
    }
  </script>
</body>
</html>
"#;
