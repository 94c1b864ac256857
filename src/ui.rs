use crate::models::{default_dob, field_text, Sex, SubjectOption};
use crate::nav::Mode;
use crate::storage::Record;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            NoticeKind::Success => "notice success",
            NoticeKind::Error => "notice error",
            NoticeKind::Warning => "notice warning",
            NoticeKind::Info => "notice info",
        }
    }
}

/// A one-line status message shown above the form or table.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    fn render(&self) -> String {
        format!(
            r#"<div class="{}" role="status">{}</div>"#,
            self.kind.class(),
            escape_html(&self.message)
        )
    }
}

pub const NO_SUBJECTS_WARNING: &str = "No subjects available. Please add subjects first.";
pub const NO_SUBJECTS_INFO: &str = "No subjects found. Please add some subjects to begin.";
pub const NO_SESSIONS_INFO: &str = "No sessions found. Please log some sessions.";

pub fn render_add_subject(notice: Option<&Notice>) -> String {
    let sex_options: String = Sex::ALL
        .iter()
        .map(|sex| {
            let selected = if *sex == Sex::default() { " selected" } else { "" };
            format!(r#"<option value="{0}"{selected}>{0}</option>"#, sex.as_str())
        })
        .collect();

    let form = SUBJECT_FORM_HTML
        .replace("{{DOB}}", &default_dob().to_string())
        .replace("{{SEX_OPTIONS}}", &sex_options);

    render_page(Mode::AddSubject, notice, &form)
}

/// With no subjects the page carries a warning and no form.
pub fn render_add_session(
    options: &[SubjectOption],
    today: NaiveDate,
    notice: Option<&Notice>,
) -> String {
    if options.is_empty() {
        let warning = Notice::warning(NO_SUBJECTS_WARNING);
        return render_page(Mode::AddSession, Some(&warning), "");
    }

    let subject_options: String = options
        .iter()
        .map(|option| {
            let label = escape_html(&option.label);
            format!(r#"<option value="{label}">{label}</option>"#)
        })
        .collect();

    let form = SESSION_FORM_HTML
        .replace("{{TODAY}}", &today.to_string())
        .replace("{{SUBJECT_OPTIONS}}", &subject_options);

    render_page(Mode::AddSession, notice, &form)
}

pub fn render_subjects(records: &[Record]) -> String {
    render_collection(Mode::ViewSubjects, records, NO_SUBJECTS_INFO)
}

pub fn render_sessions(records: &[Record]) -> String {
    render_collection(Mode::ViewSessions, records, NO_SESSIONS_INFO)
}

fn render_collection(mode: Mode, records: &[Record], empty_message: &str) -> String {
    if records.is_empty() {
        let info = Notice::info(empty_message);
        return render_page(mode, Some(&info), "");
    }
    render_page(mode, None, &render_table(records))
}

/// One row per record, one column per field name in order of first
/// appearance, plus a leading row index.
fn render_table(records: &[Record]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut html = String::from(r#"<table class="records"><thead><tr><th></th>"#);
    for column in &columns {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr></thead><tbody>");

    for (index, record) in records.iter().enumerate() {
        html.push_str(&format!(r#"<tr><th scope="row">{index}</th>"#));
        for column in &columns {
            let text = record.get(*column).map(field_text).unwrap_or_default();
            html.push_str(&format!("<td>{}</td>", escape_html(&text)));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

fn render_page(active: Mode, notice: Option<&Notice>, body: &str) -> String {
    let nav: String = Mode::ALL
        .iter()
        .map(|mode| {
            let current = if *mode == active {
                r#" class="active" aria-current="page""#
            } else {
                ""
            };
            format!(
                r#"<li><a href="{}"{current}>{}</a></li>"#,
                mode.path(),
                mode.label()
            )
        })
        .collect();

    let mut content = notice.map(Notice::render).unwrap_or_default();
    content.push_str(body);

    // Content goes in last so user text is never scanned for placeholders.
    LAYOUT_HTML
        .replace("{{NAV}}", &nav)
        .replace("{{HEADING}}", active.heading())
        .replace("{{DESCRIPTION}}", active.description())
        .replace("{{CONTENT}}", &content)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const SUBJECT_FORM_HTML: &str = r#"<form class="entry" method="post" action="/subjects">
        <label>Subject ID <input type="text" name="id" /></label>
        <label>Name <input type="text" name="name" /></label>
        <label>Date of Birth <input type="date" name="dob" value="{{DOB}}" required /></label>
        <label>Sex <select name="sex">{{SEX_OPTIONS}}</select></label>
        <button type="submit">Add Subject</button>
      </form>"#;

const SESSION_FORM_HTML: &str = r#"<form class="entry" method="post" action="/sessions">
        <label>Select Subject <select name="subject">{{SUBJECT_OPTIONS}}</select></label>
        <label>Session Date <input type="date" name="session_date" value="{{TODAY}}" required /></label>
        <label>Experimental Condition <input type="text" name="condition" placeholder="e.g., High Contrast, Low Light, etc." /></label>
        <label>Notes <textarea name="notes" rows="4" placeholder="Enter any observations or additional details about the session."></textarea></label>
        <button type="submit">Add Session</button>
      </form>"#;

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Visual Perception Experiment for Rats</title>
  <style>
    :root {
      --bg: #f6f4ef;
      --ink: #2b2a28;
      --muted: #6b645d;
      --accent: #2f4858;
      --card: #ffffff;
      --line: rgba(47, 72, 88, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      display: grid;
      grid-template-columns: 220px 1fr;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
    }

    aside {
      background: var(--accent);
      color: white;
      padding: 28px 18px;
    }

    aside h2 {
      margin: 0 0 4px;
      font-size: 1.2rem;
    }

    aside p {
      margin: 0 0 14px;
      font-size: 0.85rem;
      opacity: 0.8;
    }

    aside ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 6px;
    }

    aside a {
      display: block;
      padding: 8px 12px;
      border-radius: 10px;
      color: white;
      text-decoration: none;
    }

    aside a.active {
      background: white;
      color: var(--accent);
      font-weight: 600;
    }

    main {
      padding: 36px;
      display: grid;
      gap: 18px;
      align-content: start;
      max-width: 960px;
    }

    h1 {
      margin: 0;
      font-family: "Georgia", serif;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
    }

    .entry {
      display: grid;
      gap: 14px;
      background: var(--card);
      padding: 22px;
      border-radius: 16px;
      border: 1px solid var(--line);
    }

    .entry label {
      display: grid;
      gap: 6px;
      font-weight: 600;
    }

    .entry input,
    .entry select,
    .entry textarea {
      font: inherit;
      padding: 8px 10px;
      border: 1px solid var(--line);
      border-radius: 8px;
    }

    button {
      justify-self: start;
      border: none;
      border-radius: 999px;
      padding: 10px 20px;
      font: inherit;
      font-weight: 600;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    .notice {
      padding: 12px 16px;
      border-radius: 10px;
    }

    .notice.success {
      background: #e3f3e8;
      color: #2d7a4b;
    }

    .notice.error {
      background: #fbe4e1;
      color: #c63b2b;
    }

    .notice.warning {
      background: #fdf1d6;
      color: #8a6412;
    }

    .notice.info {
      background: #e2edf5;
      color: #2f5f86;
    }

    table.records {
      border-collapse: collapse;
      background: var(--card);
    }

    table.records th,
    table.records td {
      padding: 8px 12px;
      border: 1px solid var(--line);
      text-align: left;
    }
  </style>
</head>
<body>
  <aside>
    <h2>Navigation</h2>
    <p>Select Action</p>
    <ul>{{NAV}}</ul>
  </aside>
  <main>
    <header>
      <h1>Visual Perception Experiment for Rats</h1>
      <p class="subtitle">MPI Florida</p>
    </header>
    <p>Welcome to the experiment logging application for our Visual Perception Experiment conducted at MPI Florida.
      In this study, we investigate how rats respond to various visual stimuli under different experimental conditions.
      Use the sidebar to navigate and log new subjects or sessions, and to view the recorded data.</p>
    <section>
      <h2>{{HEADING}}</h2>
      <p class="subtitle">{{DESCRIPTION}}</p>
    </section>
    {{CONTENT}}
  </main>
</body>
</html>
"#;
