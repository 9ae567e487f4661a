// Shared bits for the server-rendered pages of both apps.

#[cfg(feature = "server")]
use crate::error::AppError;
#[cfg(feature = "server")]
use rusqlite::Connection;
#[cfg(feature = "server")]
use std::sync::{Arc, Mutex, MutexGuard};

/// Connection shared by all handlers of one app.
#[cfg(feature = "server")]
pub type SharedDb = Arc<Mutex<Connection>>;

#[cfg(feature = "server")]
pub fn shared_db(conn: Connection) -> SharedDb {
    Arc::new(Mutex::new(conn))
}

/// Lock the shared connection. Never hold the guard across an `.await`.
#[cfg(feature = "server")]
pub fn lock_db(db: &SharedDb) -> Result<MutexGuard<'_, Connection>, AppError> {
    db.lock()
        .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
}

/// Escape text for safe inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a body fragment in the common page skeleton. `title` is escaped,
/// `body` is trusted markup.
pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 60rem; padding: 0 1rem; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border-bottom: 1px solid #ddd; padding: 0.4rem; text-align: left; }}
    .error {{ color: #b00020; }}
  </style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

/// `Some(v)` as escaped text, `None` as a dash.
pub fn display_opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => escape_html(&v.to_string()),
        None => "-".to_string(),
    }
}
