// Server-rendered pages for the Paralympics app.

use super::event::Event;
use crate::web::{display_opt, escape_html, layout};

pub const HOME_TITLE: &str = "Paralympics Home";

/// Home page: every event with a link to its detail page.
pub fn render_index(events: &[Event]) -> String {
    let mut body = String::from("<h1>Paralympics Home</h1>\n");

    if events.is_empty() {
        body.push_str("<p>No events have been imported yet.</p>\n");
        return layout(HOME_TITLE, &body);
    }

    body.push_str("<ul class=\"event-list\">\n");
    for event in events {
        body.push_str(&format!(
            "  <li><a href=\"/display_event/{}\">{}</a></li>\n",
            event.id,
            escape_html(&event.title()),
        ));
    }
    body.push_str("</ul>\n");

    layout(HOME_TITLE, &body)
}

/// Detail page for one event.
pub fn render_event(event: &Event) -> String {
    let duration = event
        .duration_days()
        .map(|d| format!("{} days", d))
        .unwrap_or_else(|| "-".to_string());

    let rows = [
        ("Type", escape_html(&event.event_type)),
        ("Year", event.year.to_string()),
        ("Country", escape_html(&event.country)),
        ("Host", escape_html(&event.host)),
        ("NOC", display_opt(&event.noc)),
        ("Start", display_opt(&event.start)),
        ("End", display_opt(&event.end)),
        ("Duration", duration),
        ("Countries", display_opt(&event.countries)),
        ("Events", display_opt(&event.events)),
        ("Sports", display_opt(&event.sports)),
        ("Participants", display_opt(&event.participants)),
        ("Highlights", display_opt(&event.highlights)),
    ];

    let mut body = format!("<h1>{}</h1>\n<table>\n", escape_html(&event.title()));
    for (label, value) in rows {
        body.push_str(&format!("  <tr><th>{}</th><td>{}</td></tr>\n", label, value));
    }
    body.push_str("</table>\n<p><a href=\"/\">Back to all events</a></p>\n");

    layout(&event.title(), &body)
}
