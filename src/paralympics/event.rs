// Paralympic Games editions shown on the home and detail pages.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One edition of the Games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Assigned by the store; 0 until inserted.
    #[serde(default)]
    pub id: i64,

    /// "summer" or "winter"
    #[serde(rename = "type")]
    pub event_type: String,

    pub year: i32,
    pub country: String,
    pub host: String,

    #[serde(rename = "NOC", default)]
    pub noc: Option<String>,

    #[serde(default)]
    pub start: Option<NaiveDate>,

    #[serde(default)]
    pub end: Option<NaiveDate>,

    #[serde(default)]
    pub countries: Option<i64>,

    #[serde(default)]
    pub events: Option<i64>,

    #[serde(default)]
    pub sports: Option<i64>,

    #[serde(default)]
    pub participants: Option<i64>,

    #[serde(default)]
    pub highlights: Option<String>,
}

impl Event {
    pub fn new(event_type: &str, year: i32, country: &str, host: &str) -> Self {
        Event {
            id: 0,
            event_type: event_type.to_string(),
            year,
            country: country.to_string(),
            host: host.to_string(),
            noc: None,
            start: None,
            end: None,
            countries: None,
            events: None,
            sports: None,
            participants: None,
            highlights: None,
        }
    }

    /// "London 2012 (summer)"
    pub fn title(&self) -> String {
        format!("{} {} ({})", self.host, self.year, self.event_type)
    }

    /// Length of the Games in days, counting both the opening and closing day.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days() + 1),
            _ => None,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Event {
            id: row.get(0)?,
            event_type: row.get(1)?,
            year: row.get(2)?,
            country: row.get(3)?,
            host: row.get(4)?,
            noc: row.get(5)?,
            start: parse_date_column(row, 6)?,
            end: parse_date_column(row, 7)?,
            countries: row.get(8)?,
            events: row.get(9)?,
            sports: row.get(10)?,
            participants: row.get(11)?,
            highlights: row.get(12)?,
        })
    }
}

fn parse_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

const SELECT_EVENT: &str = "SELECT id, type, year, country, host, NOC, start_date, end_date,
        countries, events, sports, participants, highlights
    FROM event";

pub fn load_events_csv(csv_path: &Path) -> Result<Vec<Event>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open events CSV file")?;

    let mut events = Vec::new();
    for result in rdr.deserialize() {
        let event: Event = result.context("Failed to deserialize event")?;
        events.push(event);
    }

    Ok(events)
}

/// Insert one event and return its new id. Any id already on the value is ignored.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO event (
            type, year, country, host, NOC, start_date, end_date,
            countries, events, sports, participants, highlights
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            event.event_type,
            event.year,
            event.country,
            event.host,
            event.noc,
            event.start.map(|d| d.format(DATE_FORMAT).to_string()),
            event.end.map(|d| d.format(DATE_FORMAT).to_string()),
            event.countries,
            event.events,
            event.sports,
            event.participants,
            event.highlights,
        ],
    )
    .context("Failed to insert event")?;

    Ok(conn.last_insert_rowid())
}

pub fn insert_events(conn: &Connection, events: &[Event]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for event in events {
        insert_event(&tx, event)?;
    }
    tx.commit()?;

    tracing::info!(inserted = events.len(), "events imported");
    Ok(events.len())
}

/// All events, oldest first.
pub fn get_events(conn: &Connection) -> Result<Vec<Event>> {
    let sql = format!("{} ORDER BY year, id", SELECT_EVENT);
    let mut stmt = conn.prepare(&sql)?;
    let events = stmt
        .query_map([], Event::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(events)
}

pub fn get_event(conn: &Connection, event_id: i64) -> Result<Option<Event>> {
    let sql = format!("{} WHERE id = ?1", SELECT_EVENT);
    let event = conn
        .query_row(&sql, params![event_id], Event::from_row)
        .optional()?;
    Ok(event)
}
