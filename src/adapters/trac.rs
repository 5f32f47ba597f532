//! Trac ticket store backed by the project's SQLite database.
//!
//! Trac records times as microseconds since the epoch. A NULL or zero time
//! on a comment or attachment means "unknown"; NULL text columns read as
//! empty strings.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use tracing::debug;

use crate::error::MigrateError;
use crate::ports::tickets::{Attachment, Comment, MilestoneInfo, Ticket, TicketQuery, TicketStore};

const TICKETS_SQL: &str = "
    SELECT id, type, owner, reporter, milestone, status, resolution,
           summary, description, component, priority, time, changetime
    FROM ticket
    WHERE id >= ?1
    ORDER BY id ASC
    LIMIT ?2";

const COMMENTS_SQL: &str = "
    SELECT ticket, time, author, newvalue
    FROM ticket_change
    WHERE field = 'comment' AND newvalue <> '' AND ticket = ?1
    ORDER BY time ASC";

const ATTACHMENTS_SQL: &str = "
    SELECT id, time, author, description, filename
    FROM attachment
    WHERE type = 'ticket' AND id = ?1
    ORDER BY time ASC";

const MILESTONE_SQL: &str = "
    SELECT name, due, completed, description
    FROM milestone
    WHERE name = ?1";

/// Read-only handle on a Trac database.
pub struct TracDatabase {
    conn: Connection,
}

impl TracDatabase {
    /// Opens the database read-only.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::TicketStore`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, MigrateError> {
        debug!("opening trac database {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            MigrateError::TicketStore(format!("cannot open {}: {e}", path.display()).into())
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already open connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl TicketStore for TracDatabase {
    fn tickets(
        &self,
        query: &TicketQuery,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>> {
        let start = i64::try_from(query.start)?;
        let limit = query.limit.map_or(Ok(-1), i64::try_from)?;
        let mut stmt = self.conn.prepare(TICKETS_SQL)?;
        let rows = stmt.query_map(params![start, limit], |row| {
            Ok(Ticket {
                id: id_column(row, 0)?,
                kind: text(row, 1)?,
                owner: text(row, 2)?,
                reporter: text(row, 3)?,
                milestone: text(row, 4)?,
                status: text(row, 5)?,
                resolution: text(row, 6)?,
                summary: text(row, 7)?,
                description: text(row, 8)?,
                component: text(row, 9)?,
                priority: text(row, 10)?,
                created: time(row, 11)?.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                changed: time(row, 12)?.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn comments(
        &self,
        ticket: u64,
    ) -> Result<Vec<Comment>, Box<dyn std::error::Error + Send + Sync>> {
        let mut stmt = self.conn.prepare(COMMENTS_SQL)?;
        let rows = stmt.query_map(params![i64::try_from(ticket)?], |row| {
            Ok(Comment {
                ticket: id_column(row, 0)?,
                time: time(row, 1)?,
                author: text(row, 2)?,
                text: text(row, 3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn attachments(
        &self,
        ticket: u64,
    ) -> Result<Vec<Attachment>, Box<dyn std::error::Error + Send + Sync>> {
        let mut stmt = self.conn.prepare(ATTACHMENTS_SQL)?;
        let rows = stmt.query_map(params![ticket.to_string()], |row| {
            Ok(Attachment {
                ticket,
                time: time(row, 1)?,
                author: text(row, 2)?,
                description: text(row, 3)?,
                filename: text(row, 4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn milestone(
        &self,
        name: &str,
    ) -> Result<Option<MilestoneInfo>, Box<dyn std::error::Error + Send + Sync>> {
        let milestone = self
            .conn
            .query_row(MILESTONE_SQL, params![name], |row| {
                Ok(MilestoneInfo {
                    name: text(row, 0)?,
                    due: time(row, 1)?,
                    completed: time(row, 2)?.is_some(),
                    description: text(row, 3)?,
                })
            })
            .optional()?;
        Ok(milestone)
    }
}

fn text(row: &Row<'_>, index: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(index)?.unwrap_or_default())
}

fn time(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(row.get::<_, Option<i64>>(index)?.and_then(from_micros))
}

fn id_column(row: &Row<'_>, index: usize) -> rusqlite::Result<u64> {
    let id: i64 = row.get(index)?;
    u64::try_from(id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(index, id))
}

/// Converts Trac microseconds to a timestamp; zero and negative mean unknown.
fn from_micros(micros: i64) -> Option<DateTime<Utc>> {
    if micros <= 0 {
        None
    } else {
        DateTime::from_timestamp_micros(micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE ticket (
            id integer PRIMARY KEY, type text, time integer, changetime integer,
            component text, severity text, priority text, owner text, reporter text,
            cc text, version text, milestone text, status text, resolution text,
            summary text, description text, keywords text);
        CREATE TABLE ticket_change (
            ticket integer, time integer, author text, field text,
            oldvalue text, newvalue text);
        CREATE TABLE attachment (
            type text, id text, filename text, size integer, time integer,
            description text, author text, ipnr text);
        CREATE TABLE milestone (
            name text PRIMARY KEY, due integer, completed integer, description text);
    ";

    fn fixture() -> TracDatabase {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            "
            INSERT INTO ticket (id, type, time, changetime, component, priority, owner, reporter,
                                milestone, status, resolution, summary, description)
            VALUES (1, 'defect', 1000000000, 2000000000, 'raster', 'high', 'pramsey', 'strk',
                    '2.0', 'closed', 'fixed', 'First', 'body'),
                   (2, 'task', 3000000000, 3000000000, NULL, NULL, NULL, 'robe',
                    NULL, 'new', NULL, 'Second', NULL),
                   (4, 'enhancement', 4000000000, 4000000000, NULL, NULL, NULL, 'robe',
                    NULL, 'new', NULL, 'Fourth', 'x');
            INSERT INTO ticket_change VALUES
                (1, 1500000000, 'robe', 'comment', '1', 'looks good'),
                (1, 1200000000, 'strk', 'comment', '', 'first!'),
                (1, 1300000000, 'strk', 'comment', '', ''),
                (1, 1400000000, 'strk', 'status', 'new', 'closed'),
                (2, 0, 'robe', 'comment', '', 'undated');
            INSERT INTO attachment VALUES
                ('ticket', '1', 'fix.patch', 10, 1250000000, 'the fix', 'strk', NULL),
                ('wiki', '1', 'page.png', 10, 1250000000, '', 'strk', NULL);
            INSERT INTO milestone VALUES
                ('2.0', 1262304000000000, 1270000000000000, 'Release 2.0'),
                ('3.0', 0, 0, NULL);
            ",
        )
        .unwrap();
        TracDatabase::from_connection(conn)
    }

    #[test]
    fn tickets_ascending_from_start_with_limit() {
        let db = fixture();
        let all = db.tickets(&TicketQuery::default()).unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), [1, 2, 4]);

        let page = db.tickets(&TicketQuery { start: 2, limit: Some(1) }).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
        assert_eq!(page[0].description, "");
        assert_eq!(page[0].component, "");
    }

    #[test]
    fn ticket_fields_and_times() {
        let db = fixture();
        let ticket = &db.tickets(&TicketQuery::default()).unwrap()[0];
        assert_eq!(ticket.kind, "defect");
        assert_eq!(ticket.milestone, "2.0");
        assert_eq!(ticket.created, DateTime::from_timestamp(1000, 0).unwrap());
        assert_eq!(ticket.changed, DateTime::from_timestamp(2000, 0).unwrap());
    }

    #[test]
    fn comments_skip_empty_and_non_comment_changes() {
        let db = fixture();
        let comments = db.comments(1).unwrap();
        let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first!", "looks good"]);

        let undated = db.comments(2).unwrap();
        assert_eq!(undated.len(), 1);
        assert!(undated[0].time.is_none());
    }

    #[test]
    fn attachments_only_for_tickets() {
        let db = fixture();
        let attachments = db.attachments(1).unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "fix.patch");
        assert_eq!(attachments[0].ticket, 1);
        assert!(db.attachments(2).unwrap().is_empty());
    }

    #[test]
    fn milestone_lookup_by_exact_name() {
        let db = fixture();
        let released = db.milestone("2.0").unwrap().unwrap();
        assert!(released.completed);
        assert_eq!(released.due, DateTime::from_timestamp(1_262_304_000, 0));

        let open = db.milestone("3.0").unwrap().unwrap();
        assert!(!open.completed);
        assert!(open.due.is_none());
        assert_eq!(open.description, "");

        assert!(db.milestone("2.0.1").unwrap().is_none());
    }

    #[test]
    fn open_missing_database_fails() {
        let err = TracDatabase::open(Path::new("/nonexistent/trac.db")).err().unwrap();
        assert!(matches!(err, MigrateError::TicketStore(_)));
    }
}
