//! Merges a ticket's comments and attachments into one chronology.

use std::iter::Peekable;
use std::vec::IntoIter;

use chrono::{DateTime, Utc};

use crate::ports::tickets::{Attachment, Comment};

/// One entry of a ticket's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A comment.
    Comment(Comment),
    /// An attachment upload.
    Attachment(Attachment),
}

impl TimelineEvent {
    /// Event time; `None` sorts before every real timestamp.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Comment(c) => c.time,
            Self::Attachment(a) => a.time,
        }
    }

    /// Author of the event.
    #[must_use]
    pub fn author(&self) -> &str {
        match self {
            Self::Comment(c) => &c.author,
            Self::Attachment(a) => &a.author,
        }
    }

    /// Ticket the event belongs to.
    #[must_use]
    pub fn ticket(&self) -> u64 {
        match self {
            Self::Comment(c) => c.ticket,
            Self::Attachment(a) => a.ticket,
        }
    }
}

/// Chronological, single-pass sequence of one ticket's events.
///
/// Events without a timestamp come first. When a comment and an
/// attachment share a timestamp the comment is yielded first.
#[derive(Debug)]
pub struct Timeline {
    comments: Peekable<IntoIter<Comment>>,
    attachments: Peekable<IntoIter<Attachment>>,
}

/// Merges the two streams of a single ticket.
///
/// Each stream is put in time order first (stable, so same-time events keep
/// their store order); the merge itself is lazy.
#[must_use]
pub fn merge(
    comments: impl IntoIterator<Item = Comment>,
    attachments: impl IntoIterator<Item = Attachment>,
) -> Timeline {
    let mut comments: Vec<Comment> = comments.into_iter().collect();
    let mut attachments: Vec<Attachment> = attachments.into_iter().collect();
    comments.sort_by_key(|c| c.time);
    attachments.sort_by_key(|a| a.time);
    Timeline {
        comments: comments.into_iter().peekable(),
        attachments: attachments.into_iter().peekable(),
    }
}

impl Iterator for Timeline {
    type Item = TimelineEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let take_comment = match (self.comments.peek(), self.attachments.peek()) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            // Option orders None first, which is the "no timestamp" rule
            (Some(c), Some(a)) => c.time <= a.time,
        };
        if take_comment {
            self.comments.next().map(TimelineEvent::Comment)
        } else {
            self.attachments.next().map(TimelineEvent::Attachment)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.comments.len() + self.attachments.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Timeline {}
