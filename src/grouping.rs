// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Batching of consecutive messages for display.

use crate::chatlog::Message;
use crate::mentions::User;
use chrono::{DateTime, TimeDelta, Timelike, Utc};

/// Default maximum number of messages per group.
pub const DEFAULT_GROUP_LIMIT: usize = 20;

/// A run of consecutive messages by one author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGroup<'a> {
    /// Author of every message in the group.
    pub author: &'a User,

    /// Timestamp of the first message.
    pub timestamp: DateTime<Utc>,

    /// The grouped messages, in their original order. Never empty.
    pub messages: Vec<&'a Message>,
}

/// Groups adjacent messages by author and time.
///
/// A new group starts when the author changes, when a message is more than
/// an hour after the first message of the current group, when the hour of
/// day changes, or when the current group already holds `limit` messages.
/// A `limit` of zero is treated as one.
#[must_use]
pub fn group_messages(messages: &[Message], limit: usize) -> Vec<MessageGroup<'_>> {
    let limit = limit.max(1);
    let mut groups: Vec<MessageGroup<'_>> = Vec::new();

    for message in messages {
        let starts_group = groups
            .last()
            .is_none_or(|group| breaks_group(group, message, limit));

        if starts_group {
            groups.push(MessageGroup {
                author: &message.author,
                timestamp: message.timestamp,
                messages: vec![message],
            });
        } else if let Some(group) = groups.last_mut() {
            group.messages.push(message);
        }
    }

    groups
}

fn breaks_group(group: &MessageGroup<'_>, message: &Message, limit: usize) -> bool {
    message.author.id != group.author.id
        || message.timestamp - group.timestamp > TimeDelta::hours(1)
        || message.timestamp.hour() != group.timestamp.hour()
        || group.messages.len() >= limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(author_id: &str, hour: u32, minute: u32) -> Message {
        Message {
            id: format!("{author_id}-{hour}-{minute}"),
            author: User {
                id: author_id.into(),
                name: format!("user{author_id}"),
                discriminator: None,
            },
            timestamp: Utc.with_ymd_and_hms(2024, 12, 5, hour, minute, 0).unwrap(),
            content: String::new(),
        }
    }

    fn sizes(groups: &[MessageGroup<'_>]) -> Vec<usize> {
        groups.iter().map(|g| g.messages.len()).collect()
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(group_messages(&[], DEFAULT_GROUP_LIMIT).is_empty());
    }

    #[test]
    fn groups_consecutive_messages_by_author() {
        let messages = [
            message("1", 10, 0),
            message("1", 10, 5),
            message("2", 10, 6),
            message("1", 10, 7),
        ];
        let groups = group_messages(&messages, DEFAULT_GROUP_LIMIT);

        assert_eq!(sizes(&groups), vec![2, 1, 1]);
        assert_eq!(groups[0].author.id, "1");
        assert_eq!(groups[1].author.id, "2");
        assert_eq!(groups[0].timestamp, messages[0].timestamp);
    }

    #[test]
    fn splits_when_hour_changes() {
        let messages = [message("1", 10, 59), message("1", 11, 0)];
        assert_eq!(sizes(&group_messages(&messages, DEFAULT_GROUP_LIMIT)), vec![1, 1]);
    }

    #[test]
    fn splits_after_more_than_an_hour() {
        let mut later = message("1", 10, 0);
        later.timestamp = Utc.with_ymd_and_hms(2024, 12, 6, 10, 30, 0).unwrap();
        let messages = [message("1", 10, 0), later];

        assert_eq!(sizes(&group_messages(&messages, DEFAULT_GROUP_LIMIT)), vec![1, 1]);
    }

    #[test]
    fn splits_when_group_is_full() {
        let messages: Vec<Message> = (0..5).map(|m| message("1", 10, m)).collect();
        assert_eq!(sizes(&group_messages(&messages, 2)), vec![2, 2, 1]);
    }

    #[test]
    fn zero_limit_puts_each_message_alone() {
        let messages = [message("1", 10, 0), message("1", 10, 1)];
        assert_eq!(sizes(&group_messages(&messages, 0)), vec![1, 1]);
    }

    #[test]
    fn preserves_message_order() {
        let messages = [message("1", 10, 0), message("1", 10, 1), message("1", 10, 2)];
        let groups = group_messages(&messages, DEFAULT_GROUP_LIMIT);
        let ids: Vec<&str> = groups[0].messages.iter().map(|m| m.id.as_str()).collect();

        assert_eq!(ids, vec!["1-10-0", "1-10-1", "1-10-2"]);
    }
}
