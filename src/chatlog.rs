// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON chat logs.
//!
//! A chat log holds the messages of one channel together with the users,
//! channels and roles those messages can mention. Message content is kept
//! as raw markdown; see [`crate::parser`] for turning it into nodes.
//!
//! # Format Overview
//!
//! ```json
//! {
//!   "guild": "Rustaceans",
//!   "channel": "general",
//!   "mentionables": {
//!     "users": [{ "id": "42", "name": "Alice" }],
//!     "channels": [{ "id": "7", "name": "general" }],
//!     "roles": []
//!   },
//!   "messages": [{
//!     "id": "1",
//!     "author": { "id": "42", "name": "Alice" },
//!     "timestamp": "2024-12-05T00:00:00Z",
//!     "content": "Hello **world**"
//!   }]
//! }
//! ```
//!
//! Only `messages` is required. Each message needs an author and a
//! timestamp; missing content is treated as empty.

use crate::mentions::{Mentionables, User};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use snafu::prelude::*;

/// Error type for chat log parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// The messages of one channel and everything they can mention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatLog {
    /// Server name, if the channel belongs to one.
    #[serde(default)]
    pub guild: Option<String>,

    /// Channel name.
    #[serde(default)]
    pub channel: Option<String>,

    /// Users, channels and roles referenced by mentions.
    #[serde(default)]
    pub mentionables: Mentionables,

    /// Messages in chronological order.
    pub messages: Vec<Message>,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Platform id of the message.
    #[serde(default)]
    pub id: String,

    /// Who sent the message.
    pub author: User,

    /// When the message was sent.
    pub timestamp: DateTime<Utc>,

    /// Raw markdown content.
    #[serde(default)]
    pub content: String,
}

/// Parses a JSON string into a [`ChatLog`].
///
/// # Errors
///
/// Returns an error if the JSON is malformed or is missing required fields.
///
/// # Example
///
/// ```
/// use chatmark::chatlog::parse_chat_log;
///
/// let json = r#"{
///     "channel": "general",
///     "messages": [{
///         "author": { "id": "42", "name": "Alice" },
///         "timestamp": "2024-12-05T00:00:00Z",
///         "content": "hi"
///     }]
/// }"#;
///
/// let log = parse_chat_log(json).unwrap();
/// assert_eq!(log.messages[0].author.name, "Alice");
/// ```
pub fn parse_chat_log(json_str: &str) -> Result<ChatLog, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mentions::MentionResolver;

    fn log_json(messages_json: &str) -> String {
        format!(r#"{{ "messages": [{messages_json}] }}"#)
    }

    fn message_json(author_id: &str, content: &str) -> String {
        format!(
            r#"{{
                "id": "100",
                "author": {{ "id": "{author_id}", "name": "user{author_id}" }},
                "timestamp": "2024-12-05T10:30:00Z",
                "content": "{content}"
            }}"#
        )
    }

    #[test]
    fn parses_minimal_log() {
        let log = parse_chat_log(&log_json(&message_json("1", "Hello"))).unwrap();

        assert!(log.guild.is_none());
        assert!(log.channel.is_none());
        assert_eq!(log.messages.len(), 1);
        assert_eq!(log.messages[0].content, "Hello");
        assert_eq!(log.messages[0].author.id, "1");
        assert_eq!(
            log.messages[0].timestamp.to_rfc3339(),
            "2024-12-05T10:30:00+00:00"
        );
    }

    #[test]
    fn parses_mentionables() {
        let json = r#"{
            "guild": "Rustaceans",
            "channel": "general",
            "mentionables": {
                "users": [{ "id": "42", "name": "Alice", "discriminator": "0001" }],
                "roles": [{ "id": "9", "name": "mods" }]
            },
            "messages": []
        }"#;
        let log = parse_chat_log(json).unwrap();

        assert_eq!(log.guild.as_deref(), Some("Rustaceans"));
        assert_eq!(log.channel.as_deref(), Some("general"));
        assert_eq!(log.mentionables.user("42").unwrap().full_name(), "Alice#0001");
        assert_eq!(log.mentionables.role("9").unwrap().name, "mods");
    }

    #[test]
    fn missing_content_is_empty() {
        let json = log_json(
            r#"{ "author": { "id": "1", "name": "a" }, "timestamp": "2024-12-05T00:00:00Z" }"#,
        );
        let log = parse_chat_log(&json).unwrap();

        assert_eq!(log.messages[0].content, "");
        assert_eq!(log.messages[0].id, "");
    }

    #[test]
    fn accepts_offset_timestamps() {
        let json = log_json(
            r#"{ "author": { "id": "1", "name": "a" }, "timestamp": "2024-12-05T02:00:00+02:00" }"#,
        );
        let log = parse_chat_log(&json).unwrap();

        assert_eq!(
            log.messages[0].timestamp.to_rfc3339(),
            "2024-12-05T00:00:00+00:00"
        );
    }

    #[test]
    fn returns_error_for_invalid_json() {
        assert!(parse_chat_log("not valid json").is_err());
    }

    #[test]
    fn returns_error_for_missing_messages() {
        assert!(parse_chat_log(r#"{"channel": "general"}"#).is_err());
    }

    #[test]
    fn returns_error_for_bad_timestamp() {
        let json =
            log_json(r#"{ "author": { "id": "1", "name": "a" }, "timestamp": "yesterday" }"#);
        assert!(parse_chat_log(&json).is_err());
    }
}
