// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Rendering of a whole chat log.
//!
//! Messages are grouped with [`group_messages`], and each message's content
//! is parsed and rendered with the log's own mentionables as the resolver.
//!
//! # Example
//!
//! ```
//! use chatmark::chatlog::parse_chat_log;
//! use chatmark::export::{render_chat_log, ExportOptions};
//!
//! let log = parse_chat_log(r#"{
//!     "channel": "general",
//!     "messages": [{
//!         "author": { "id": "42", "name": "Alice" },
//!         "timestamp": "2024-12-05T00:00:00Z",
//!         "content": "Hello **world**"
//!     }]
//! }"#).unwrap();
//!
//! let html = render_chat_log(&log, &ExportOptions::default());
//! assert!(html.contains("<b>world</b>"));
//! ```

use crate::chatlog::ChatLog;
use crate::grouping::{DEFAULT_GROUP_LIMIT, MessageGroup, group_messages};
use crate::parser::parse;
use crate::renderer::{Format, escape_html, render};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Configuration options for chat log rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Output format for the whole document.
    pub format: Format,

    /// Maximum number of messages per group.
    pub group_limit: usize,

    /// Whether each group header shows when its first message was sent.
    pub show_timestamps: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: Format::Html,
            group_limit: DEFAULT_GROUP_LIMIT,
            show_timestamps: true,
        }
    }
}

/// Renders every message in `log` as one document.
#[must_use]
pub fn render_chat_log(log: &ChatLog, opts: &ExportOptions) -> String {
    let mut out = String::new();
    let title = title(log);
    let groups = group_messages(&log.messages, opts.group_limit);
    tracing::debug!(
        messages = log.messages.len(),
        groups = groups.len(),
        "rendering chat log"
    );

    match opts.format {
        Format::Html => {
            writeln!(out, r#"<h1 class="chatlog__title">{}</h1>"#, escape_html(&title)).unwrap();
            for group in &groups {
                render_group_html(&mut out, log, group, opts);
            }
        }
        Format::PlainText => {
            writeln!(out, "# {title}\n").unwrap();
            for group in &groups {
                render_group_text(&mut out, log, group, opts);
            }
        }
    }

    out
}

fn title(log: &ChatLog) -> String {
    match (log.guild.as_deref(), log.channel.as_deref()) {
        (Some(guild), Some(channel)) => format!("{guild} / #{channel}"),
        (None, Some(channel)) => format!("#{channel}"),
        (Some(guild), None) => guild.to_owned(),
        (None, None) => "Chat log".to_owned(),
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn render_group_html(
    out: &mut String,
    log: &ChatLog,
    group: &MessageGroup<'_>,
    opts: &ExportOptions,
) {
    out.push_str("<div class=\"chatlog__message-group\">\n");
    writeln!(
        out,
        r#"<div class="chatlog__author" title="{}">{}</div>"#,
        escape_html(&group.author.full_name()),
        escape_html(&group.author.name)
    )
    .unwrap();
    if opts.show_timestamps {
        writeln!(
            out,
            r#"<div class="chatlog__timestamp">{}</div>"#,
            format_timestamp(group.timestamp)
        )
        .unwrap();
    }
    for message in &group.messages {
        let content = render(&parse(&message.content), &log.mentionables, Format::Html);
        writeln!(out, r#"<div class="chatlog__content">{content}</div>"#).unwrap();
    }
    out.push_str("</div>\n");
}

fn render_group_text(
    out: &mut String,
    log: &ChatLog,
    group: &MessageGroup<'_>,
    opts: &ExportOptions,
) {
    write!(out, "== {} ==", group.author.full_name()).unwrap();
    if opts.show_timestamps {
        write!(out, " [{}]", format_timestamp(group.timestamp)).unwrap();
    }
    out.push('\n');
    for message in &group.messages {
        let content = render(&parse(&message.content), &log.mentionables, Format::PlainText);
        out.push_str(content.trim_end_matches('\n'));
        out.push('\n');
    }
    out.push('\n');
}
