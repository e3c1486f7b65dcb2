// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Rendering of parsed markdown into HTML or plain text.
//!
//! Rendering is a depth-first walk over the node sequence. The walk itself
//! is shared by every output format: it resolves mentions, recurses into
//! formatted spans and hands each piece to a [`Format`]-specific markup
//! writer. Mentions the resolver cannot find fall back to their raw id.
//!
//! # Example
//!
//! ```
//! use chatmark::mentions::{Mentionables, User};
//! use chatmark::parser::parse;
//! use chatmark::renderer::{render, Format};
//!
//! let mut mentionables = Mentionables::new();
//! mentionables.add_user(User {
//!     id: "42".into(),
//!     name: "Alice".into(),
//!     discriminator: None,
//! });
//!
//! let nodes = parse("Hello **world**, check <@42>!");
//! let html = render(&nodes, &mentionables, Format::Html);
//!
//! assert_eq!(
//!     html,
//!     r#"Hello <b>world</b>, check <span class="mention" title="Alice">@Alice</span>!"#
//! );
//! ```

use crate::ast::{EmojiNode, MentionType, Node, TextFormatting};
use crate::mentions::MentionResolver;
use std::fmt::Write;

/// Base url for custom emoji images.
pub const EMOJI_CDN: &str = "https://cdn.discordapp.com/emojis";

/// Output format for [`render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// HTML fragment with escaped text.
    #[default]
    Html,
    /// Unformatted text with mentions and emoji spelled out.
    PlainText,
}

/// Renders `nodes` in the given format.
///
/// Mentions are resolved through `resolver`; ids it does not know are
/// rendered as-is rather than failing.
#[must_use]
pub fn render<R>(nodes: &[Node], resolver: &R, format: Format) -> String
where
    R: MentionResolver + ?Sized,
{
    let mut out = String::new();
    match format {
        Format::Html => walk(&mut out, nodes, resolver, &Html),
        Format::PlainText => walk(&mut out, nodes, resolver, &PlainText),
    }
    out
}

/// Display data for a mention after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    /// Prefix shown before the name: `@` or `#`.
    sigil: char,
    name: String,
    title: Option<String>,
}

/// Per-format output for each node kind.
trait Markup {
    fn text(&self, out: &mut String, text: &str);
    fn open(&self, out: &mut String, formatting: TextFormatting);
    fn close(&self, out: &mut String, formatting: TextFormatting);
    fn inline_code(&self, out: &mut String, code: &str);
    fn code_block(&self, out: &mut String, code: &str, language: Option<&str>);
    fn mention(&self, out: &mut String, mention: &Mention);
    fn emoji(&self, out: &mut String, emoji: &EmojiNode);
    fn link(&self, out: &mut String, url: &str, title: &str);
}

fn walk<R, M>(out: &mut String, nodes: &[Node], resolver: &R, markup: &M)
where
    R: MentionResolver + ?Sized,
    M: Markup,
{
    for node in nodes {
        match node {
            Node::Text(node) => markup.text(out, node.text()),
            Node::Formatted(node) => {
                markup.open(out, node.formatting());
                walk(out, node.children(), resolver, markup);
                markup.close(out, node.formatting());
            }
            Node::InlineCode(node) => markup.inline_code(out, node.code()),
            Node::MultilineCode(node) => markup.code_block(out, node.code(), node.language()),
            Node::Mention(node) => {
                markup.mention(out, &resolve_mention(resolver, node.kind(), node.id()));
            }
            Node::Emoji(node) => markup.emoji(out, node),
            Node::Link(node) => markup.link(out, node.url(), node.title()),
        }
    }
}

fn resolve_mention<R>(resolver: &R, kind: MentionType, id: &str) -> Mention
where
    R: MentionResolver + ?Sized,
{
    let resolved = match kind {
        MentionType::Meta => Some(('@', id.to_owned(), None)),
        MentionType::User => resolver
            .user(id)
            .map(|user| ('@', user.name.clone(), Some(user.full_name()))),
        MentionType::Channel => resolver.channel(id).map(|c| ('#', c.name.clone(), None)),
        MentionType::Role => resolver.role(id).map(|r| ('@', r.name.clone(), None)),
    };

    if let Some((sigil, name, title)) = resolved {
        return Mention { sigil, name, title };
    }

    tracing::debug!(?kind, id, "unresolved mention");
    let (sigil, title) = match kind {
        MentionType::Channel => ('#', "Unknown channel"),
        MentionType::Role => ('@', "Unknown role"),
        MentionType::User | MentionType::Meta => ('@', "Unknown user"),
    };
    Mention {
        sigil,
        name: id.to_owned(),
        title: Some(title.to_owned()),
    }
}

struct Html;

impl Html {
    const fn tag(formatting: TextFormatting) -> &'static str {
        match formatting {
            TextFormatting::Bold => "b",
            TextFormatting::Italic => "i",
            TextFormatting::Underline => "u",
            TextFormatting::Strikethrough => "s",
            TextFormatting::Spoiler => "span",
        }
    }
}

impl Markup for Html {
    fn text(&self, out: &mut String, text: &str) {
        push_escaped(out, text);
    }

    fn open(&self, out: &mut String, formatting: TextFormatting) {
        match formatting {
            TextFormatting::Spoiler => out.push_str(r#"<span class="spoiler">"#),
            _ => write!(out, "<{}>", Self::tag(formatting)).unwrap(),
        }
    }

    fn close(&self, out: &mut String, formatting: TextFormatting) {
        write!(out, "</{}>", Self::tag(formatting)).unwrap();
    }

    fn inline_code(&self, out: &mut String, code: &str) {
        out.push_str(r#"<span class="pre pre--inline">"#);
        push_escaped(out, code);
        out.push_str("</span>");
    }

    fn code_block(&self, out: &mut String, code: &str, language: Option<&str>) {
        out.push_str(r#"<div class="pre pre--multiline"#);
        if let Some(language) = language {
            out.push_str(" language-");
            push_escaped(out, language);
        }
        out.push_str(r#"">"#);
        push_escaped(out, code);
        out.push_str("</div>");
    }

    fn mention(&self, out: &mut String, mention: &Mention) {
        out.push_str(r#"<span class="mention""#);
        if let Some(title) = &mention.title {
            out.push_str(r#" title=""#);
            push_escaped(out, title);
            out.push('"');
        }
        out.push('>');
        out.push(mention.sigil);
        push_escaped(out, &mention.name);
        out.push_str("</span>");
    }

    fn emoji(&self, out: &mut String, emoji: &EmojiNode) {
        let extension = if emoji.is_animated() { "gif" } else { "png" };
        out.push_str(r#"<img class="emoji" title=""#);
        push_escaped(out, emoji.name());
        out.push_str(r#"" src=""#);
        write!(out, "{EMOJI_CDN}/").unwrap();
        push_escaped(out, emoji.id());
        write!(out, r#".{extension}" />"#).unwrap();
    }

    fn link(&self, out: &mut String, url: &str, title: &str) {
        out.push_str(r#"<a href=""#);
        push_escaped(out, url);
        out.push_str(r#"">"#);
        push_escaped(out, title);
        out.push_str("</a>");
    }
}

struct PlainText;

impl Markup for PlainText {
    fn text(&self, out: &mut String, text: &str) {
        out.push_str(text);
    }

    fn open(&self, _out: &mut String, _formatting: TextFormatting) {}

    fn close(&self, _out: &mut String, _formatting: TextFormatting) {}

    fn inline_code(&self, out: &mut String, code: &str) {
        out.push_str(code);
    }

    fn code_block(&self, out: &mut String, code: &str, _language: Option<&str>) {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(code);
        if !code.ends_with('\n') {
            out.push('\n');
        }
    }

    fn mention(&self, out: &mut String, mention: &Mention) {
        out.push(mention.sigil);
        out.push_str(&mention.name);
    }

    fn emoji(&self, out: &mut String, emoji: &EmojiNode) {
        write!(out, ":{}:", emoji.name()).unwrap();
    }

    fn link(&self, out: &mut String, url: &str, title: &str) {
        if title == url {
            out.push_str(url);
        } else {
            write!(out, "{title} ({url})").unwrap();
        }
    }
}

/// Appends `s` with the HTML special characters replaced by entities.
fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Returns `s` escaped for inclusion in HTML text or attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    push_escaped(&mut out, s);
    out
}
