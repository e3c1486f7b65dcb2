// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Parser for the chat platform's markdown dialect.
//!
//! The parser makes a single left-to-right pass over the input. At each
//! position it tries the recognised constructs in a fixed priority order and
//! falls back to consuming one literal character:
//!
//! 1. literal shrug and backslash escapes
//! 2. fenced code blocks (```` ```lang\ncode``` ````)
//! 3. inline code (``` ``code`` ```, `` `code` ``)
//! 4. formatting: `**bold**`, `__underline__`, `~~strike~~`, `||spoiler||`,
//!    `*italic*`, `_italic_`
//! 5. mentions: `@everyone`, `@here`, `<@id>`, `<@!id>`, `<#id>`, `<@&id>`
//! 6. custom emoji: `<:name:id>`, `<a:name:id>`
//! 7. links: `[title](url)`, `<https://...>`, bare `https://...`
//!
//! Formatting needs a matching closing marker; the span between the markers
//! is parsed again on its own to produce the nested children. Anything that
//! does not match is kept as text, so parsing never fails. Spans nest at most
//! [`MAX_NESTING`] levels deep; deeper markers are kept as text.
//!
//! # Example
//!
//! ```
//! use chatmark::ast::{FormattedNode, Node, TextFormatting};
//! use chatmark::parser::parse;
//!
//! let nodes = parse("Hello **world**");
//! assert_eq!(
//!     nodes,
//!     vec![
//!         Node::text("Hello "),
//!         FormattedNode::wrap(TextFormatting::Bold, Node::text("world")).into(),
//!     ]
//! );
//! ```

use crate::ast::{
    EmojiNode, FormattedNode, InlineCodeBlockNode, LinkNode, MentionNode, MentionType,
    MultilineCodeBlockNode, Node, TextFormatting,
};

/// A matched construct and the number of bytes it consumed.
type Match = (Node, usize);

/// Deepest nesting of formatted spans the parser will build.
pub const MAX_NESTING: usize = 32;

/// Longer markers come first so `**` is not read as two `*`.
const DELIMITERS: [(&str, TextFormatting); 6] = [
    ("**", TextFormatting::Bold),
    ("__", TextFormatting::Underline),
    ("~~", TextFormatting::Strikethrough),
    ("||", TextFormatting::Spoiler),
    ("*", TextFormatting::Italic),
    ("_", TextFormatting::Italic),
];

const MENTION_PREFIXES: [(&str, MentionType); 4] = [
    ("<@&", MentionType::Role),
    ("<@!", MentionType::User),
    ("<@", MentionType::User),
    ("<#", MentionType::Channel),
];

const META_MENTIONS: [&str; 2] = ["everyone", "here"];

const ESCAPABLE: [char; 15] = [
    '\\', '*', '_', '~', '`', '|', '<', '>', '[', ']', '(', ')', '#', '@', ':',
];

const SHRUG: &str = "¯\\_(ツ)_/¯";

/// Parses markdown into an ordered sequence of nodes.
///
/// Never fails: malformed or unmatched markup is returned as text. No two
/// adjacent nodes in the result (or in any nested span) are both
/// [`Node::Text`].
#[must_use]
pub fn parse(input: &str) -> Vec<Node> {
    let nodes = parse_nodes(input, 0);
    tracing::trace!(bytes = input.len(), nodes = nodes.len(), "parsed markdown");
    nodes
}

/// `depth` counts the formatted spans enclosing `input`.
fn parse_nodes(input: &str, depth: usize) -> Vec<Node> {
    let mut nodes = NodeList::default();
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        let consumed = if let Some((node, len)) = match_any(rest, depth) {
            nodes.push(node);
            len
        } else {
            nodes.push_char(ch);
            ch.len_utf8()
        };
        rest = &rest[consumed..];
    }

    nodes.finish()
}

/// Tries each construct in priority order.
fn match_any(s: &str, depth: usize) -> Option<Match> {
    match_shrug(s)
        .or_else(|| match_escape(s))
        .or_else(|| match_code_block(s))
        .or_else(|| match_inline_code(s))
        .or_else(|| match_formatting(s, depth))
        .or_else(|| match_mention(s))
        .or_else(|| match_emoji(s))
        .or_else(|| match_link(s))
}

/// Accumulates nodes, merging consecutive text into a single node.
#[derive(Default)]
struct NodeList {
    nodes: Vec<Node>,
    text: String,
}

impl NodeList {
    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn push(&mut self, node: Node) {
        if let Node::Text(text) = node {
            self.text.push_str(text.text());
        } else {
            self.flush_text();
            self.nodes.push(node);
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.nodes.push(Node::text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush_text();
        self.nodes
    }
}

/// `¯\_(ツ)_/¯` would otherwise lose its backslash and open an italic span.
fn match_shrug(s: &str) -> Option<Match> {
    s.starts_with(SHRUG).then(|| (Node::text(SHRUG), SHRUG.len()))
}

fn match_escape(s: &str) -> Option<Match> {
    let ch = s
        .strip_prefix('\\')?
        .chars()
        .next()
        .filter(|c| ESCAPABLE.contains(c))?;
    Some((Node::text(ch), 1 + ch.len_utf8()))
}

fn match_code_block(s: &str) -> Option<Match> {
    let inner = s.strip_prefix("```")?;
    let end = inner.find("```")?;
    let body = &inner[..end];
    if body.is_empty() {
        return None;
    }

    let (language, code) = match body.split_once('\n') {
        Some((first, code)) if !code.is_empty() && is_language_tag(first) => {
            (Some(first.to_owned()), code)
        }
        _ => (None, body),
    };

    let node = Node::MultilineCode(MultilineCodeBlockNode::new(code, language));
    Some((node, 3 + end + 3))
}

fn is_language_tag(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '+' | '-' | '#'))
}

fn match_inline_code(s: &str) -> Option<Match> {
    ["``", "`"].into_iter().find_map(|fence| {
        let inner = s.strip_prefix(fence)?;
        let end = inner.find(fence)?;
        (end > 0).then(|| {
            let node = Node::InlineCode(InlineCodeBlockNode::new(&inner[..end]));
            (node, fence.len() * 2 + end)
        })
    })
}

fn match_formatting(s: &str, depth: usize) -> Option<Match> {
    if depth >= MAX_NESTING {
        return None;
    }

    match_italic_around_bold(s, depth).or_else(|| {
        DELIMITERS
            .iter()
            .find_map(|&(marker, formatting)| match_delimited(s, marker, formatting, depth))
    })
}

/// `***a** b*` reads as italic around bold when the bold reading would leave
/// its leading `*` unclosed.
fn match_italic_around_bold(s: &str, depth: usize) -> Option<Match> {
    if !s.starts_with("***") || s.starts_with("****") {
        return None;
    }

    let inner = &s[2..];
    let bold_body = &inner[..find_closing(inner, "**")?];
    if find_closing(&bold_body[1..], "*").is_some() {
        return None;
    }
    match_delimited(s, "*", TextFormatting::Italic, depth)
}

fn match_delimited(
    s: &str,
    marker: &str,
    formatting: TextFormatting,
    depth: usize,
) -> Option<Match> {
    let inner = s.strip_prefix(marker)?;
    if matches!(marker, "*" | "_") && inner.starts_with(char::is_whitespace) {
        return None;
    }

    let end = find_closing(inner, marker)?;
    let children = parse_nodes(&inner[..end], depth + 1);
    let node = FormattedNode::new(formatting, children).ok()?;
    Some((node.into(), marker.len() * 2 + end))
}

/// Finds where `marker` closes a span whose body starts at the beginning of
/// `s`. Escapes and code spans are stepped over whole.
fn find_closing(s: &str, marker: &str) -> Option<usize> {
    let mut pos = 0;
    while pos < s.len() {
        let rest = &s[pos..];
        if pos > 0 && rest.starts_with(marker) {
            if accepts_closing(marker, &s[..pos], &rest[marker.len()..]) {
                return Some(pos);
            }
            // A `_` body may not contain `_`, so no later one can close.
            if marker == "_" {
                return None;
            }
        }

        pos += match_escape(rest)
            .or_else(|| match_code_block(rest))
            .or_else(|| match_inline_code(rest))
            .map_or_else(|| rest.chars().next().map_or(1, char::len_utf8), |(_, len)| len);
    }
    None
}

fn accepts_closing(marker: &str, body: &str, after: &str) -> bool {
    match marker {
        "**" => !after.starts_with('*'),
        "__" => !after.starts_with('_'),
        "*" => {
            !after.starts_with('*') && !body.ends_with(|c: char| c.is_whitespace() || c == '*')
        }
        "_" => !body.contains('_') && !after.starts_with(is_word_char),
        _ => true,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn match_mention(s: &str) -> Option<Match> {
    if let Some(rest) = s.strip_prefix('@') {
        return META_MENTIONS
            .into_iter()
            .find(|word| rest.starts_with(*word))
            .map(|word| {
                let node = Node::Mention(MentionNode::new(word, MentionType::Meta));
                (node, 1 + word.len())
            });
    }

    MENTION_PREFIXES.iter().find_map(|&(prefix, kind)| {
        let rest = s.strip_prefix(prefix)?;
        let id = leading_digits(rest)?;
        let tail = rest[id.len()..].strip_prefix('>')?;
        Some((Node::Mention(MentionNode::new(id, kind)), s.len() - tail.len()))
    })
}

fn match_emoji(s: &str) -> Option<Match> {
    let (rest, animated) = match s.strip_prefix("<a:") {
        Some(rest) => (rest, true),
        None => (s.strip_prefix("<:")?, false),
    };

    let name_len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let after_name = rest[name_len..].strip_prefix(':')?;
    let id = leading_digits(after_name)?;
    let tail = after_name[id.len()..].strip_prefix('>')?;

    let node = Node::Emoji(EmojiNode::new(id, name, animated));
    Some((node, s.len() - tail.len()))
}

fn leading_digits(s: &str) -> Option<&str> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

fn match_link(s: &str) -> Option<Match> {
    match_titled_link(s)
        .or_else(|| match_hidden_link(s))
        .or_else(|| match_bare_link(s))
}

/// `[title](url)`
fn match_titled_link(s: &str) -> Option<Match> {
    let inner = s.strip_prefix('[')?;
    let title_end = inner.find("](")?;
    let title = &inner[..title_end];
    let after_title = &inner[title_end + 2..];
    let url_end = after_title.find(')')?;
    let url = &after_title[..url_end];

    if title.is_empty() || !is_web_url(url) || url.contains(char::is_whitespace) {
        return None;
    }

    let tail = &after_title[url_end + 1..];
    Some((Node::Link(LinkNode::new(url, title)), s.len() - tail.len()))
}

/// `<https://...>` suppresses the platform's link preview but is still a link.
fn match_hidden_link(s: &str) -> Option<Match> {
    let inner = s.strip_prefix('<')?;
    let end = inner.find('>')?;
    let url = &inner[..end];
    (is_web_url(url) && !url.contains(char::is_whitespace))
        .then(|| (Node::Link(LinkNode::bare(url)), end + 2))
}

fn match_bare_link(s: &str) -> Option<Match> {
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return None;
    }

    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    let url = trim_url(&s[..end]);
    is_web_url(url).then(|| (Node::Link(LinkNode::bare(url)), url.len()))
}

/// Drops trailing punctuation that belongs to the sentence, not the url.
fn trim_url(mut url: &str) -> &str {
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ':', ';', '"', '\'']);
        let trimmed = match trimmed.strip_suffix(')') {
            Some(shorter) if trimmed.matches(')').count() > trimmed.matches('(').count() => {
                shorter
            }
            _ => trimmed,
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

fn is_web_url(s: &str) -> bool {
    s.strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .is_some_and(|host| !host.is_empty())
}
