// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Document tree produced by the markdown parser.
//!
//! A parsed message is an ordered list of [`Node`] values. Each node kind
//! is its own struct so that the data it carries can only be built through
//! constructors that uphold its invariants; [`Node`] closes over the set of
//! kinds so that renderers must handle every one of them.
//!
//! Nodes are immutable once built. Children are owned exclusively by their
//! parent [`FormattedNode`], which keeps every tree finite and acyclic.

use serde::Serialize;
use snafu::prelude::*;

/// Error type for node construction.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum NodeError {
    /// A formatted span was given no children.
    #[snafu(display("{formatting:?} span must have at least one child"))]
    EmptyFormatting {
        /// The formatting the span would have applied.
        formatting: TextFormatting,
    },
}

/// Inline formatting applied by a [`FormattedNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextFormatting {
    /// `**bold**`
    Bold,
    /// `*italic*` or `_italic_`
    Italic,
    /// `__underline__`
    Underline,
    /// `~~strikethrough~~`
    Strikethrough,
    /// `||spoiler||`
    Spoiler,
}

/// What a [`MentionNode`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MentionType {
    /// Broadcast mentions such as `@everyone` and `@here`.
    ///
    /// The id is the display text; nothing is looked up.
    Meta,
    /// `<@id>` or `<@!id>`
    User,
    /// `<#id>`
    Channel,
    /// `<@&id>`
    Role,
}

/// A single parsed unit of markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    /// A run of literal text.
    Text(TextNode),
    /// Formatting applied to a nested sequence of nodes.
    Formatted(FormattedNode),
    /// A single-line code span.
    InlineCode(InlineCodeBlockNode),
    /// A fenced code block.
    MultilineCode(MultilineCodeBlockNode),
    /// A user, channel, role or broadcast mention.
    Mention(MentionNode),
    /// A custom emoji.
    Emoji(EmojiNode),
    /// A hyperlink.
    Link(LinkNode),
}

impl Node {
    /// Shorthand for a [`Node::Text`].
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextNode::new(text))
    }

    /// Returns the literal content this node contributes, ignoring markup.
    ///
    /// Formatted spans concatenate their children. Mentions contribute their
    /// raw id, emoji their name and links their title.
    #[must_use]
    pub fn literal_text(&self) -> String {
        match self {
            Self::Text(node) => node.text().to_owned(),
            Self::Formatted(node) => node.children().iter().map(Self::literal_text).collect(),
            Self::InlineCode(node) => node.code().to_owned(),
            Self::MultilineCode(node) => node.code().to_owned(),
            Self::Mention(node) => node.id().to_owned(),
            Self::Emoji(node) => node.name().to_owned(),
            Self::Link(node) => node.title().to_owned(),
        }
    }
}

/// Literal text. Never re-parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    text: String,
}

impl TextNode {
    /// Creates a text node.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The literal text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Formatting applied to one or more child nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedNode {
    formatting: TextFormatting,
    children: Vec<Node>,
}

impl FormattedNode {
    /// Creates a formatted span over `children`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::EmptyFormatting`] if `children` is empty.
    pub fn new(formatting: TextFormatting, children: Vec<Node>) -> Result<Self, NodeError> {
        ensure!(!children.is_empty(), EmptyFormattingSnafu { formatting });
        Ok(Self {
            formatting,
            children,
        })
    }

    /// Creates a formatted span around a single child.
    #[must_use]
    pub fn wrap(formatting: TextFormatting, child: Node) -> Self {
        Self {
            formatting,
            children: vec![child],
        }
    }

    /// The formatting this span applies.
    #[must_use]
    pub const fn formatting(&self) -> TextFormatting {
        self.formatting
    }

    /// The nodes inside the span, in order. Never empty.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// A `` `code` `` span. The content is opaque to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineCodeBlockNode {
    code: String,
}

impl InlineCodeBlockNode {
    /// Creates an inline code span.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The verbatim code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// A fenced code block with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultilineCodeBlockNode {
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl MultilineCodeBlockNode {
    /// Creates a code block. An empty language is stored as `None`.
    pub fn new(code: impl Into<String>, language: Option<String>) -> Self {
        Self {
            code: code.into(),
            language: language.filter(|lang| !lang.is_empty()),
        }
    }

    /// The verbatim code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The language tag from the opening fence, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// A reference to a user, channel, role or everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionNode {
    id: String,
    #[serde(rename = "type")]
    kind: MentionType,
}

impl MentionNode {
    /// Creates a mention.
    pub fn new(id: impl Into<String>, kind: MentionType) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// The platform id, or the display text for [`MentionType::Meta`].
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// What the mention refers to.
    #[must_use]
    pub const fn kind(&self) -> MentionType {
        self.kind
    }
}

/// A custom emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmojiNode {
    id: String,
    name: String,
    animated: bool,
}

impl EmojiNode {
    /// Creates a custom emoji reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>, animated: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            animated,
        }
    }

    /// The emoji's platform id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The emoji's short name, without colons.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the emoji is animated (`<a:name:id>`).
    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.animated
    }
}

/// A hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkNode {
    url: String,
    title: String,
}

impl LinkNode {
    /// Creates a link with display text `title`.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// Creates a link whose display text is its url.
    pub fn bare(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: url.clone(),
            url,
        }
    }

    /// The link target.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The display text.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl From<FormattedNode> for Node {
    fn from(node: FormattedNode) -> Self {
        Self::Formatted(node)
    }
}
