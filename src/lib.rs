// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Parse chat-platform markdown and render it to HTML or plain text.
//!
//! Chat messages use a small markdown dialect: bold, italic, underline,
//! strikethrough and spoiler spans, inline code and fenced code blocks,
//! mentions of users, channels and roles, custom emoji and links. This
//! crate turns that text into a document tree and renders the tree.
//!
//! # Overview
//!
//! 1. [`parser::parse`] turns message text into a list of [`ast::Node`]s.
//!    It never fails; malformed markup stays as text.
//! 2. [`renderer::render`] walks the nodes and produces HTML or plain text,
//!    resolving mentions through a [`mentions::MentionResolver`].
//!
//! For whole chat logs, [`chatlog`] reads the JSON form, [`grouping`]
//! batches consecutive messages by author and [`export`] renders the lot.
//!
//! # Example
//!
//! ```
//! use chatmark::mentions::Mentionables;
//! use chatmark::{parser, renderer};
//!
//! let nodes = parser::parse("||spoiler|| and `code`");
//! let html = renderer::render(&nodes, &Mentionables::new(), renderer::Format::Html);
//!
//! assert_eq!(
//!     html,
//!     r#"<span class="spoiler">spoiler</span> and <span class="pre pre--inline">code</span>"#
//! );
//! ```
//!
//! # Modules
//!
//! - [`ast`]: node types produced by the parser
//! - [`parser`]: markdown dialect parser
//! - [`renderer`]: HTML and plain text output
//! - [`mentions`]: mention lookup trait and a map-backed implementation
//! - [`chatlog`]: JSON chat log model
//! - [`grouping`]: message grouping by author and time
//! - [`export`]: whole-log rendering

#![deny(missing_docs)]

pub mod ast;
pub mod chatlog;
pub mod export;
pub mod grouping;
pub mod mentions;
pub mod parser;
pub mod renderer;
