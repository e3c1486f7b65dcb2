// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for chatmark parsing and rendering.

use chatmark::ast::{FormattedNode, MentionType, Node, TextFormatting};
use chatmark::mentions::{Channel, MentionResolver, Role, User};
use chatmark::renderer::Format;
use chatmark::{chatlog, export, parser, renderer};
use std::collections::HashMap;
use std::fs;
use std::process::Command;

/// Canned resolver that only knows users.
#[derive(Default)]
struct UsersOnly {
    users: HashMap<String, User>,
}

impl UsersOnly {
    fn with(id: &str, name: &str) -> Self {
        let mut resolver = Self::default();
        resolver.users.insert(
            id.to_owned(),
            User {
                id: id.to_owned(),
                name: name.to_owned(),
                discriminator: None,
            },
        );
        resolver
    }
}

impl MentionResolver for UsersOnly {
    fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    fn channel(&self, _id: &str) -> Option<&Channel> {
        None
    }

    fn role(&self, _id: &str) -> Option<&Role> {
        None
    }
}

const SAMPLE_LOG: &str = r#"{
    "guild": "Rustaceans",
    "channel": "general",
    "mentionables": {
        "users": [{ "id": "42", "name": "Alice", "discriminator": "0001" }],
        "channels": [{ "id": "7", "name": "help" }]
    },
    "messages": [
        {
            "id": "1",
            "author": { "id": "42", "name": "Alice", "discriminator": "0001" },
            "timestamp": "2024-12-05T10:00:00Z",
            "content": "Hello **world**, see <#7>"
        },
        {
            "id": "2",
            "author": { "id": "43", "name": "Bob" },
            "timestamp": "2024-12-05T10:01:00Z",
            "content": "<script>alert(1)</script> ||boo||"
        }
    ]
}"#;

/// Renders the example message from the crate documentation end to end.
#[test]
fn renders_mixed_message_with_resolver() {
    let nodes = parser::parse("Hello **world**, check <@42>!");
    let html = renderer::render(&nodes, &UsersOnly::with("42", "Alice"), Format::Html);

    assert_eq!(
        html,
        r#"Hello <b>world</b>, check <span class="mention" title="Alice">@Alice</span>!"#
    );
}

/// Tests that a custom resolver's misses degrade to the raw id.
#[test]
fn resolver_misses_fall_back() {
    let nodes = parser::parse("<@1> <#2> <@&3> @here");
    let html = renderer::render(&nodes, &UsersOnly::default(), Format::Html);

    assert!(html.contains("@1</span>"));
    assert!(html.contains("#2</span>"));
    assert!(html.contains("@3</span>"));
    assert!(html.contains(r#"<span class="mention">@here</span>"#));
}

/// Tests precedence between overlapping constructs.
#[test]
fn code_wins_over_formatting_and_mentions() {
    let nodes = parser::parse("`**<@1>**` **`x`**");

    assert!(matches!(&nodes[0], Node::InlineCode(code) if code.code() == "**<@1>**"));
    match &nodes[2] {
        Node::Formatted(span) => {
            assert_eq!(span.formatting(), TextFormatting::Bold);
            assert!(matches!(&span.children()[0], Node::InlineCode(code) if code.code() == "x"));
        }
        other => panic!("Expected bold span, got {other:?}"),
    }
}

/// Tests that formatting nests inside spoilers and mentions inside formatting.
#[test]
fn parses_deeply_nested_content() {
    let nodes = parser::parse("||**<@42> *and* ~~x~~**||");
    let Node::Formatted(spoiler) = &nodes[0] else {
        panic!("Expected spoiler, got {nodes:?}");
    };
    let Node::Formatted(bold) = &spoiler.children()[0] else {
        panic!("Expected bold, got {spoiler:?}");
    };

    assert_eq!(spoiler.formatting(), TextFormatting::Spoiler);
    assert_eq!(bold.formatting(), TextFormatting::Bold);
    assert!(matches!(&bold.children()[0], Node::Mention(m) if m.kind() == MentionType::User));
    assert_eq!(
        bold.children()[2],
        FormattedNode::wrap(TextFormatting::Italic, Node::text("and")).into()
    );
}

/// Tests that garbage input never panics and keeps every character.
#[test]
fn malformed_input_degrades_to_text() {
    for input in ["**", "*", "||a", "<@", "<:x:", "[a](", "```", "~~~", "__a", "\\"] {
        let nodes = parser::parse(input);
        let text: String = nodes.iter().map(Node::literal_text).collect();
        assert_eq!(text, input, "input: {input:?}");
    }
}

/// Tests that long runs of markup parse and render without exhausting the stack.
#[test]
fn renders_long_marker_runs() {
    for marker in ["*", "_", "~", "|", "`"] {
        let input = marker.repeat(50_000) + " done";
        let nodes = parser::parse(&input);
        let html = renderer::render(&nodes, &UsersOnly::default(), Format::Html);
        assert!(html.ends_with(" done"), "marker: {marker:?}");
    }
}

/// Tests a whole chat log through the export pipeline.
#[test]
fn exports_sample_log() {
    let log = chatlog::parse_chat_log(SAMPLE_LOG).unwrap();
    let html = export::render_chat_log(&log, &export::ExportOptions::default());

    assert!(html.contains("Rustaceans / #general"));
    assert!(html.contains("Hello <b>world</b>, see <span class=\"mention\">#help</span>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains(r#"<span class="spoiler">boo</span>"#));
    assert_eq!(html.matches("chatlog__message-group").count(), 2);
}

/// Runs the binary against a sample log and checks the written file.
#[test]
fn cli_writes_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("general.json");
    let out_dir = dir.path().join("out");
    fs::write(&input, SAMPLE_LOG).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_chatmark"))
        .arg("-q")
        .arg("-o")
        .arg(&out_dir)
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());

    let html = fs::read_to_string(out_dir.join("general.html")).unwrap();
    assert!(html.contains("<b>world</b>"));
}

/// Runs the binary in plain text mode writing to stdout.
#[test]
fn cli_writes_text_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("general.json");
    fs::write(&input, SAMPLE_LOG).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_chatmark"))
        .args(["--format", "text", "--hide-timestamps", "-o", "-"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.starts_with("# Rustaceans / #general\n"));
    assert!(text.contains("== Alice#0001 ==\nHello world, see #help\n"));
}

/// Runs the binary in AST mode and checks the JSON shape.
#[test]
fn cli_dumps_ast() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("general.json");
    fs::write(&input, SAMPLE_LOG).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_chatmark"))
        .args(["--format", "ast", "-o", "-"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let documents: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(documents.as_array().map(Vec::len), Some(2));
    assert_eq!(documents[0][1]["kind"], "formatted");
    assert_eq!(documents[0][1]["formatting"], "bold");
    assert_eq!(documents[0][3]["kind"], "mention");
}

/// Tests that existing output is kept without --force.
#[test]
fn cli_skips_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("general.json");
    let out_dir = dir.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();
    fs::write(&input, SAMPLE_LOG).unwrap();
    fs::write(out_dir.join("general.html"), "keep me").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_chatmark"))
        .arg("-o")
        .arg(&out_dir)
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());

    assert_eq!(
        fs::read_to_string(out_dir.join("general.html")).unwrap(),
        "keep me"
    );
}

/// Tests that a malformed log is reported as an error.
#[test]
fn cli_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, "{ not json").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_chatmark"))
        .args(["-o", "-"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(!output.status.success());
}
