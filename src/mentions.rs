// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Lookup of the users, channels and roles that mentions refer to.
//!
//! The renderer never fetches anything itself. It asks a [`MentionResolver`]
//! for display metadata and falls back to the raw id when the resolver has
//! nothing, since deleted or uncached entities are routine in chat history.

use serde::Deserialize;
use std::collections::HashMap;

/// Read-only lookup of mentionable entities by platform id.
///
/// Implementations return `None` for ids they do not know about.
pub trait MentionResolver {
    /// Looks up a user.
    fn user(&self, id: &str) -> Option<&User>;

    /// Looks up a channel.
    fn channel(&self, id: &str) -> Option<&Channel>;

    /// Looks up a role.
    fn role(&self, id: &str) -> Option<&Role>;
}

/// A chat user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Platform id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Legacy four-digit discriminator, absent for migrated accounts.
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl User {
    /// Returns the name qualified by the discriminator, e.g. `alice#0001`.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.discriminator.as_deref() {
            Some(tag) if !tag.is_empty() && tag != "0" => format!("{}#{tag}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// A text or voice channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    /// Platform id.
    pub id: String,

    /// Channel name, without the leading `#`.
    pub name: String,
}

/// A server role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Role {
    /// Platform id.
    pub id: String,

    /// Role name.
    pub name: String,
}

/// Everything a chat log can mention, indexed by id.
///
/// Deserializes from lists of users, channels and roles:
///
/// ```
/// use chatmark::mentions::{MentionResolver, Mentionables};
///
/// let json = r#"{ "users": [{ "id": "42", "name": "Alice" }] }"#;
/// let mentionables: Mentionables = serde_json::from_str(json).unwrap();
///
/// assert_eq!(mentionables.user("42").unwrap().name, "Alice");
/// assert!(mentionables.channel("1").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "MentionableLists")]
pub struct Mentionables {
    users: HashMap<String, User>,
    channels: HashMap<String, Channel>,
    roles: HashMap<String, Role>,
}

#[derive(Deserialize)]
struct MentionableLists {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    roles: Vec<Role>,
}

impl From<MentionableLists> for Mentionables {
    fn from(lists: MentionableLists) -> Self {
        let mut mentionables = Self::default();
        lists.users.into_iter().for_each(|u| mentionables.add_user(u));
        lists.channels.into_iter().for_each(|c| mentionables.add_channel(c));
        lists.roles.into_iter().for_each(|r| mentionables.add_role(r));
        mentionables
    }
}

impl Mentionables {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Adds or replaces a channel.
    pub fn add_channel(&mut self, channel: Channel) {
        self.channels.insert(channel.id.clone(), channel);
    }

    /// Adds or replaces a role.
    pub fn add_role(&mut self, role: Role) {
        self.roles.insert(role.id.clone(), role);
    }
}

impl MentionResolver for Mentionables {
    fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels.get(id)
    }

    fn role(&self, id: &str) -> Option<&Role> {
        self.roles.get(id)
    }
}
