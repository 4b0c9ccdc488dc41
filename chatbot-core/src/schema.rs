//! Declarative persistence mapping.
//!
//! Lists every table the platform owns, which of them carry the soft-delete
//! flag and the `updated_at` stamp, and the delete rule of every foreign key.
//! The same rules are declared as constraints in `migrations/`; the table here
//! lets the repository check `Restrict` relations before issuing a DELETE so
//! callers get a [`crate::PlatformError::Restricted`] naming the dependents.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Client,
    User,
    Chatbot,
    Document,
    Conversation,
    Message,
    Lead,
    UsageMetric,
}

impl Entity {
    pub const ALL: [Entity; 8] = [
        Entity::Client,
        Entity::User,
        Entity::Chatbot,
        Entity::Document,
        Entity::Conversation,
        Entity::Message,
        Entity::Lead,
        Entity::UsageMetric,
    ];

    pub const fn table(self) -> &'static str {
        match self {
            Entity::Client => "clients",
            Entity::User => "users",
            Entity::Chatbot => "chatbots",
            Entity::Document => "documents",
            Entity::Conversation => "conversations",
            Entity::Message => "messages",
            Entity::Lead => "leads",
            Entity::UsageMetric => "usage_metrics",
        }
    }

    /// Users belong to the identity subsystem and are never soft-deleted.
    pub const fn soft_deletable(self) -> bool {
        !matches!(self, Entity::User)
    }

    pub const fn tracks_updates(self) -> bool {
        !matches!(self, Entity::User)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Client => "client",
            Entity::User => "user",
            Entity::Chatbot => "chatbot",
            Entity::Document => "document",
            Entity::Conversation => "conversation",
            Entity::Message => "message",
            Entity::Lead => "lead",
            Entity::UsageMetric => "usage metric",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRule {
    /// Children are deleted with the parent.
    Cascade,
    /// The parent cannot be deleted while children exist.
    Restrict,
    /// The child's reference is cleared.
    SetNull,
}

/// A foreign key from `child.column` to `parent.id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub parent: Entity,
    pub child: Entity,
    pub column: &'static str,
    pub rule: DeleteRule,
}

const fn rel(parent: Entity, child: Entity, column: &'static str, rule: DeleteRule) -> Relation {
    Relation {
        parent,
        child,
        column,
        rule,
    }
}

pub const RELATIONS: &[Relation] = &[
    rel(Entity::Client, Entity::User, "client_id", DeleteRule::Restrict),
    rel(Entity::Client, Entity::Chatbot, "client_id", DeleteRule::Restrict),
    rel(Entity::Client, Entity::Lead, "client_id", DeleteRule::Restrict),
    rel(Entity::Client, Entity::UsageMetric, "client_id", DeleteRule::Cascade),
    rel(Entity::Chatbot, Entity::Document, "chatbot_id", DeleteRule::Cascade),
    rel(Entity::Chatbot, Entity::Conversation, "chatbot_id", DeleteRule::Restrict),
    rel(Entity::Chatbot, Entity::Lead, "chatbot_id", DeleteRule::Restrict),
    rel(Entity::Chatbot, Entity::UsageMetric, "chatbot_id", DeleteRule::Cascade),
    rel(Entity::Conversation, Entity::Message, "conversation_id", DeleteRule::Cascade),
    rel(Entity::Lead, Entity::Conversation, "lead_id", DeleteRule::SetNull),
];

pub fn relations_from(parent: Entity) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.parent == parent)
}

pub fn restricting(parent: Entity) -> impl Iterator<Item = &'static Relation> {
    relations_from(parent).filter(|r| r.rule == DeleteRule::Restrict)
}

/// Every entity whose rows disappear when a `parent` row is deleted, following
/// cascades transitively.
pub fn cascade_closure(parent: Entity) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut frontier = vec![parent];
    while let Some(next) = frontier.pop() {
        for r in relations_from(next).filter(|r| r.rule == DeleteRule::Cascade) {
            if !out.contains(&r.child) {
                out.push(r.child);
                frontier.push(r.child);
            }
        }
    }
    out
}
