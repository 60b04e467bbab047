//! Closed action taxonomy.
//!
//! Requests describe what they want to do as `"<resourceType>:<verb>"`
//! (e.g. `pod:delete`, `node:cordon`), or as a bare read verb (`view`,
//! `list`, `get`) for resource-agnostic reads. Instead of ad-hoc string
//! prefix matching, actions are parsed once into an enumerated
//! (resource kind, verb) pair; anything outside the taxonomy is rejected at
//! the edge and therefore denied.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kubernetes resource kinds the platform manages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pod,
    Deployment,
    StatefulSet,
    Service,
    ConfigMap,
    Secret,
    Ingress,
    Job,
    CronJob,
    Node,
    /// Persistent volume (`pv` on the wire).
    Pv,
    /// Persistent volume claim (`pvc` on the wire).
    Pvc,
    StorageClass,
    Namespace,
}

impl ResourceKind {
    /// All kinds, for table construction and property tests.
    pub const ALL: [ResourceKind; 14] = [
        ResourceKind::Pod,
        ResourceKind::Deployment,
        ResourceKind::StatefulSet,
        ResourceKind::Service,
        ResourceKind::ConfigMap,
        ResourceKind::Secret,
        ResourceKind::Ingress,
        ResourceKind::Job,
        ResourceKind::CronJob,
        ResourceKind::Node,
        ResourceKind::Pv,
        ResourceKind::Pvc,
        ResourceKind::StorageClass,
        ResourceKind::Namespace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "pod",
            ResourceKind::Deployment => "deployment",
            ResourceKind::StatefulSet => "statefulset",
            ResourceKind::Service => "service",
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::Secret => "secret",
            ResourceKind::Ingress => "ingress",
            ResourceKind::Job => "job",
            ResourceKind::CronJob => "cronjob",
            ResourceKind::Node => "node",
            ResourceKind::Pv => "pv",
            ResourceKind::Pvc => "pvc",
            ResourceKind::StorageClass => "storageclass",
            ResourceKind::Namespace => "namespace",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| ActionParseError::UnknownResource(s.to_string()))
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is being done to the resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    View,
    List,
    Get,
    Create,
    Update,
    Delete,
    Exec,
    Logs,
    Scale,
    Restart,
    Rollback,
    Apply,
    Cordon,
    Uncordon,
    Drain,
}

impl Verb {
    pub const ALL: [Verb; 15] = [
        Verb::View,
        Verb::List,
        Verb::Get,
        Verb::Create,
        Verb::Update,
        Verb::Delete,
        Verb::Exec,
        Verb::Logs,
        Verb::Scale,
        Verb::Restart,
        Verb::Rollback,
        Verb::Apply,
        Verb::Cordon,
        Verb::Uncordon,
        Verb::Drain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::View => "view",
            Verb::List => "list",
            Verb::Get => "get",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::Exec => "exec",
            Verb::Logs => "logs",
            Verb::Scale => "scale",
            Verb::Restart => "restart",
            Verb::Rollback => "rollback",
            Verb::Apply => "apply",
            Verb::Cordon => "cordon",
            Verb::Uncordon => "uncordon",
            Verb::Drain => "drain",
        }
    }

    /// Read verbs never mutate cluster state; everything else is recorded
    /// for audit unconditionally.
    pub fn is_read(&self) -> bool {
        matches!(self, Verb::View | Verb::List | Verb::Get)
    }
}

impl FromStr for Verb {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| ActionParseError::UnknownVerb(s.to_string()))
    }
}

impl core::fmt::Display for Verb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    #[error("bare verb '{0}' must be one of view/list/get")]
    BareVerbNotRead(String),

    #[error("empty action")]
    Empty,
}

/// A validated action: what is being done, to which kind of resource.
///
/// `resource: None` is a bare read (`view`/`list`/`get` with no resource
/// prefix); the parser guarantees a bare action always carries a read verb.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub resource: Option<ResourceKind>,
    pub verb: Verb,
}

impl Action {
    pub fn on(resource: ResourceKind, verb: Verb) -> Self {
        Self {
            resource: Some(resource),
            verb,
        }
    }

    /// A bare read action (no resource prefix).
    pub fn bare_read(verb: Verb) -> Result<Self, ActionParseError> {
        if !verb.is_read() {
            return Err(ActionParseError::BareVerbNotRead(verb.as_str().to_string()));
        }
        Ok(Self {
            resource: None,
            verb,
        })
    }

    /// Parse `"<resourceType>:<verb>"` or a bare read verb.
    pub fn parse(s: &str) -> Result<Self, ActionParseError> {
        if s.is_empty() {
            return Err(ActionParseError::Empty);
        }
        match s.split_once(':') {
            Some((resource, verb)) => Ok(Self {
                resource: Some(resource.parse()?),
                verb: verb.parse()?,
            }),
            None => Self::bare_read(s.parse()?),
        }
    }

    pub fn is_read(&self) -> bool {
        self.verb.is_read()
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.resource {
            Some(kind) => write!(f, "{}:{}", kind, self.verb),
            None => f.write_str(self.verb.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_action() {
        let action = Action::parse("pod:delete").unwrap();
        assert_eq!(action, Action::on(ResourceKind::Pod, Verb::Delete));
        assert_eq!(action.to_string(), "pod:delete");
    }

    #[test]
    fn parses_bare_read_verbs() {
        for verb in ["view", "list", "get"] {
            let action = Action::parse(verb).unwrap();
            assert_eq!(action.resource, None);
            assert!(action.is_read());
        }
    }

    #[test]
    fn rejects_bare_mutating_verb() {
        assert_eq!(
            Action::parse("delete"),
            Err(ActionParseError::BareVerbNotRead("delete".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!(matches!(
            Action::parse("flux-capacitor:create"),
            Err(ActionParseError::UnknownResource(_))
        ));
        assert!(matches!(
            Action::parse("pod:teleport"),
            Err(ActionParseError::UnknownVerb(_))
        ));
        assert_eq!(Action::parse(""), Err(ActionParseError::Empty));
    }

    #[test]
    fn display_round_trips() {
        for kind in ResourceKind::ALL {
            for verb in Verb::ALL {
                let action = Action::on(kind, verb);
                assert_eq!(Action::parse(&action.to_string()).unwrap(), action);
            }
        }
    }
}
