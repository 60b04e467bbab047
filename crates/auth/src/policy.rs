//! Role policy: pure (role, action) → allow/deny.

use std::collections::HashSet;

use crate::action::{Action, ResourceKind, Verb};
use crate::role::Role;

/// Data-driven per-role allow/deny tables.
///
/// `can_perform` is a pure function: no IO, no hidden state, no panics. It is
/// evaluated on the authoritative server path; any client-side mirror of it
/// (UI affordance) is a convenience only and **never** a security boundary —
/// the decision that counts is always recomputed server-side against freshly
/// resolved role data.
///
/// The dev allow-list and ops deny-list are data so administrators can extend
/// them without touching the match below.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    dev_allowed: HashSet<ResourceKind>,
    ops_denied: HashSet<Action>,
}

impl PolicyTable {
    pub fn new(
        dev_allowed: impl IntoIterator<Item = ResourceKind>,
        ops_denied: impl IntoIterator<Item = Action>,
    ) -> Self {
        Self {
            dev_allowed: dev_allowed.into_iter().collect(),
            ops_denied: ops_denied.into_iter().collect(),
        }
    }

    /// Resource kinds the `dev` role may act on, regardless of verb.
    pub fn dev_allowed(&self) -> &HashSet<ResourceKind> {
        &self.dev_allowed
    }

    /// Actions the `ops` role is explicitly denied.
    pub fn ops_denied(&self) -> &HashSet<Action> {
        &self.ops_denied
    }

    /// Decide whether `role` may perform `action`.
    ///
    /// Rules, in priority order:
    /// - `admin`: always allowed.
    /// - `readonly`: bare read verbs (`view`/`list`/`get`) only.
    /// - `dev`: any verb on an allow-listed resource kind, plus bare reads.
    /// - `ops`: everything except the deny-list.
    /// - `none`: always denied.
    pub fn can_perform(&self, role: Role, action: &Action) -> bool {
        match role {
            Role::Admin => true,
            Role::ReadOnly => action.resource.is_none() && action.verb.is_read(),
            Role::Dev => match action.resource {
                Some(kind) => self.dev_allowed.contains(&kind),
                None => action.verb.is_read(),
            },
            Role::Ops => !self.ops_denied.contains(action),
            Role::None => false,
        }
    }
}

impl Default for PolicyTable {
    /// The platform's stock tables: dev owns workload-level kinds, ops is
    /// kept away from irreversible node/storage operations.
    fn default() -> Self {
        Self::new(
            [
                ResourceKind::Pod,
                ResourceKind::Deployment,
                ResourceKind::StatefulSet,
                ResourceKind::Service,
                ResourceKind::ConfigMap,
                ResourceKind::Secret,
                ResourceKind::Ingress,
                ResourceKind::Job,
                ResourceKind::CronJob,
            ],
            [
                Action::on(ResourceKind::Node, Verb::Cordon),
                Action::on(ResourceKind::Node, Verb::Uncordon),
                Action::on(ResourceKind::Node, Verb::Drain),
                Action::on(ResourceKind::Pv, Verb::Delete),
                Action::on(ResourceKind::StorageClass, Verb::Delete),
            ],
        )
    }
}
