//! The (cluster, namespace) pair an authorization decision applies to.

use serde::{Deserialize, Serialize};

use crate::ClusterId;

/// Scope of a permission assignment or an authorization decision.
///
/// A `None` component denotes a wildcard at that level: `namespace: None`
/// covers every namespace of the cluster, `cluster: None` covers every
/// cluster. Scopes are immutable values compared by their components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub cluster: Option<ClusterId>,
    pub namespace: Option<String>,
}

impl Scope {
    /// Scope covering a single namespace of a single cluster.
    pub fn namespaced(cluster: ClusterId, namespace: impl Into<String>) -> Self {
        Self {
            cluster: Some(cluster),
            namespace: Some(namespace.into()),
        }
    }

    /// Scope covering every namespace of a single cluster.
    pub fn cluster_wide(cluster: ClusterId) -> Self {
        Self {
            cluster: Some(cluster),
            namespace: None,
        }
    }

    /// Scope covering every cluster.
    pub fn platform_wide() -> Self {
        Self {
            cluster: None,
            namespace: None,
        }
    }

    /// Whether this scope covers the given (cluster, namespace) request.
    ///
    /// Wildcard components cover anything at their level; a namespace-less
    /// request is only covered by namespace-wildcard scopes.
    pub fn covers(&self, cluster: ClusterId, namespace: Option<&str>) -> bool {
        let cluster_ok = match self.cluster {
            Some(c) => c == cluster,
            None => true,
        };
        let namespace_ok = match (&self.namespace, namespace) {
            (None, _) => true,
            (Some(own), Some(req)) => own == req,
            (Some(_), None) => false,
        };
        cluster_ok && namespace_ok
    }
}
