//! Effective-role resolution across the scope hierarchy.

use async_trait::async_trait;

use helmgate_core::{AuthResult, ClusterId, UserId};

use crate::role::Role;

/// Read-side view of the permission store.
///
/// The engine only reads assignments; writes belong to the administrative
/// subsystem. Implementations must return **at most one** row — the best
/// match under scope precedence — from a single consistent read, so a
/// concurrent assignment edit can never yield a role stitched together from
/// two different rows. Read-committed isolation is sufficient.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Best-matching assignment for (user, cluster, namespace), if any.
    ///
    /// Precedence: exact (cluster, namespace) first, then the cluster's
    /// namespace-wildcard row. A `None` namespace (cluster-scoped action)
    /// matches only the wildcard row. Failures and timeouts surface as
    /// `StorageUnavailable`; the caller fails closed.
    async fn find_assignment(
        &self,
        user: UserId,
        cluster: ClusterId,
        namespace: Option<&str>,
    ) -> AuthResult<Option<Role>>;
}

/// Resolve the effective role of a principal for a (cluster, namespace).
///
/// The platform-admin flag short-circuits to `admin` before any store read.
/// No matching assignment is an implicit deny (`Role::None`), distinct from
/// a store failure, which propagates as `StorageUnavailable`.
///
/// Platform-wide (`cluster IS NULL`) assignment rows are accepted by the
/// store's write path but deliberately not consulted here; platform-wide
/// access is expressed by the platform-admin flag on the user.
pub async fn resolve_role<S>(
    store: &S,
    user: UserId,
    platform_admin: bool,
    cluster: ClusterId,
    namespace: Option<&str>,
) -> AuthResult<Role>
where
    S: PermissionStore + ?Sized,
{
    if platform_admin {
        return Ok(Role::Admin);
    }

    Ok(store
        .find_assignment(user, cluster, namespace)
        .await?
        .unwrap_or(Role::None))
}
