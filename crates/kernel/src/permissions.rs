//! Permission service and item-level access checks.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::content::ItemService;
use crate::error::{KernelError, KernelResult};
use crate::tap::TapDispatcher;
use marquee_sdk::host::AccessCheck;
use marquee_sdk::types::{ADMINISTER_SITE, PermissionDefinition, UserContext};

/// Well-known role names.
pub mod well_known {
    /// Role every anonymous visitor has.
    pub const ANONYMOUS_ROLE: &str = "anonymous user";
    /// Role every logged-in user has in addition to their own roles.
    pub const AUTHENTICATED_ROLE: &str = "authenticated user";
}

/// Permission service with DashMap-based role grants.
#[derive(Clone)]
pub struct PermissionService {
    inner: Arc<PermissionServiceInner>,
}

struct PermissionServiceInner {
    /// Every permission a plugin (or the kernel) has declared.
    known: DashMap<String, PermissionDefinition>,

    /// Role name -> granted permissions.
    roles: DashMap<String, HashSet<String>>,
}

impl PermissionService {
    /// Create a permission service that knows only `administer site`.
    pub fn new() -> Self {
        let service = Self {
            inner: Arc::new(PermissionServiceInner {
                known: DashMap::new(),
                roles: DashMap::new(),
            }),
        };
        service.register(PermissionDefinition::new(
            ADMINISTER_SITE,
            "Full access to every part of the site",
        ));
        service
    }

    /// Collect permission definitions from plugins via tap_perm.
    pub fn sync_from_plugins(&self, dispatcher: &TapDispatcher) -> usize {
        let mut count = 0;
        for result in dispatcher.perm() {
            for def in result.output {
                if self.is_known(&def.name) {
                    warn!(
                        plugin = %result.plugin_name,
                        permission = %def.name,
                        "permission already declared"
                    );
                    continue;
                }
                self.register(def);
                count += 1;
            }
        }
        info!(count, "permissions synced from plugins");
        count
    }

    /// Declare a permission.
    pub fn register(&self, def: PermissionDefinition) {
        debug!(permission = %def.name, "registered permission");
        self.inner.known.insert(def.name.clone(), def);
    }

    /// Whether a permission has been declared.
    pub fn is_known(&self, permission: &str) -> bool {
        self.inner.known.contains_key(permission)
    }

    /// All declared permissions, sorted by name.
    pub fn definitions(&self) -> Vec<PermissionDefinition> {
        let mut defs: Vec<_> = self.inner.known.iter().map(|r| r.value().clone()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Grant a declared permission to a role.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::UnknownPermission`] if no plugin declared it.
    pub fn grant(&self, role: &str, permission: &str) -> KernelResult<()> {
        if !self.is_known(permission) {
            return Err(KernelError::UnknownPermission(permission.to_string()));
        }
        self.inner
            .roles
            .entry(role.to_string())
            .or_default()
            .insert(permission.to_string());
        info!(role = %role, permission = %permission, "permission granted");
        Ok(())
    }

    /// Remove a permission from a role. Returns whether it was granted.
    pub fn revoke(&self, role: &str, permission: &str) -> bool {
        self.inner
            .roles
            .get_mut(role)
            .is_some_and(|mut perms| perms.remove(permission))
    }

    /// Permissions granted to a role, sorted.
    pub fn role_permissions(&self, role: &str) -> Vec<String> {
        let mut perms: Vec<_> = self
            .inner
            .roles
            .get(role)
            .map(|p| p.iter().cloned().collect())
            .unwrap_or_default();
        perms.sort();
        perms
    }

    /// Resolve the request context for a user holding `roles`.
    ///
    /// The nil ID is the anonymous user and only gets the anonymous role.
    /// Everyone else also gets the authenticated role.
    pub fn user_context(&self, user_id: Uuid, roles: &[&str]) -> UserContext {
        if user_id.is_nil() {
            let mut ctx = UserContext::anonymous();
            ctx.permissions = self.role_permissions(well_known::ANONYMOUS_ROLE);
            return ctx;
        }

        let permissions: BTreeSet<String> = roles
            .iter()
            .copied()
            .chain([well_known::AUTHENTICATED_ROLE])
            .flat_map(|role| self.role_permissions(role))
            .collect();

        UserContext::authenticated(user_id, permissions.into_iter().collect())
    }
}

impl Default for PermissionService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService")
            .field("known", &self.inner.known.len())
            .field("roles", &self.inner.roles.len())
            .finish()
    }
}

/// Edit access to stored items, by content type and authorship.
///
/// - Admins may edit everything.
/// - `edit any {type} content` allows editing any item of that type.
/// - `edit own {type} content` allows editing items the user authored.
#[derive(Debug, Clone)]
pub struct ItemAccess {
    items: ItemService,
}

impl ItemAccess {
    pub fn new(items: ItemService) -> Self {
        Self { items }
    }
}

impl AccessCheck for ItemAccess {
    fn can_edit(&self, user: &UserContext, item_id: Uuid) -> bool {
        let Some(item) = self.items.load(item_id) else {
            return false;
        };

        if user.is_admin() {
            return true;
        }

        if user.has_permission(&format!("edit any {} content", item.item_type)) {
            return true;
        }

        user.authenticated
            && item.author_id == user.id
            && user.has_permission(&format!("edit own {} content", item.item_type))
    }
}
