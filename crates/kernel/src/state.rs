//! Kernel state shared across all request handlers.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::content::{
    ContentTypeRegistry, ItemService, MetaStorage, NewItem, PlainTextSanitizer, UpdateItem,
};
use crate::error::{KernelError, KernelResult};
use crate::form::CsrfTokenStore;
use crate::permissions::{ItemAccess, PermissionService};
use crate::plugin::PluginRuntime;
use crate::tap::{RequestState, TapDispatcher, TapRegistry};
use crate::theme::ThemeEngine;
use marquee_sdk::Plugin;
use marquee_sdk::host::TapContext;
use marquee_sdk::types::{Item, SaveRequest, UserContext};

/// The assembled kernel.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct Kernel {
    inner: Arc<KernelInner>,
}

struct KernelInner {
    config: Config,

    /// Plugin runtime.
    plugin_runtime: Arc<PluginRuntime>,

    /// Tap dispatcher (owns the tap registry).
    tap_dispatcher: TapDispatcher,

    /// Content type registry.
    content_types: ContentTypeRegistry,

    /// Permission service for access control.
    permissions: PermissionService,

    /// Item service (also owns attribute storage).
    items: ItemService,

    /// Item-level edit checks lent to plugins.
    access: ItemAccess,

    /// Anti-forgery tokens, per session.
    csrf: CsrfTokenStore,

    /// Plain-text coercion lent to plugins.
    sanitizer: PlainTextSanitizer,

    /// Theme engine for template rendering.
    theme: ThemeEngine,
}

/// Builder collecting plugins before the kernel is assembled.
pub struct KernelBuilder {
    config: Config,
    plugins: Vec<(String, Arc<dyn Plugin>)>,
}

impl KernelBuilder {
    /// Register a plugin together with its `.info.toml` manifest.
    pub fn plugin(mut self, manifest: &str, plugin: impl Plugin + 'static) -> Self {
        let plugin: Arc<dyn Plugin> = Arc::new(plugin);
        self.plugins.push((manifest.to_string(), plugin));
        self
    }

    /// Assemble the kernel.
    ///
    /// # Errors
    ///
    /// Fails on invalid or conflicting plugin manifests, missing or circular
    /// plugin dependencies, and unusable template overrides.
    pub fn build(self) -> KernelResult<Kernel> {
        let mut runtime = PluginRuntime::new();
        for (manifest, plugin) in self.plugins {
            runtime.register(&manifest, plugin)?;
        }
        let plugin_runtime = Arc::new(runtime);

        let tap_registry = Arc::new(TapRegistry::from_plugins(&plugin_runtime)?);
        let tap_dispatcher = TapDispatcher::new(Arc::clone(&tap_registry));

        let content_types = ContentTypeRegistry::new();
        content_types.sync_from_plugins(&tap_dispatcher);

        let permissions = PermissionService::new();
        permissions.sync_from_plugins(&tap_dispatcher);

        let items = ItemService::new(content_types.clone(), MetaStorage::new());
        let access = ItemAccess::new(items.clone());

        let theme = match &self.config.template_dir {
            Some(dir) => ThemeEngine::with_overrides(dir).map_err(KernelError::Config)?,
            None => ThemeEngine::new().map_err(KernelError::Render)?,
        };

        info!(
            plugins = plugin_runtime.plugin_count(),
            taps = tap_registry.tap_count(),
            content_types = content_types.len(),
            "kernel initialized"
        );

        Ok(Kernel {
            inner: Arc::new(KernelInner {
                csrf: CsrfTokenStore::from_config(&self.config),
                config: self.config,
                plugin_runtime,
                tap_dispatcher,
                content_types,
                permissions,
                items,
                access,
                sanitizer: PlainTextSanitizer::new(),
                theme,
            }),
        })
    }
}

impl Kernel {
    /// Start building a kernel.
    pub fn builder(config: Config) -> KernelBuilder {
        KernelBuilder {
            config,
            plugins: Vec::new(),
        }
    }

    /// Open a request for `user` in a fresh session.
    pub fn request(&self, user: UserContext) -> RequestState {
        RequestState::new(user)
    }

    /// Resolve the context of a user holding `roles`.
    pub fn user(&self, user_id: Uuid, roles: &[&str]) -> UserContext {
        self.inner.permissions.user_context(user_id, roles)
    }

    /// Create an item of a registered content type.
    pub fn create_item(&self, input: NewItem) -> KernelResult<Item> {
        self.inner.items.create(input)
    }

    pub fn load_item(&self, id: Uuid) -> Option<Item> {
        self.inner.items.load(id)
    }

    pub fn update_item(&self, id: Uuid, input: UpdateItem) -> KernelResult<Item> {
        self.inner.items.update(id, input)
    }

    /// Delete an item and all of its attributes.
    pub fn delete_item(&self, id: Uuid) -> bool {
        self.inner.items.delete(id)
    }

    /// Render the plugin panels of an item's edit screen.
    ///
    /// # Errors
    ///
    /// [`KernelError::NotFound`] for an unknown item, [`KernelError::Render`]
    /// if a panel cannot be rendered. Failing plugins are logged and skipped.
    pub fn edit_form(&self, request: &RequestState, item_id: Uuid) -> KernelResult<String> {
        let item = self.inner.items.require(item_id)?;

        let panels = self.with_context(request, |ctx| {
            self.inner.tap_dispatcher.item_form(ctx, &item)
        });
        debug!(item_id = %item_id, panels = panels.len(), "rendering edit form");

        self.inner
            .theme
            .render_all(panels.iter().map(|p| &p.output))
            .map_err(KernelError::Render)
    }

    /// Hand a submitted save to every plugin.
    ///
    /// # Errors
    ///
    /// [`KernelError::NotFound`] for an unknown item; [`KernelError::Tap`]
    /// when a plugin fails (for example, storage is unavailable).
    pub fn save_item(&self, request: &RequestState, save: &SaveRequest) -> KernelResult<()> {
        let item = self.inner.items.require(save.item_id)?;

        debug!(
            item_id = %item.id,
            kind = ?save.kind,
            fields = save.values.len(),
            "dispatching save"
        );

        self.with_context(request, |ctx| {
            self.inner.tap_dispatcher.item_save(ctx, &item, save)
        })
    }

    /// Render an item: plugin blocks first, then the body.
    ///
    /// With no plugin blocks the body is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`KernelError::NotFound`] for an unknown item, [`KernelError::Render`]
    /// if a block cannot be rendered.
    pub fn view_item(&self, request: &RequestState, item_id: Uuid) -> KernelResult<String> {
        let item = self.inner.items.require(item_id)?;

        let blocks = self.with_context(request, |ctx| {
            self.inner.tap_dispatcher.item_view(ctx, &item)
        });
        if blocks.is_empty() {
            return Ok(item.body);
        }

        let mut html = self
            .inner
            .theme
            .render_all(blocks.iter().map(|b| &b.output))
            .map_err(KernelError::Render)?;
        html.push_str(&item.body);
        Ok(html)
    }

    /// Build the per-call host services for a request.
    fn with_context<R>(&self, request: &RequestState, f: impl FnOnce(&TapContext<'_>) -> R) -> R {
        let tokens = self.inner.csrf.for_session(request.session_id());
        let ctx = TapContext {
            user: &request.user,
            meta: self.inner.items.meta(),
            access: &self.inner.access,
            tokens: &tokens,
            text: &self.inner.sanitizer,
        };
        f(&ctx)
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn plugin_runtime(&self) -> &Arc<PluginRuntime> {
        &self.inner.plugin_runtime
    }

    pub fn tap_dispatcher(&self) -> &TapDispatcher {
        &self.inner.tap_dispatcher
    }

    pub fn content_types(&self) -> &ContentTypeRegistry {
        &self.inner.content_types
    }

    pub fn permissions(&self) -> &PermissionService {
        &self.inner.permissions
    }

    pub fn items(&self) -> &ItemService {
        &self.inner.items
    }

    /// Attribute storage (the same store plugins see).
    pub fn meta(&self) -> &MetaStorage {
        self.inner.items.meta()
    }

    pub fn csrf(&self) -> &CsrfTokenStore {
        &self.inner.csrf
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("config", &self.inner.config)
            .field("plugins", &self.inner.plugin_runtime.plugin_count())
            .field("items", &self.inner.items.count())
            .finish_non_exhaustive()
    }
}
