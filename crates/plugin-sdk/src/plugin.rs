//! The plugin trait.
//!
//! A plugin implements the taps it declares in its `.info.toml` manifest.
//! Every tap has a no-op default so a plugin only overrides what it uses;
//! the kernel only calls taps the manifest lists under `[taps] implements`.

use crate::host::TapContext;
use crate::host_errors::TapError;
use crate::render::RenderElement;
use crate::types::{ContentTypeDefinition, Item, PermissionDefinition, SaveRequest};

pub trait Plugin: Send + Sync {
    /// Machine name; must match the manifest `name`.
    fn name(&self) -> &str;

    /// `tap_item_info`: content types provided by this plugin.
    fn item_info(&self) -> Vec<ContentTypeDefinition> {
        Vec::new()
    }

    /// `tap_perm`: permissions provided by this plugin.
    fn perm(&self) -> Vec<PermissionDefinition> {
        Vec::new()
    }

    /// `tap_item_form`: a panel for the item edit screen, if any.
    ///
    /// # Errors
    ///
    /// Host service failures are returned unchanged.
    fn item_form(&self, _ctx: &TapContext<'_>, _item: &Item) -> Result<Option<RenderElement>, TapError> {
        Ok(None)
    }

    /// `tap_item_save`: react to a submitted save of `item`.
    ///
    /// # Errors
    ///
    /// Host service failures are returned unchanged.
    fn item_save(&self, _ctx: &TapContext<'_>, _item: &Item, _save: &SaveRequest) -> Result<(), TapError> {
        Ok(())
    }

    /// `tap_item_view`: a block to render ahead of the item body, if any.
    ///
    /// # Errors
    ///
    /// Host service failures are returned unchanged.
    fn item_view(&self, _ctx: &TapContext<'_>, _item: &Item) -> Result<Option<RenderElement>, TapError> {
        Ok(None)
    }
}
