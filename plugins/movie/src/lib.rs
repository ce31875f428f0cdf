//! Movie plugin for Marquee.
//!
//! Provides a "movie" content type whose items carry six structured
//! attributes (title, director, year, runtime, main roles, plot):
//! - `tap_item_form` adds an editor panel pre-filled from storage
//! - `tap_item_save` stores submitted values after save-kind, permission and token
//!   checks
//! - `tap_item_view` puts a "Movie information" summary ahead of the body

pub mod fields;

use marquee_sdk::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;

pub use fields::{FIELDS, MovieField, Widget};

/// The plugin's `.info.toml` manifest.
pub const MANIFEST: &str = include_str!("../movie.info.toml");

/// Content type machine name.
pub const MOVIE_TYPE: &str = "movie";

/// Hidden form field carrying the anti-forgery token.
pub const NONCE_FIELD: &str = "movie_nonce";

/// Heading of the rendered summary block.
pub const SUMMARY_HEADING: &str = "Movie information";

/// Token scope for the metadata form of one item.
pub fn nonce_scope(item_id: Uuid) -> String {
    format!("movie-meta:{item_id}")
}

/// The movie content type plugin. Stateless; all data lives in item storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoviePlugin;

impl Plugin for MoviePlugin {
    fn name(&self) -> &str {
        "movie"
    }

    fn item_info(&self) -> Vec<ContentTypeDefinition> {
        vec![
            ContentTypeDefinition::new(MOVIE_TYPE, "Movie")
                .plural("Movies")
                .description("Post for describing movies")
                .slug("movies")
                .with_archive(),
        ]
    }

    /// Permission format matches the kernel's edit checks: "{operation} {type} content".
    fn perm(&self) -> Vec<PermissionDefinition> {
        vec![
            PermissionDefinition::new("create movie content", "Create new movies"),
            PermissionDefinition::new("edit own movie content", "Edit own movies"),
            PermissionDefinition::new("edit any movie content", "Edit any movie"),
        ]
    }

    fn item_form(
        &self,
        ctx: &TapContext<'_>,
        item: &Item,
    ) -> Result<Option<RenderElement>, TapError> {
        if !item.is_type(MOVIE_TYPE) {
            return Ok(None);
        }

        let mut panel = render::container().class("movie-meta");
        for (weight, field) in (0..).zip(FIELDS) {
            let value = ctx.meta_or_empty(item.id, field.meta_key)?;
            panel = panel.child(
                field.name,
                field
                    .widget
                    .element(field.name, field.label, &value)
                    .weight(weight)
                    .build(),
            );
        }

        let token = ctx.tokens.mint(&nonce_scope(item.id))?;
        panel = panel.child(
            NONCE_FIELD,
            render::hidden(NONCE_FIELD, &token).weight(100).build(),
        );

        Ok(Some(panel.build()))
    }

    fn item_save(
        &self,
        ctx: &TapContext<'_>,
        item: &Item,
        save: &SaveRequest,
    ) -> Result<(), TapError> {
        if !item.is_type(MOVIE_TYPE) {
            return Ok(());
        }

        if save.kind.is_background() {
            debug!(item_id = %item.id, kind = ?save.kind, "movie save ignored: background save");
            return Ok(());
        }

        if !ctx.access.can_edit(ctx.user, item.id) {
            debug!(item_id = %item.id, user = %ctx.user.id, "movie save ignored: no edit access");
            return Ok(());
        }

        // Tokens are single use: verify only once the save is otherwise allowed
        let token_ok = save
            .get(NONCE_FIELD)
            .is_some_and(|token| ctx.tokens.verify(token, &nonce_scope(item.id)));
        if !token_ok {
            debug!(item_id = %item.id, "movie save ignored: missing or invalid token");
            return Ok(());
        }

        let mut stored = 0;
        for field in FIELDS {
            // Absent fields keep their stored value
            let Some(raw) = save.get(field.name) else {
                continue;
            };
            let clean = field.widget.sanitize(ctx.text, raw);
            ctx.meta.set_meta(item.id, field.meta_key, &clean)?;
            stored += 1;
        }

        info!(item_id = %item.id, stored, "movie metadata saved");
        Ok(())
    }

    fn item_view(
        &self,
        ctx: &TapContext<'_>,
        item: &Item,
    ) -> Result<Option<RenderElement>, TapError> {
        if !item.is_type(MOVIE_TYPE) {
            return Ok(None);
        }

        let mut summary = render::container().class("movie-info").child(
            "heading",
            render::markup("h5", SUMMARY_HEADING).weight(-1).build(),
        );
        for (weight, field) in (0..).zip(FIELDS) {
            let value = ctx.meta_or_empty(item.id, field.meta_key)?;
            summary = summary.child(
                field.name,
                render::markup("div", &format!("{}: {}", field.summary_label, value))
                    .class("movie-info__row")
                    .weight(weight)
                    .build(),
            );
        }

        Ok(Some(summary.build()))
    }
}
