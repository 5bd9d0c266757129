use crate::helper::dashboard_helpers::HelperError;
use crate::helper::sanitization_helpers::{sanitize_custom_css, sanitize_font_family};
use crate::middleware::AuthenticatedUser;
use crate::models::db_operations::{preferences_db_operations, users_db_operations};
use crate::models::AnimationOption;
use crate::theme::{self, AnimationType, PreferenceField, ThemeContext, ThemeEditor, ThemePreferences};
use crate::DbPool;
use serde::{Deserialize, Serialize};

/// Stored preferences, or the sign-up defaults when the record is missing.
pub fn load_preferences(pool: &DbPool, user_id: &str) -> Result<ThemePreferences, HelperError> {
    let conn = pool.get()?;
    match preferences_db_operations::read_preferences(&conn, user_id)? {
        Some(prefs) => Ok(prefs),
        None => {
            log::warn!("User {} has no preferences record; using defaults.", user_id);
            Ok(ThemePreferences::signup_defaults())
        }
    }
}

/// Copy of `prefs` that is safe to render into a page stylesheet.
pub fn render_safe(prefs: &ThemePreferences) -> ThemePreferences {
    ThemePreferences {
        font_family: prefs.font_family.as_deref().map(sanitize_font_family),
        custom_css: prefs.custom_css.as_deref().map(sanitize_custom_css),
        ..prefs.clone()
    }
}

pub fn theme_context(prefs: &ThemePreferences) -> ThemeContext {
    let mut ctx = ThemeContext::new();
    theme::apply_theme(&mut ctx, &render_safe(prefs));
    ctx
}

/// Theme for whoever holds the session: their preferences applied when signed
/// in, a cleared context otherwise.
pub fn theme_for_session(pool: &DbPool, user: Option<&AuthenticatedUser>) -> ThemeContext {
    let mut ctx = ThemeContext::new();
    match user {
        Some(user) => match load_preferences(pool, &user.user_id) {
            Ok(prefs) => theme::apply_theme(&mut ctx, &render_safe(&prefs)),
            Err(e) => {
                log::error!("Failed to load theme for {}: {}", user.user_id, e);
                theme::clear_theme(&mut ctx);
            }
        },
        None => theme::clear_theme(&mut ctx),
    }
    ctx
}

/// Validates and stores a full preferences record. A user without a record
/// gets one created.
pub fn update_preferences(pool: &DbPool, user_id: &str, prefs: ThemePreferences) -> Result<ThemePreferences, HelperError> {
    prefs.validate().map_err(|e| HelperError::Validation(format!("Invalid colour: {}", e)))?;
    let prefs = ThemePreferences {
        font_family: prefs.font_family.as_deref().map(sanitize_font_family),
        ..prefs
    };

    let conn = pool.get()?;
    if preferences_db_operations::update_preferences(&conn, user_id, &prefs)? == 0 {
        log::warn!("Creating missing preferences record for {}.", user_id);
        preferences_db_operations::create_preferences(&conn, user_id, &prefs)?;
    }
    Ok(prefs)
}

#[derive(Deserialize, Debug)]
pub struct FieldEdit {
    pub field: PreferenceField,
    pub value: String,
}

#[derive(Deserialize, Debug)]
pub struct PreviewRequest {
    /// Starting point; the stored preferences when absent.
    #[serde(default)]
    pub draft: Option<ThemePreferences>,
    pub edits: Vec<FieldEdit>,
}

#[derive(Serialize, Debug)]
pub struct ThemePreview {
    pub draft: ThemePreferences,
    pub variables: std::collections::BTreeMap<String, String>,
    pub stylesheet: String,
}

/// Replays single-field edits through the live editor, as the customisation
/// page does on every keystroke, and returns the resulting preview.
pub fn preview(pool: &DbPool, user_id: &str, request: PreviewRequest) -> Result<ThemePreview, HelperError> {
    let base = match request.draft {
        Some(draft) => draft,
        None => load_preferences(pool, user_id)?,
    };
    let mut editor = ThemeEditor::new(render_safe(&base));
    for edit in request.edits {
        let value = match edit.field {
            PreferenceField::CustomCss => sanitize_custom_css(&edit.value),
            PreferenceField::FontFamily => sanitize_font_family(&edit.value),
            _ => edit.value,
        };
        editor.set_field(edit.field, &value).map_err(HelperError::Validation)?;
    }
    Ok(ThemePreview {
        draft: editor.draft().clone(),
        variables: editor.preview().properties().clone(),
        stylesheet: editor.preview().to_stylesheet(),
    })
}

/// Options for the animation picker. Falls back to the built-in list when the
/// table is empty or unreadable.
pub fn animation_options(pool: &DbPool) -> Vec<AnimationOption> {
    let stored = pool
        .get()
        .map_err(|e| e.to_string())
        .and_then(|conn| users_db_operations::read_animation_options(&conn).map_err(|e| e.to_string()));
    match stored {
        Ok(options) if !options.is_empty() => options,
        Ok(_) => builtin_animation_options(),
        Err(e) => {
            log::error!("Failed to read animation options: {}", e);
            builtin_animation_options()
        }
    }
}

pub fn builtin_animation_options() -> Vec<AnimationOption> {
    AnimationType::ALL
        .iter()
        .map(|a| AnimationOption {
            id: *a,
            label: builtin_label(*a).to_string(),
            description: String::new(),
            preview_url: None,
        })
        .collect()
}

fn builtin_label(animation: AnimationType) -> &'static str {
    match animation {
        AnimationType::None => "None",
        AnimationType::Particles => "Particles",
        AnimationType::Gradient => "Gradient",
        AnimationType::Waves => "Waves",
        AnimationType::Matrix => "Matrix",
        AnimationType::Snow => "Snow",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_theme_neutralises_custom_css() {
        let prefs = ThemePreferences {
            custom_css: Some("a{}</style><script>alert(1)</script>".into()),
            ..ThemePreferences::signup_defaults()
        };
        let ctx = theme_context(&prefs);
        let css = ctx.style_block(theme::CUSTOM_STYLE_ID).unwrap_or_default();
        assert!(!css.contains("</style"));
        assert_eq!(ctx.property("--accent"), Some("#8b5cf6"));
    }

    #[test]
    fn builtin_options_cover_every_animation() {
        let ids: Vec<_> = builtin_animation_options().iter().map(|o| o.id).collect();
        assert_eq!(ids, AnimationType::ALL.to_vec());
    }
}
