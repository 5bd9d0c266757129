use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod color;

pub use color::ColorError;

pub const CUSTOM_STYLE_ID: &str = "user-custom-css";
pub const MUTE_AMOUNT: f64 = 0.45;
pub const BORDER_STEPS: u8 = 8;

/// Every variable `apply_theme` may set; `clear_theme` removes exactly these.
pub const THEME_VARIABLES: [&str; 8] = [
    "--bg-primary",
    "--bg-secondary",
    "--accent",
    "--text-primary",
    "--text-secondary",
    "--border",
    "--font-mono",
    "--font-sans",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationType {
    #[default]
    None,
    Particles,
    Gradient,
    Waves,
    Matrix,
    Snow,
}

impl AnimationType {
    pub const ALL: [AnimationType; 6] = [
        AnimationType::None,
        AnimationType::Particles,
        AnimationType::Gradient,
        AnimationType::Waves,
        AnimationType::Matrix,
        AnimationType::Snow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationType::None => "none",
            AnimationType::Particles => "particles",
            AnimationType::Gradient => "gradient",
            AnimationType::Waves => "waves",
            AnimationType::Matrix => "matrix",
            AnimationType::Snow => "snow",
        }
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationType::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown animation type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarPosition {
    #[default]
    Left,
    Right,
}

impl SidebarPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SidebarPosition::Left => "left",
            SidebarPosition::Right => "right",
        }
    }
}

impl FromStr for SidebarPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(SidebarPosition::Left),
            "right" => Ok(SidebarPosition::Right),
            other => Err(format!("Unknown sidebar position '{}'", other)),
        }
    }
}

/// Stored theme settings. Empty strings count as unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemePreferences {
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub bg_secondary: Option<String>,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub animation: AnimationType,
    #[serde(default)]
    pub sidebar_position: SidebarPosition,
    #[serde(default)]
    pub custom_css: Option<String>,
}

impl ThemePreferences {
    /// Values every new account starts with.
    pub fn signup_defaults() -> Self {
        Self {
            bg_color: Some("#0a0a0a".into()),
            bg_secondary: Some("#111111".into()),
            accent_color: Some("#8b5cf6".into()),
            text_color: Some("#e0e0e0".into()),
            font_family: Some("JetBrains Mono".into()),
            animation: AnimationType::None,
            sidebar_position: SidebarPosition::Left,
            custom_css: Some(String::new()),
        }
    }

    /// Rejects colour fields that are set but not 6-digit hex.
    pub fn validate(&self) -> Result<(), ColorError> {
        for value in [&self.bg_color, &self.bg_secondary, &self.accent_color, &self.text_color] {
            if let Some(hex) = populated(value) {
                color::hex_to_rgb(hex)?;
            }
        }
        Ok(())
    }

    pub fn accent_or_default(&self) -> &str {
        populated(&self.accent_color).unwrap_or("#8b5cf6")
    }
}

fn populated(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Explicit stand-in for a document's root style: custom properties plus
/// attached `<style>` blocks keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeContext {
    properties: BTreeMap<String, String>,
    style_blocks: BTreeMap<String, String>,
}

impl ThemeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    pub fn remove_property(&mut self, name: &str) {
        self.properties.remove(name);
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn attach_style_block(&mut self, id: &str, css: &str) {
        self.style_blocks.insert(id.to_string(), css.to_string());
    }

    pub fn remove_style_block(&mut self, id: &str) {
        self.style_blocks.remove(id);
    }

    pub fn style_block(&self, id: &str) -> Option<&str> {
        self.style_blocks.get(id).map(String::as_str)
    }

    pub fn style_block_count(&self) -> usize {
        self.style_blocks.len()
    }

    /// Renders the context as a stylesheet: one `:root` rule followed by every
    /// attached block.
    pub fn to_stylesheet(&self) -> String {
        let mut css = String::new();
        if !self.properties.is_empty() {
            css.push_str(":root {\n");
            for (name, value) in &self.properties {
                css.push_str(&format!("  {}: {};\n", name, value));
            }
            css.push_str("}\n");
        }
        for (id, block) in &self.style_blocks {
            css.push_str(&format!("/* {} */\n{}\n", id, block));
        }
        css
    }
}

/// Maps preferences onto `ctx`. Unset fields leave the existing variable alone;
/// secondary text and border colours are derived on every call.
pub fn apply_theme(ctx: &mut ThemeContext, prefs: &ThemePreferences) {
    let color_field = |value: &Option<String>, name: &str| -> Option<String> {
        let hex = populated(value)?;
        match color::hex_to_rgb(hex) {
            Ok(_) => Some(hex.to_string()),
            Err(e) => {
                log::warn!("Skipping theme field {}: {}", name, e);
                None
            }
        }
    };

    let bg_color = color_field(&prefs.bg_color, "bg_color");
    let bg_secondary = color_field(&prefs.bg_secondary, "bg_secondary");
    let accent = color_field(&prefs.accent_color, "accent_color");
    let text_color = color_field(&prefs.text_color, "text_color");
    let font = populated(&prefs.font_family);

    let mapping: [(&str, Option<String>); 8] = [
        ("--bg-primary", bg_color),
        ("--bg-secondary", bg_secondary.clone()),
        ("--accent", accent),
        ("--text-primary", text_color.clone()),
        ("--text-secondary", text_color.and_then(|c| color::mute(&c, MUTE_AMOUNT).ok())),
        ("--border", bg_secondary.and_then(|c| color::lighten(&c, BORDER_STEPS).ok())),
        ("--font-mono", font.map(|f| format!("'{}', monospace", f))),
        ("--font-sans", font.map(|f| format!("'{}', sans-serif", f))),
    ];

    for (name, value) in mapping {
        if let Some(value) = value {
            ctx.set_property(name, &value);
        }
    }

    match populated(&prefs.custom_css) {
        Some(css) => ctx.attach_style_block(CUSTOM_STYLE_ID, css),
        None => ctx.remove_style_block(CUSTOM_STYLE_ID),
    }
}

/// Removes everything `apply_theme` can set. Safe on an untouched context.
pub fn clear_theme(ctx: &mut ThemeContext) {
    for name in THEME_VARIABLES {
        ctx.remove_property(name);
    }
    ctx.remove_style_block(CUSTOM_STYLE_ID);
}

/// A single editable preference, as sent by the customisation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceField {
    BgColor,
    BgSecondary,
    AccentColor,
    TextColor,
    FontFamily,
    Animation,
    SidebarPosition,
    CustomCss,
}

/// Draft preferences with a live preview context. Each field edit re-runs the
/// whole `apply_theme` pass so derived values follow their sources.
#[derive(Debug, Clone)]
pub struct ThemeEditor {
    draft: ThemePreferences,
    preview: ThemeContext,
}

impl ThemeEditor {
    pub fn new(draft: ThemePreferences) -> Self {
        let mut preview = ThemeContext::new();
        apply_theme(&mut preview, &draft);
        Self { draft, preview }
    }

    pub fn set_field(&mut self, field: PreferenceField, value: &str) -> Result<(), String> {
        let text = || Some(value.to_string());
        match field {
            PreferenceField::BgColor => self.draft.bg_color = text(),
            PreferenceField::BgSecondary => self.draft.bg_secondary = text(),
            PreferenceField::AccentColor => self.draft.accent_color = text(),
            PreferenceField::TextColor => self.draft.text_color = text(),
            PreferenceField::FontFamily => self.draft.font_family = text(),
            PreferenceField::CustomCss => self.draft.custom_css = text(),
            PreferenceField::Animation => self.draft.animation = value.parse()?,
            PreferenceField::SidebarPosition => self.draft.sidebar_position = value.parse()?,
        }
        apply_theme(&mut self.preview, &self.draft);
        Ok(())
    }

    pub fn draft(&self) -> &ThemePreferences {
        &self.draft
    }

    pub fn preview(&self) -> &ThemeContext {
        &self.preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> ThemePreferences {
        ThemePreferences {
            custom_css: Some("body { margin: 0 }".into()),
            ..ThemePreferences::signup_defaults()
        }
    }

    #[test]
    fn apply_sets_direct_and_derived_variables() {
        let mut ctx = ThemeContext::new();
        apply_theme(&mut ctx, &prefs());
        assert_eq!(ctx.property("--bg-primary"), Some("#0a0a0a"));
        assert_eq!(ctx.property("--bg-secondary"), Some("#111111"));
        assert_eq!(ctx.property("--accent"), Some("#8b5cf6"));
        assert_eq!(ctx.property("--text-primary"), Some("#e0e0e0"));
        assert_eq!(ctx.property("--text-secondary"), Some("#b5b5b5"));
        assert_eq!(ctx.property("--border"), Some("#191919"));
        assert_eq!(ctx.property("--font-mono"), Some("'JetBrains Mono', monospace"));
        assert_eq!(ctx.property("--font-sans"), Some("'JetBrains Mono', sans-serif"));
        assert_eq!(ctx.style_block(CUSTOM_STYLE_ID), Some("body { margin: 0 }"));
    }

    #[test]
    fn unset_fields_leave_existing_values() {
        let mut ctx = ThemeContext::new();
        ctx.set_property("--accent", "#123456");
        ctx.set_property("--font-mono", "monospace");
        let partial = ThemePreferences {
            bg_color: Some("#000000".into()),
            accent_color: Some(String::new()),
            ..Default::default()
        };
        apply_theme(&mut ctx, &partial);
        assert_eq!(ctx.property("--accent"), Some("#123456"));
        assert_eq!(ctx.property("--font-mono"), Some("monospace"));
        assert_eq!(ctx.property("--bg-primary"), Some("#000000"));
        assert_eq!(ctx.property("--text-secondary"), None);
    }

    #[test]
    fn malformed_colour_is_skipped_with_its_derivation() {
        let mut ctx = ThemeContext::new();
        let bad = ThemePreferences {
            text_color: Some("#xyzxyz".into()),
            bg_secondary: Some("#abc".into()),
            ..Default::default()
        };
        apply_theme(&mut ctx, &bad);
        assert!(ctx.properties().is_empty());
        assert!(bad.validate().is_err());
        assert!(prefs().validate().is_ok());
    }

    #[test]
    fn clear_restores_untouched_state() {
        let mut ctx = ThemeContext::new();
        apply_theme(&mut ctx, &prefs());
        clear_theme(&mut ctx);
        assert_eq!(ctx, ThemeContext::new());
        assert_eq!(ctx.to_stylesheet(), "");
    }

    #[test]
    fn clear_keeps_foreign_properties() {
        let mut ctx = ThemeContext::new();
        ctx.set_property("--layout-gap", "1rem");
        apply_theme(&mut ctx, &prefs());
        clear_theme(&mut ctx);
        assert_eq!(ctx.properties().len(), 1);
        assert_eq!(ctx.property("--layout-gap"), Some("1rem"));
    }

    #[test]
    fn clear_on_fresh_context_is_noop() {
        let mut ctx = ThemeContext::new();
        clear_theme(&mut ctx);
        assert_eq!(ctx, ThemeContext::new());
    }

    #[test]
    fn custom_css_block_is_replaced_not_duplicated() {
        let mut ctx = ThemeContext::new();
        let mut p = prefs();
        apply_theme(&mut ctx, &p);
        p.custom_css = Some("h1 { color: red }".into());
        apply_theme(&mut ctx, &p);
        assert_eq!(ctx.style_block_count(), 1);
        assert_eq!(ctx.style_block(CUSTOM_STYLE_ID), Some("h1 { color: red }"));
        p.custom_css = Some(String::new());
        apply_theme(&mut ctx, &p);
        assert_eq!(ctx.style_block_count(), 0);
    }

    #[test]
    fn editor_keeps_derived_values_in_step() {
        let mut editor = ThemeEditor::new(ThemePreferences::signup_defaults());
        editor.set_field(PreferenceField::TextColor, "#000000").unwrap();
        assert_eq!(editor.preview().property("--text-primary"), Some("#000000"));
        assert_eq!(editor.preview().property("--text-secondary"), Some("#3a3a3a"));
        editor.set_field(PreferenceField::BgSecondary, "#fffafa").unwrap();
        assert_eq!(editor.preview().property("--border"), Some("#ffffff"));
        editor.set_field(PreferenceField::Animation, "snow").unwrap();
        assert_eq!(editor.draft().animation, AnimationType::Snow);
        assert!(editor.set_field(PreferenceField::Animation, "fireworks").is_err());
    }

    #[test]
    fn stylesheet_rendering() {
        let mut ctx = ThemeContext::new();
        ctx.set_property("--accent", "#8b5cf6");
        ctx.attach_style_block(CUSTOM_STYLE_ID, "p { margin: 0 }");
        assert_eq!(
            ctx.to_stylesheet(),
            ":root {\n  --accent: #8b5cf6;\n}\n/* user-custom-css */\np { margin: 0 }\n"
        );
    }

    #[test]
    fn preferences_deserialize_with_missing_fields() {
        let p: ThemePreferences = serde_json::from_str(r##"{"accent_color":"#ff0000","animation":"waves"}"##).unwrap();
        assert_eq!(p.animation, AnimationType::Waves);
        assert_eq!(p.sidebar_position, SidebarPosition::Left);
        assert_eq!(p.bg_color, None);
    }
}
