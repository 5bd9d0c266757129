use crate::theme::{AnimationType, SidebarPosition, ThemePreferences};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Error as RusqliteError};

pub fn create_preferences(conn: &Connection, user_id: &str, prefs: &ThemePreferences) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT INTO user_preferences
            (id, bg_color, bg_secondary, accent_color, text_color, font_family, animation, sidebar_position, custom_css, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user_id,
            prefs.bg_color,
            prefs.bg_secondary,
            prefs.accent_color,
            prefs.text_color,
            prefs.font_family,
            prefs.animation.as_str(),
            prefs.sidebar_position.as_str(),
            prefs.custom_css,
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// `None` when the user has no preferences record. Unknown enum values in a
/// stored row fall back to their defaults.
pub fn read_preferences(conn: &Connection, user_id: &str) -> Result<Option<ThemePreferences>, RusqliteError> {
    let row = conn.query_row(
        "SELECT bg_color, bg_secondary, accent_color, text_color, font_family, animation, sidebar_position, custom_css
         FROM user_preferences WHERE id = ?1",
        [user_id],
        |row| {
            Ok((
                ThemePreferences {
                    bg_color: row.get(0)?,
                    bg_secondary: row.get(1)?,
                    accent_color: row.get(2)?,
                    text_color: row.get(3)?,
                    font_family: row.get(4)?,
                    animation: AnimationType::None,
                    sidebar_position: SidebarPosition::Left,
                    custom_css: row.get(7)?,
                },
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        },
    ).optional()?;

    Ok(row.map(|(mut prefs, animation, sidebar)| {
        if let Some(a) = animation {
            prefs.animation = a.parse().unwrap_or_else(|e| {
                log::warn!("Preferences for {}: {}", user_id, e);
                AnimationType::None
            });
        }
        if let Some(s) = sidebar {
            prefs.sidebar_position = s.parse().unwrap_or_else(|e| {
                log::warn!("Preferences for {}: {}", user_id, e);
                SidebarPosition::Left
            });
        }
        prefs
    }))
}

/// Last write wins; returns the number of rows touched (0 when the user has no record).
pub fn update_preferences(conn: &Connection, user_id: &str, prefs: &ThemePreferences) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE user_preferences SET bg_color = ?1, bg_secondary = ?2, accent_color = ?3, text_color = ?4,
            font_family = ?5, animation = ?6, sidebar_position = ?7, custom_css = ?8, updated_at = ?9
         WHERE id = ?10",
        params![
            prefs.bg_color,
            prefs.bg_secondary,
            prefs.accent_color,
            prefs.text_color,
            prefs.font_family,
            prefs.animation.as_str(),
            prefs.sidebar_position.as_str(),
            prefs.custom_css,
            Utc::now().to_rfc3339(),
            user_id
        ],
    )
}
