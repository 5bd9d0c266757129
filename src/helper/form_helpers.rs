use actix_web::{web, HttpResponse};
use serde_json::json;
use std::collections::HashMap;
use url::form_urlencoded;

use crate::content::is_http_url;

/// Word the user must type to confirm a destructive action.
pub const DELETE_CONFIRMATION: &str = "delete";

/// Parses URL-encoded form data from bytes, handling potential UTF-8 errors gracefully.
pub fn parse_form(form_bytes: &web::Bytes) -> Result<HashMap<String, String>, HttpResponse> {
    let body = match String::from_utf8(form_bytes.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            return Err(HttpResponse::BadRequest()
                .json(json!({"success": false, "error": "Invalid UTF-8 in request body."})))
        }
    };
    Ok(form_urlencoded::parse(body.as_bytes()).into_owned().collect())
}

pub fn is_delete_confirmed(form: &HashMap<String, String>) -> bool {
    form.get("confirmation")
        .map_or(false, |c| c.trim().eq_ignore_ascii_case(DELETE_CONFIRMATION))
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub fn parse_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Empty and whitespace-only values mean "unset".
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Like [`optional_text`], but a set value must be an http(s) URL.
pub fn optional_url(field: &str, value: Option<&str>) -> Result<Option<String>, String> {
    match optional_text(value) {
        Some(url) if !is_http_url(&url) => Err(format!("{} must be an http(s) URL.", field)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_list_trims_and_drops_empties() {
        assert_eq!(parse_comma_list(" Rust, ,actix-web ,, SQLite"), vec!["Rust", "actix-web", "SQLite"]);
        assert!(parse_comma_list("  ").is_empty());
    }

    #[test]
    fn delete_needs_the_exact_word() {
        let mut form = HashMap::new();
        assert!(!is_delete_confirmed(&form));
        form.insert("confirmation".to_string(), "yes".to_string());
        assert!(!is_delete_confirmed(&form));
        form.insert("confirmation".to_string(), " Delete ".to_string());
        assert!(is_delete_confirmed(&form));
    }

    #[test]
    fn optional_url_rejects_other_schemes() {
        assert_eq!(optional_url("GitHub URL", Some("  ")), Ok(None));
        assert!(optional_url("GitHub URL", Some("javascript:alert(1)")).is_err());
        assert_eq!(
            optional_url("GitHub URL", Some("https://github.com/ada")),
            Ok(Some("https://github.com/ada".to_string()))
        );
    }

    #[test]
    fn parse_form_decodes_pairs() {
        let form = match parse_form(&web::Bytes::from_static(b"confirmation=delete&x=a%20b")) {
            Ok(f) => f,
            Err(_) => panic!("form should parse"),
        };
        assert_eq!(form.get("x").map(String::as_str), Some("a b"));
        assert!(is_delete_confirmed(&form));
    }
}
