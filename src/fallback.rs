use serde_json::{Value, json};

use crate::config::ServiceConfig;
use crate::enhancer::{API_VERSION, SERVER_DESCRIPTION, SpecDocument};

pub const PLACEHOLDER_TITLE: &str = "Pica Loco API - Documentation Unavailable";

/// Minimal document served while no real one is available.
///
/// It only describes the `/health` endpoint. `reason`, when given, is shown in
/// the description; callers are expected to have stripped secrets from it.
pub fn placeholder(config: Option<&ServiceConfig>, reason: Option<&str>) -> SpecDocument {
    let description = match reason {
        Some(reason) => format!(
            "Unable to load the API specification from the backend: {reason}. \
             Visit /debug for details."
        ),
        None => "The API specification is being loaded from the backend. \
                 Reload this page in a moment."
            .to_string(),
    };

    let servers: Vec<Value> = config
        .map(|config| json!({ "url": config.rest_url(), "description": SERVER_DESCRIPTION }))
        .into_iter()
        .collect();

    let document = json!({
        "openapi": "3.0.0",
        "info": {
            "title": PLACEHOLDER_TITLE,
            "version": API_VERSION,
            "description": description,
        },
        "servers": servers,
        "paths": {
            "/health": {
                "get": {
                    "summary": "Service health",
                    "description": "Reports whether the documentation service can reach the backend",
                    "responses": {
                        "200": { "description": "Backend reachable" },
                        "503": { "description": "Backend unreachable" }
                    }
                }
            }
        }
    });

    SpecDocument::from_value(document).unwrap_or_default()
}

pub fn is_placeholder(document: &SpecDocument) -> bool {
    document.title() == Some(PLACEHOLDER_TITLE)
}
