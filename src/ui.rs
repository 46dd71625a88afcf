use crate::config::ServiceConfig;
use crate::enhancer::SpecDocument;
use crate::fallback::is_placeholder;

pub const SITE_TITLE: &str = "Pica Loco API Documentation";

const SWAGGER_UI_VERSION: &str = "5.17.14";

const CUSTOM_CSS: &str = r#"
    .swagger-ui .topbar { display: none; }
    .swagger-ui .info .title {
      color: #3ECF8E;
      font-family: 'Inter', sans-serif;
    }
    .swagger-ui .scheme-container {
      background: #1a1a1a;
      border: 1px solid #3ECF8E;
    }
"#;

/// JSON text that is safe to drop into a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Swagger UI page with `document` embedded inline.
///
/// The request interceptor attaches the backend credential so "Try it out"
/// requests reach the REST API.
pub fn render_docs_page(document: &SpecDocument, config: &ServiceConfig) -> String {
    let title = if is_placeholder(document) {
        format!("{SITE_TITLE} - Unavailable")
    } else {
        SITE_TITLE.to_string()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
  <style>{css}</style>
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js" crossorigin></script>
  <script>
    const apiKey = {key};
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{
        spec: {spec},
        dom_id: '#swagger-ui',
        deepLinking: true,
        requestInterceptor: (request) => {{
          request.headers['apikey'] = apiKey;
          request.headers['Authorization'] = `Bearer ${{apiKey}}`;
          return request;
        }},
      }});
    }};
  </script>
</body>
</html>
"#,
        title = escape_html(&title),
        version = SWAGGER_UI_VERSION,
        css = CUSTOM_CSS,
        key = script_json(config.anon_key()),
        spec = script_json(document),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancer::enhance;
    use crate::fallback::placeholder;
    use serde_json::json;

    fn config() -> ServiceConfig {
        ServiceConfig::new(Some("https://demo.supabase.co"), Some("anon")).unwrap()
    }

    #[test]
    fn test_renders_enhanced_document() {
        let raw = SpecDocument::from_value(json!({ "paths": { "/todos": {} } })).unwrap();
        let page = render_docs_page(&enhance(&raw, &config()), &config());

        assert!(page.contains("<title>Pica Loco API Documentation</title>"));
        assert!(page.contains("\"/todos\""));
        assert!(page.contains("SwaggerUIBundle"));
    }

    #[test]
    fn test_renders_placeholder_title() {
        let page = render_docs_page(&placeholder(Some(&config()), None), &config());
        assert!(page.contains("<title>Pica Loco API Documentation - Unavailable</title>"));
    }

    #[test]
    fn test_embedded_json_cannot_close_script() {
        let raw = SpecDocument::from_value(json!({
            "info": { "x-note": "</script><script>alert(1)</script>" }
        }))
        .unwrap();
        let page = render_docs_page(&raw, &config());

        assert!(!page.contains("</script><script>alert(1)"));
        assert!(page.contains("\\u003c/script\\u003e"));
    }
}
