//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{catalog, health, query, sessions, structures};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Poremap API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Filtering and query layer for porous-materials screening dashboards"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "catalog", description = "Quantities, filters and plot presets"),
        (name = "query", description = "Stateless filtered queries"),
        (name = "sessions", description = "Per-client filter sessions"),
        (name = "structures", description = "Structure property tables")
    ),
    paths(
        health::health,
        catalog::get_catalog,
        query::run_query,
        sessions::create_session,
        sessions::get_session,
        sessions::delete_session,
        sessions::set_filter,
        sessions::reset_filter,
        sessions::reset_filters,
        sessions::query_session,
        structures::get_structure,
    ),
    components(schemas(
        health::HealthResponse,
        catalog::CatalogResponse,
        query::ProjectionRequest,
        query::QueryRequest,
        query::QueryResponse,
        sessions::CreateSessionRequest,
        sessions::SetFilterRequest,
        sessions::FilterDto,
        sessions::SessionResponse,
        structures::StructureResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Poremap API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
