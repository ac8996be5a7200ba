// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` documentation module
//!
//! This module provides the `OpenAPI` specification and `Swagger UI`
//! endpoints for API documentation.

use axum::{Json, http::StatusCode, response::Html};
use shared_types::{ClassificationType, ClassifierStatus, ComplaintRequest, ComplaintResponse};
use utoipa::OpenApi;

use crate::{
    routes::handlers,
    state::{HealthCheck, OverallStatus},
};

/// `OpenAPI` document for the complaint triage API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Complaint Triage API",
        description = "Classify drug-safety complaints as Adverse Events or Product Complaints, \
                       then into fixed sub-category taxonomies. Run the optimization pipeline to \
                       refresh the underlying prompt artifacts."
    ),
    paths(
        handlers::health_handler,
        handlers::classify_ae_pc_handler,
        handlers::classify_ae_category_handler,
        handlers::classify_pc_category_handler,
    ),
    components(schemas(
        ClassificationType,
        ClassifierStatus,
        ComplaintRequest,
        ComplaintResponse,
        HealthCheck,
        OverallStatus,
    )),
    tags(
        (name = "system", description = "Health and monitoring endpoints"),
        (name = "classification", description = "Complaint classification endpoints")
    )
)]
pub struct ApiDoc;

/// `OpenAPI` specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Swagger UI endpoint
pub async fn swagger_ui() -> Result<Html<&'static str>, StatusCode> {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Complaint Triage API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css" />
    <style>
        html { box-sizing: border-box; overflow: -moz-scrollbars-vertical; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin:0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: '/api-doc/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                plugins: [
                    SwaggerUIBundle.plugins.DownloadUrl
                ],
                layout: "StandaloneLayout"
            });
        }
    </script>
</body>
</html>
"#;
    Ok(Html(html))
}
