//! Interactive API documentation: an OpenAPI document plus a Swagger UI page reading it.

use axum::{response::Html, Json};
use once_cell::sync::Lazy;
use schemars::r#gen::{SchemaGenerator, SchemaSettings};
use serde_json::{json, Value};

use crate::api::models::{ExtractionResult, PageSummary};

static OPENAPI_SPEC: Lazy<Value> = Lazy::new(build_openapi_spec);

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Extraction Gateway API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/apispec_1.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn openapi_spec() -> Json<Value> {
    Json(OPENAPI_SPEC.clone())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn schema_value<T: schemars::JsonSchema>(generator: &mut SchemaGenerator) -> Value {
    serde_json::to_value(generator.subschema_for::<T>()).unwrap_or(Value::Null)
}

fn build_openapi_spec() -> Value {
    // Refs point at #/components/schemas/, filled from the same generator below
    let mut generator = SchemaSettings::openapi3().into_generator();
    let pages = schema_value::<ExtractionResult>(&mut generator);
    let summary = schema_value::<PageSummary>(&mut generator);
    let components = serde_json::to_value(generator.take_definitions()).unwrap_or(Value::Null);

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Extraction Gateway",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "components": { "schemas": components },
        "paths": {
            "/uppercase": {
                "get": {
                    "tags": ["Text Processing"],
                    "summary": "Returns the given text in uppercase",
                    "parameters": [{
                        "name": "text",
                        "in": "query",
                        "required": true,
                        "description": "The text to be converted to uppercase",
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": json_response("The text in uppercase", json!({
                            "type": "object",
                            "properties": { "text": { "type": "string" } }
                        })),
                        "400": error_response("Missing text parameter"),
                    }
                }
            },
            "/extract": {
                "get": {
                    "tags": ["Content Extraction"],
                    "summary": "Extracts a fixed demo page",
                    "responses": {
                        "200": json_response("Successfully extracted content", summary),
                        "500": error_response("Extraction failed"),
                    }
                },
                "post": {
                    "tags": ["Content Extraction"],
                    "summary": "Extracts content from the provided URLs",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "required": ["urls"],
                                    "properties": {
                                        "urls": {
                                            "type": "string",
                                            "description": "Newline-separated URLs to extract content from",
                                            "example": "https://example.com/page1\nhttps://example.com/page2\n"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response("Successfully extracted content", pages.clone()),
                        "400": error_response("Invalid request payload"),
                        "500": error_response("Extraction failed"),
                    }
                }
            },
            "/extract/pages": {
                "get": {
                    "tags": ["Content Extraction"],
                    "summary": "Extracts a fixed set of demo pages",
                    "responses": {
                        "200": json_response("Successfully extracted content", pages),
                        "500": error_response("Extraction failed"),
                    }
                }
            }
        }
    })
}
