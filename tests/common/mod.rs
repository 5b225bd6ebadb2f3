use std::collections::HashMap;

use oasgate::spec::{load_spec_from_spec, RouteMeta, SecurityScheme};

/// Petstore-style document exercising path/query/header parameters, a typed
/// request body, and both built-in security scheme kinds.
pub fn petstore_spec() -> (Vec<RouteMeta>, HashMap<String, SecurityScheme>) {
    let value = serde_json::json!({
        "openapi": "3.0.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "parameters": [
                        {
                            "name": "limit",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "integer", "minimum": 1 }
                        },
                        {
                            "name": "tags",
                            "in": "query",
                            "required": false,
                            "schema": {
                                "type": "array",
                                "items": { "type": "string" },
                                "minItems": 2
                            }
                        }
                    ],
                    "responses": { "200": { "description": "ok" } }
                },
                "post": {
                    "operationId": "createPet",
                    "security": [ { "bearerAuth": [] } ],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "required": ["name"],
                                    "properties": {
                                        "name": { "type": "string" },
                                        "tag": { "type": "string" }
                                    }
                                }
                            }
                        }
                    },
                    "responses": { "201": { "description": "created" } }
                }
            },
            "/pets/{id}": {
                "get": {
                    "operationId": "getPet",
                    "parameters": [
                        {
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }
                    ],
                    "responses": { "200": { "description": "ok" } }
                },
                "delete": {
                    "operationId": "deletePet",
                    "security": [ { "apiKeyAuth": [] } ],
                    "parameters": [
                        {
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }
                    ],
                    "responses": { "204": { "description": "deleted" } }
                }
            },
            "/admin/stats": {
                "get": {
                    "operationId": "adminStats",
                    "security": [
                        { "apiKeyAuth": [] },
                        { "bearerAuth": [] }
                    ],
                    "parameters": [
                        {
                            "name": "X-Trace-Id",
                            "in": "header",
                            "required": true,
                            "schema": { "type": "string" }
                        }
                    ],
                    "responses": { "200": { "description": "ok" } }
                }
            }
        },
        "components": {
            "securitySchemes": {
                "apiKeyAuth": {
                    "type": "apiKey",
                    "name": "X-API-Key",
                    "in": "header"
                },
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer"
                }
            }
        }
    });
    let spec: oas3::OpenApiV3Spec = serde_json::from_value(value).expect("fixture deserializes");
    load_spec_from_spec(spec).expect("fixture indexes")
}
