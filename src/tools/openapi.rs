use axum::Json;
use serde_json::{json, Value};

/// Minimal OpenAPI document so the chat host can register the tool.
pub async fn openapi() -> Json<Value> {
    Json(json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Assistant Ingest And Query",
            "description": "Uploads attached files to the document assistant and runs a RAG query.",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/ingest_and_query": {
                "post": {
                    "operationId": "ingest_and_query",
                    "summary": "Upload all attached files and answer a question about them",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/IngestAndQueryRequest" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "One result per attached file",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AggregateResult" }
                                }
                            }
                        },
                        "400": { "description": "No attached files were found" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "AttachedFile": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "url": { "type": "string" }
                    }
                },
                "IngestAndQueryRequest": {
                    "type": "object",
                    "properties": {
                        "question": {
                            "type": "string",
                            "description": "Optional question for the RAG query. Blank falls back to a summary prompt."
                        },
                        "files": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/AttachedFile" }
                        }
                    },
                    "required": ["files"]
                },
                "FileResult": {
                    "type": "object",
                    "properties": {
                        "file_name": { "type": "string" },
                        "file_id": { "type": "string" },
                        "upload_status": { "type": "string", "enum": ["not_started", "uploaded"] },
                        "index_status": { "type": "string" },
                        "rag_status": { "type": "string", "enum": ["not_started", "ok"] },
                        "document_id": { "type": "string" },
                        "error": { "type": "string" },
                        "error_kind": {
                            "type": "string",
                            "enum": ["resolution", "transport", "terminal_state", "timeout", "unknown"]
                        },
                        "answer": { "type": "string" },
                        "sources": { "type": "array", "items": { "type": "object" } },
                        "debug": {
                            "type": "object",
                            "properties": {
                                "question": { "type": "string" },
                                "source_count": { "type": "integer" }
                            }
                        }
                    }
                },
                "AggregateResult": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string" },
                        "results": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/FileResult" }
                        }
                    }
                }
            }
        }
    }))
}
