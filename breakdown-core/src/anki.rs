//! Minimal AnkiConnect client: the `addNote` action and nothing else.

use std::fmt;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnkiError;
use crate::note::Note;

const ADD_NOTE: &str = "addNote";
const API_VERSION: u8 = 6;
const MODEL_NAME: &str = "Basic";

/// Identifier AnkiConnect assigns to a created note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize)]
struct AddNoteRequest<'a> {
    action: &'static str,
    version: u8,
    params: AddNoteParams<'a>,
}

#[derive(Debug, Serialize)]
struct AddNoteParams<'a> {
    note: NotePayload<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotePayload<'a> {
    deck_name: &'a str,
    model_name: &'static str,
    fields: NoteFields<'a>,
    options: NoteOptions<'a>,
    tags: &'a [String],
    // media attachments are never sent
    picture: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct NoteFields<'a> {
    #[serde(rename = "Front")]
    front: &'a str,
    #[serde(rename = "Back")]
    back: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteOptions<'a> {
    allow_duplicate: bool,
    duplicate_scope: &'static str,
    duplicate_scope_options: DuplicateScopeOptions<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DuplicateScopeOptions<'a> {
    deck_name: &'a str,
    check_children: bool,
    check_all_models: bool,
}

#[derive(Debug, Deserialize)]
struct AddNoteResponse {
    result: Option<NoteId>,
    error: Option<String>,
}

impl<'a> AddNoteRequest<'a> {
    fn new(note: &'a Note) -> Self {
        Self {
            action: ADD_NOTE,
            version: API_VERSION,
            params: AddNoteParams {
                note: NotePayload {
                    deck_name: &note.deck,
                    model_name: MODEL_NAME,
                    fields: NoteFields {
                        front: &note.front,
                        back: &note.back,
                    },
                    options: NoteOptions {
                        allow_duplicate: false,
                        duplicate_scope: "deck",
                        duplicate_scope_options: DuplicateScopeOptions {
                            deck_name: &note.deck,
                            check_children: false,
                            check_all_models: false,
                        },
                    },
                    tags: &note.tags,
                    picture: Vec::new(),
                },
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnkiClient {
    client: Client,
    endpoint: String,
}

impl AnkiClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn add_note(&self, note: &Note) -> Result<NoteId, AnkiError> {
        let request = AddNoteRequest::new(note);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_server_error() {
            return Err(AnkiError::Server { status, body });
        }
        if status.is_client_error() {
            return Err(AnkiError::BadRequest { status, body });
        }

        let parsed: AddNoteResponse = serde_json::from_str(&body)?;
        debug!(?parsed, "addNote answered");
        match (parsed.result, parsed.error) {
            (_, Some(error)) if !error.is_empty() => Err(AnkiError::Rejected(error)),
            (Some(id), _) => Ok(id),
            (None, _) => Err(AnkiError::MissingResult),
        }
    }
}
