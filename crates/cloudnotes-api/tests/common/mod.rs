//! In-process test harness: in-memory repositories behind the real router.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use cloudnotes_api::{build_router, AppState};
use cloudnotes_auth::{SessionIssuer, DEFAULT_SESSION_TTL_SECS};
use cloudnotes_core::{
    Analytics, CreateNoteRequest, Error, ListNotesRequest, Note, NoteRepository, OwnerId, Result,
    StatsRepository, UpdateNoteRequest, User, UserCredentials, UserRepository,
};

pub const SECRET: &[u8] = b"integration-test-secret-0123456789";

// =============================================================================
// IN-MEMORY REPOSITORIES
// =============================================================================

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<UserCredentials>>,
}

impl MemoryUsers {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.email == email) {
            return Err(Error::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        let row = UserCredentials {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row.into_user())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.email == email).cloned())
    }
}

#[derive(Default)]
pub struct MemoryNotes {
    rows: Mutex<Vec<Note>>,
}

impl MemoryNotes {
    pub fn snapshot(&self) -> Vec<Note> {
        self.rows.lock().unwrap().clone()
    }

    fn with_note<T>(&self, owner: OwnerId, id: Uuid, f: impl FnOnce(&mut Note) -> T) -> Result<T> {
        let mut rows = self.rows.lock().unwrap();
        rows.iter_mut()
            .find(|n| n.id == id && n.user_id == owner.as_uuid())
            .map(f)
            .ok_or_else(|| Error::NotFound("Note not found".to_string()))
    }
}

/// Every query word must appear in the title or content, ignoring case.
fn matches_search(note: &Note, query: &str) -> bool {
    let haystack = format!(
        "{} {}",
        note.title,
        note.content.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    query
        .split_whitespace()
        .all(|word| haystack.contains(&word.to_lowercase()))
}

#[async_trait]
impl NoteRepository for MemoryNotes {
    async fn list(&self, owner: OwnerId, req: ListNotesRequest) -> Result<Vec<Note>> {
        let req = req.validated()?;
        let mut notes: Vec<Note> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == owner.as_uuid())
            .filter(|n| n.is_archived == req.archived)
            .filter(|n| !req.pinned || n.is_pinned)
            .filter(|n| req.tag.as_ref().map_or(true, |t| n.tags.contains(t)))
            .filter(|n| req.search.as_ref().map_or(true, |q| matches_search(n, q)))
            .cloned()
            .collect();

        notes.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        let offset = req.offset.unwrap_or(0) as usize;
        let limit = req.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(notes.into_iter().skip(offset).take(limit).collect())
    }

    async fn fetch(&self, owner: OwnerId, id: Uuid) -> Result<Note> {
        self.with_note(owner, id, |n| n.clone())
    }

    async fn insert(&self, owner: OwnerId, req: CreateNoteRequest) -> Result<Note> {
        let req = req.validated()?;
        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            user_id: owner.as_uuid(),
            title: req.title,
            content: req.content,
            file_url: req.file_url,
            tags: req.tags,
            is_pinned: req.is_pinned,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn update(&self, owner: OwnerId, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let req = req.validated()?;
        self.with_note(owner, id, |n| {
            n.title = req.title;
            if let Some(content) = req.content {
                n.content = Some(content);
            }
            if let Some(tags) = req.tags {
                n.tags = tags;
            }
            if let Some(pinned) = req.is_pinned {
                n.is_pinned = pinned;
            }
            n.updated_at = Utc::now();
            n.clone()
        })
    }

    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|n| !(n.id == id && n.user_id == owner.as_uuid()));
        if rows.len() == before {
            return Err(Error::NotFound("Note not found".to_string()));
        }
        Ok(())
    }

    async fn toggle_pin(&self, owner: OwnerId, id: Uuid) -> Result<Note> {
        self.with_note(owner, id, |n| {
            n.is_pinned = !n.is_pinned;
            n.updated_at = Utc::now();
            n.clone()
        })
    }

    async fn set_archived(&self, owner: OwnerId, id: Uuid, archived: bool) -> Result<Note> {
        self.with_note(owner, id, |n| {
            n.is_archived = archived;
            n.updated_at = Utc::now();
            n.clone()
        })
    }

    async fn tags_for_owner(&self, owner: OwnerId) -> Result<Vec<String>> {
        let rows = self.rows.lock().unwrap();
        let tags: BTreeSet<String> = rows
            .iter()
            .filter(|n| n.user_id == owner.as_uuid() && !n.is_archived)
            .flat_map(|n| n.tags.iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }
}

pub struct MemoryStats {
    users: Arc<MemoryUsers>,
    notes: Arc<MemoryNotes>,
}

#[async_trait]
impl StatsRepository for MemoryStats {
    async fn analytics(&self) -> Result<Analytics> {
        let notes = self.notes.snapshot();
        let count = |pred: fn(&Note) -> bool| notes.iter().filter(|n| pred(n)).count() as i64;
        Ok(Analytics {
            users: self.users.count() as i64,
            notes: count(|n| !n.is_archived),
            archived: count(|n| n.is_archived),
            pinned: count(|n| n.is_pinned),
            tagged: count(|n| !n.tags.is_empty()),
        })
    }
}

// =============================================================================
// TEST APP
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub sessions: SessionIssuer,
    pub users: Arc<MemoryUsers>,
    pub notes: Arc<MemoryNotes>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUsers::default());
        let notes = Arc::new(MemoryNotes::default());
        let stats = Arc::new(MemoryStats {
            users: users.clone(),
            notes: notes.clone(),
        });
        let sessions =
            SessionIssuer::new(SECRET, Duration::seconds(DEFAULT_SESSION_TTL_SECS)).unwrap();

        let state = AppState::new(users.clone(), notes.clone(), stats, sessions.clone());
        let router = build_router(state, &["http://localhost:5173".to_string()]);

        Self {
            router,
            sessions,
            users,
            notes,
        }
    }

    /// A session for a fresh owner, minted directly without signup.
    pub fn owner_token(&self) -> (Uuid, String) {
        let user_id = Uuid::now_v7();
        (user_id, self.sessions.issue(user_id).unwrap())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), None).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Create a note and return its JSON.
    pub async fn create_note(&self, token: &str, body: Value) -> Value {
        let (status, note) = self.post("/notes", token, body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", note);
        note
    }
}

/// Ids of a JSON array of notes, in order.
pub fn ids(notes: &Value) -> Vec<String> {
    notes
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect()
}
