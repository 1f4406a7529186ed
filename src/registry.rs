//! Artifact registry.
//!
//! Maps a freshly minted session id to the manifest produced by one generation request.
//! Backed by a bounded cache: entries expire after a period without access or when the
//! capacity is exceeded, so abandoned sessions do not accumulate for the process lifetime.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Artifact, Manifest};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CAPACITY: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Session expired or invalid. Please generate documents again.")]
    SessionNotFound,
    #[error("File not found")]
    ArtifactNotFound,
}

#[derive(Clone)]
pub struct ArtifactRegistry {
    sessions: Cache<String, Arc<Manifest>>,
}

impl ArtifactRegistry {
    pub fn new(time_to_idle: Duration, max_capacity: u64) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(time_to_idle)
            .max_capacity(max_capacity)
            .build();
        Self { sessions }
    }

    /// Store a manifest under a new random session id.
    pub async fn store(&self, manifest: Manifest) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .insert(session_id.clone(), Arc::new(manifest))
            .await;
        log::debug!("Stored manifest for session {}", session_id);
        session_id
    }

    pub async fn lookup(&self, session_id: &str) -> Result<Arc<Manifest>, RegistryError> {
        self.sessions
            .get(session_id)
            .await
            .ok_or(RegistryError::SessionNotFound)
    }

    /// Find a generated file of a session by its generated name.
    pub async fn find_artifact(
        &self,
        session_id: &str,
        filename: &str,
    ) -> Result<Artifact, RegistryError> {
        let manifest = self.lookup(session_id).await?;
        manifest
            .find(filename)
            .cloned()
            .ok_or(RegistryError::ArtifactNotFound)
    }

    /// Remove a session. Discarding an unknown id is a no-op.
    pub async fn discard(&self, session_id: &str) {
        self.sessions.invalidate(session_id).await;
    }

    pub async fn len(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    /// Drop every session; called when the server stops.
    pub async fn shutdown(&self) {
        self.sessions.invalidate_all();
        self.sessions.run_pending_tasks().await;
        log::info!("Artifact registry cleared");
    }
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}
