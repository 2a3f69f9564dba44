//! Application session: who is signed in, passed explicitly to whatever
//! needs the token instead of living in ambient storage.

use core::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Owner,
    Worker,
}

/// Part of the application a role lands in after sign-in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Area {
    Admin,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Worker => "worker",
        }
    }

    pub fn area(&self) -> Area {
        match self {
            Role::Admin | Role::Owner => Area::Admin,
            Role::Worker => Area::Worker,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            "worker" => Ok(Role::Worker),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub token: String,
    pub username: String,
    pub role: Role,
}

/// Shared handle; clones see the same sign-in state.
#[derive(Debug, Clone, Default)]
pub struct AppSession {
    inner: Arc<RwLock<Option<Identity>>>,
}

impl AppSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        let session = Self::new();
        session.sign_in(identity);
        session
    }

    pub fn sign_in(&self, identity: Identity) {
        tracing::info!(username = %identity.username, role = %identity.role, "signed in");
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(identity);
    }

    pub fn current(&self) -> Option<Identity> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|identity| identity.token)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            tracing::info!("signed out");
        }
    }
}
