use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Sessions older than this are rejected and dropped.
pub const SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Logged-in session tokens with their issue time. Memory only; a restart
/// logs everyone out.
#[derive(Clone)]
pub struct SessionRegistry {
    tokens: Arc<RwLock<HashMap<String, Instant>>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Issues a token. Expired tokens are swept on every login.
    pub async fn open(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let mut tokens = self.tokens.write().await;
        let ttl = self.ttl;
        tokens.retain(|_, issued| issued.elapsed() < ttl);
        tokens.insert(token.clone(), Instant::now());
        token
    }

    pub async fn is_open(&self, token: &str) -> bool {
        {
            let tokens = self.tokens.read().await;
            match tokens.get(token) {
                Some(issued) if issued.elapsed() < self.ttl => return true,
                None => return false,
                Some(_) => {}
            }
        }
        self.tokens.write().await.remove(token);
        false
    }

    pub async fn close(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }
}

/// Bearer token of the request, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or(AppError::Unauthorized)?
        .to_string();
    if !state.sessions.is_open(&token).await {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(req).await)
}
