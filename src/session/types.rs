use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    /// Display name. May be empty; the server does not require one.
    pub name: String,
}

/// Current authentication state.
///
/// `token` absent means unauthenticated. `user` may lag behind the server
/// until `SessionManager::refresh_profile` is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "authToken")]
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn authenticated(token: String, user: User) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Body returned by `/login` and `/register`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}
