//! Accounts and sessions: password hashing, bearer tokens, and the
//! in-memory session registry the API middleware resolves tokens against.

use std::collections::HashMap;

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::db::repository;
use crate::models::{Role, User};
use crate::records::ServiceError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

const B64: base64::engine::general_purpose::GeneralPurpose =
    base64::engine::general_purpose::URL_SAFE_NO_PAD;

// ═══════════════════════════════════════════
// Password hashing — PBKDF2-SHA256, encoded "iterations$salt$hash"
// ═══════════════════════════════════════════

pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LENGTH] = rand::random();
    let digest = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "{}${}${}",
        PBKDF2_ITERATIONS,
        B64.encode(salt),
        B64.encode(digest)
    )
}

/// Constant-time verification against a stored encoded hash.
/// Malformed stored values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(iters), Some(salt), Some(hash)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let Ok(iterations) = iters.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(hash)) else {
        return false;
    };
    if expected.len() != HASH_LENGTH {
        return false;
    }

    let digest = derive(password, &salt, iterations);
    digest.ct_eq(expected.as_slice()).into()
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut digest = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut digest);
    digest
}

// ═══════════════════════════════════════════
// Bearer tokens + session registry
// ═══════════════════════════════════════════

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    B64.encode(bytes)
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// What a resolved session knows about its user.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// In-memory session registry keyed by token hash. Sessions live for the
/// process lifetime; there is no expiry or refresh (out of scope).
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<[u8; 32], SessionUser>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for the user and register it.
    pub fn issue(&mut self, user: &User) -> String {
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionUser {
                user_id: user.id,
                role: user.role,
            },
        );
        token
    }

    /// Resolve a presented token to its session user.
    pub fn resolve(&self, token: &str) -> Option<SessionUser> {
        self.sessions.get(&hash_token(token)).copied()
    }
}

// ═══════════════════════════════════════════
// Registration / login
// ═══════════════════════════════════════════

pub fn register_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<User, ServiceError> {
    if name.trim().is_empty() || email.trim().is_empty() {
        return Err(ServiceError::Validation("name and email are required".into()));
    }
    if password.is_empty() {
        return Err(ServiceError::Validation("password is required".into()));
    }
    if repository::get_user_by_email(conn, email)?.is_some() {
        return Err(ServiceError::Validation("email already registered".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password),
        role,
    };
    repository::insert_user(conn, &user)?;
    tracing::info!(email = %user.email, role = user.role.as_str(), "User registered");
    Ok(user)
}

/// Verify credentials; `None` means unknown email or wrong password
/// (deliberately indistinguishable).
pub fn authenticate(
    conn: &Connection,
    email: &str,
    password: &str,
) -> Result<Option<User>, ServiceError> {
    let Some(user) = repository::get_user_by_email(conn, email)? else {
        return Ok(None);
    };
    if verify_password(password, &user.password_hash) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn password_round_trip() {
        let stored = hash_password("correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &stored));
        assert!(!verify_password("wrong password", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same password");
        let b = hash_password("same password");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!verify_password("x", "not-an-encoded-hash"));
        assert!(!verify_password("x", "abc$def$ghi"));
        assert!(!verify_password("x", ""));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn registry_resolves_issued_tokens() {
        let conn = open_memory_database().unwrap();
        let user = register_user(&conn, "Ana", "ana@lab.test", "pw-123456", Role::Lab).unwrap();

        let mut registry = SessionRegistry::new();
        let token = registry.issue(&user);

        let session = registry.resolve(&token).unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::Lab);
        assert!(registry.resolve("bogus-token").is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let conn = open_memory_database().unwrap();
        register_user(&conn, "Ana", "ana@lab.test", "pw-123456", Role::Lab).unwrap();
        let second = register_user(&conn, "Ann", "ana@lab.test", "pw-abcdef", Role::Doctor);
        assert!(matches!(second, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn authenticate_checks_password() {
        let conn = open_memory_database().unwrap();
        register_user(&conn, "Ana", "ana@lab.test", "pw-123456", Role::Lab).unwrap();

        assert!(authenticate(&conn, "ana@lab.test", "pw-123456")
            .unwrap()
            .is_some());
        assert!(authenticate(&conn, "ana@lab.test", "nope")
            .unwrap()
            .is_none());
        assert!(authenticate(&conn, "ghost@lab.test", "pw-123456")
            .unwrap()
            .is_none());
    }
}
