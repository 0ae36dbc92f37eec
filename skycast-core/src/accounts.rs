//! SQLite-backed user accounts with salted password hashes.
//!
//! Username uniqueness is enforced by the table's primary key, so concurrent
//! creates for the same name resolve inside SQLite rather than through a
//! lookup beforehand.

use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params};
use sha2::{Digest, Sha256};
use std::{path::Path, time::Duration};

use crate::{error::AccountError, model::User};

pub type AccountResult<T> = Result<T, AccountError>;

/// Local SQLite storage for user credentials.
pub struct CredentialStore {
    conn: Mutex<Connection>,
}

impl CredentialStore {
    /// Open or create the database, creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY NOT NULL,
                password_hash TEXT NOT NULL,
                salt TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn create_account(&self, username: &str, password: &str) -> AccountResult<()> {
        validate(username, password)?;

        let salt = new_salt();
        let hash = hash_password(&salt, password);

        let conn = self.conn.lock();
        let res = conn.execute(
            "INSERT INTO users (username, password_hash, salt) VALUES (?1, ?2, ?3)",
            params![username, hash, salt],
        );

        match res {
            Ok(_) => {
                tracing::info!(username, "account created");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(username, "username already exists");
                Err(AccountError::DuplicateUser(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Unknown users and wrong passwords both yield [`AccountError::InvalidCredentials`].
    pub fn verify_login(&self, username: &str, password: &str) -> AccountResult<()> {
        validate(username, password)?;

        let conn = self.conn.lock();
        let user = find_user(&conn, username)?;

        match user {
            Some(user) if verify(&user, password) => {
                tracing::info!(username, "login successful");
                Ok(())
            }
            _ => {
                tracing::warn!(username, "invalid username or password");
                Err(AccountError::InvalidCredentials)
            }
        }
    }

    pub fn login(&self, username: &str, password: &str) -> AccountResult<()> {
        self.verify_login(username, password)
    }

    /// Replace the password after checking the old one, all within one write transaction.
    ///
    /// Unlike login, a missing user is reported as [`AccountError::UserNotFound`].
    pub fn update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> AccountResult<()> {
        validate(username, old_password)?;
        if new_password.is_empty() {
            return Err(AccountError::MissingField("New password"));
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let user = find_user(&tx, username)?
            .ok_or_else(|| AccountError::UserNotFound(username.to_string()))?;

        if !verify(&user, old_password) {
            tracing::warn!(username, "invalid old password");
            return Err(AccountError::InvalidCredentials);
        }

        let salt = new_salt();
        let hash = hash_password(&salt, new_password);

        let updated = tx.execute(
            "UPDATE users SET password_hash = ?1, salt = ?2
             WHERE username = ?3 AND password_hash = ?4",
            params![hash, salt, username, user.password_hash],
        )?;
        if updated != 1 {
            return Err(AccountError::InvalidCredentials);
        }

        tx.commit()?;
        tracing::info!(username, "password updated");
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> AccountResult<Option<User>> {
        let conn = self.conn.lock();
        find_user(&conn, username)
    }
}

fn find_user(conn: &Connection, username: &str) -> AccountResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT username, password_hash, salt FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok(User {
                    username: row.get(0)?,
                    password_hash: row.get(1)?,
                    salt: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(user)
}

fn validate(username: &str, password: &str) -> AccountResult<()> {
    if username.is_empty() {
        return Err(AccountError::MissingField("Username"));
    }
    if password.is_empty() {
        return Err(AccountError::MissingField("Password"));
    }
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn verify(user: &User, password: &str) -> bool {
    let candidate = hash_password(&user.salt, password);
    // Compare every byte so timing doesn't depend on the matching prefix.
    candidate.len() == user.password_hash.len()
        && candidate
            .bytes()
            .zip(user.password_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
