//! Identity resolution for authors and voters.
//!
//! Authentication happens upstream; the identity provider hands us an opaque
//! uid. Users are created lazily the first time a uid syncs or posts.

use crate::constants::TRUST_LOGGED_IN_USER;
use crate::error::{Error, Result};
use crate::orm::users;
use chrono::NaiveDateTime;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, SqlErr};

/// Who is casting a vote. Exactly one channel is recorded per vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoterIdentity {
    /// An authenticated user id
    User(i32),
    /// Fingerprint of an anonymous device
    Device(String),
}

impl VoterIdentity {
    /// Prefers the authenticated user, falling back to the device fingerprint.
    pub fn resolve(user_id: Option<i32>, fingerprint: Option<String>) -> Option<Self> {
        match (user_id, fingerprint) {
            (Some(id), _) => Some(VoterIdentity::User(id)),
            (None, Some(fp)) if !fp.is_empty() => Some(VoterIdentity::Device(fp)),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        match self {
            VoterIdentity::User(id) => Some(*id),
            VoterIdentity::Device(_) => None,
        }
    }

    pub fn device_id(&self) -> Option<String> {
        match self {
            VoterIdentity::User(_) => None,
            VoterIdentity::Device(fp) => Some(fp.clone()),
        }
    }
}

/// Hashes client signals (user agent, language, address, ...) into a stable
/// hex fingerprint.
pub fn device_fingerprint(signals: &[&str]) -> String {
    blake3::hash(signals.join("|").as_bytes()).to_hex().to_string()
}

/// Privacy-preserving hash of an email address, case-insensitive.
pub fn hash_email(email: &str) -> String {
    blake3::hash(email.trim().to_lowercase().as_bytes())
        .to_hex()
        .to_string()
}

pub async fn find_by_uid(db: &DatabaseConnection, uid: &str) -> Result<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::ExternalUid.eq(uid))
        .one(db)
        .await?)
}

/// Returns the user for `uid`, creating one on first sight.
pub async fn find_or_create(
    db: &DatabaseConnection,
    uid: &str,
    now: NaiveDateTime,
) -> Result<users::Model> {
    if let Some(user) = find_by_uid(db, uid).await? {
        return Ok(user);
    }

    let user = users::ActiveModel {
        external_uid: Set(Some(uid.to_string())),
        email_hash: Set(None),
        trust_score: Set(TRUST_LOGGED_IN_USER),
        is_verified: Set(false),
        created_at: Set(now),
        ..Default::default()
    };

    match user.insert(db).await {
        Ok(user) => {
            log::debug!("Created user {} on first use", user.id);
            Ok(user)
        }
        // Lost a race with a concurrent first request for the same uid.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_by_uid(db, uid).await?.ok_or(Error::Database(err))
        }
        Err(err) => Err(err.into()),
    }
}

/// Result of [`sync_user`]
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub user: users::Model,
    pub created: bool,
}

/// Registers an identity-provider account. Existing uids are returned as-is.
pub async fn sync_user(
    db: &DatabaseConnection,
    uid: &str,
    email: &str,
    now: NaiveDateTime,
) -> Result<SyncOutcome> {
    if uid.trim().is_empty() || email.trim().is_empty() {
        return Err(Error::InvalidInput("Missing required fields".to_string()));
    }

    if let Some(user) = find_by_uid(db, uid).await? {
        return Ok(SyncOutcome {
            user,
            created: false,
        });
    }

    let email_hash = hash_email(email);
    let user = users::ActiveModel {
        external_uid: Set(Some(uid.to_string())),
        email_hash: Set(Some(email_hash)),
        trust_score: Set(TRUST_LOGGED_IN_USER),
        is_verified: Set(true),
        created_at: Set(now),
        ..Default::default()
    };

    match user.insert(db).await {
        Ok(user) => Ok(SyncOutcome {
            user,
            created: true,
        }),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            Error::conflict("Email already registered with different account", None),
        ),
        Err(err) => Err(err.into()),
    }
}
