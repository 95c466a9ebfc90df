//! Administrator authorization.
//!
//! Handlers never consult a global list. The running policy is injected as
//! `Data<Arc<dyn AuthorizationPolicy>>` so tests and deployments can swap it.

use crate::app_config::AdminConfig;
use crate::error::{Error, Result};
use std::collections::HashSet;

pub trait AuthorizationPolicy: Send + Sync {
    /// True if the identity-provider uid may perform administrator actions.
    fn is_admin(&self, uid: &str) -> bool;

    /// Maps a missing uid to `AuthenticationRequired` and a non-admin to `Forbidden`.
    fn require_admin(&self, uid: Option<&str>) -> Result<()> {
        match uid {
            None => Err(Error::AuthenticationRequired),
            Some(uid) if self.is_admin(uid) => Ok(()),
            Some(uid) => {
                log::warn!("Administrator action refused for uid {}", uid);
                Err(Error::Forbidden)
            }
        }
    }
}

/// Grants administrator rights to a fixed set of uids.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowlist {
    uids: HashSet<String>,
}

impl AdminAllowlist {
    pub fn new<I, S>(uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uids: uids
                .into_iter()
                .map(Into::into)
                .filter(|uid: &String| !uid.trim().is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.uids.iter().cloned())
    }
}

impl AuthorizationPolicy for AdminAllowlist {
    fn is_admin(&self, uid: &str) -> bool {
        self.uids.contains(uid)
    }
}
