//! Session - the signed-in user, injected rather than held in a global

use parking_lot::RwLock;
use reel_core::UserId;

/// The signed-in user as known to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

impl SessionUser {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            username: None,
            full_name: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Name shown next to the user's comments
    ///
    /// Falls back to the local part of the email when no username is set.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Holder of the current session user
#[derive(Debug, Default)]
pub struct Session {
    user: RwLock<Option<SessionUser>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current user; returns the previous one
    pub fn sign_in(&self, user: SessionUser) -> Option<SessionUser> {
        self.user.write().replace(user)
    }

    pub fn sign_out(&self) -> Option<SessionUser> {
        self.user.write().take()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.user.read().clone()
    }

    pub fn actor(&self) -> Option<UserId> {
        self.user.read().as_ref().map(|u| u.id.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let user = SessionUser::new("u1", "maria@example.com");
        assert_eq!(user.display_name(), "maria");

        let user = user.with_username("mcreates");
        assert_eq!(user.display_name(), "mcreates");
    }

    #[test]
    fn test_sign_in_and_out() {
        let session = Session::new();
        assert!(!session.is_signed_in());
        assert!(session.actor().is_none());

        assert!(session.sign_in(SessionUser::new("u1", "a@b.c")).is_none());
        assert_eq!(session.actor(), Some(UserId::new("u1")));

        let previous = session.sign_out().unwrap();
        assert_eq!(previous.id.as_str(), "u1");
        assert!(!session.is_signed_in());
    }
}
