//! Sender credentials and alternative authentication

use std::fmt;

/// Gateway sender id and password
#[derive(Clone, PartialEq, Eq)]
pub struct SenderCredentials {
    pub sender_id: String,
    pub password: String,
}

impl SenderCredentials {
    pub fn new(sender_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SenderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderCredentials")
            .field("sender_id", &self.sender_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `Method`/`Value` pair written into `IDAuthentication/Authentication`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationValue {
    pub method: String,
    pub value: String,
}

/// Derives the authentication value for `alternative` mode
///
/// Departments define their own scheme (typically a digest over the sender
/// id, password and transaction id), so the client only provides the seam.
pub trait AlternativeAuthenticator: Send + Sync {
    fn authenticate(
        &self,
        credentials: &SenderCredentials,
        transaction_id: &str,
    ) -> Result<AuthenticationValue, String>;
}
