//! Credential store access.
//!
//! The credential store asks for its password through a [`PasswordChallenge`]
//! handed to it for the length of one access. The challenge answers the first
//! request with the configured password and refuses every later one: the store
//! only asks again after the previous password was wrong. Afterwards the
//! [`CredentialAccessor`] turns the challenge outcome into an error or the list
//! of identities.

use super::types::SigningIdentity;
use crate::config::StoreSettings;
use crate::error::{Error, Result};

/// Answer to one password request from the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeResponse<'a> {
    /// Use this password
    Password(&'a str),
    /// No password was configured
    PasswordNeeded,
    /// A password was already handed out and the store asked again
    PasswordRejected,
}

impl ChallengeResponse<'_> {
    /// The password carried by the response, if any.
    pub fn password(&self) -> Option<&str> {
        match self {
            ChallengeResponse::Password(pw) => Some(*pw),
            _ => None,
        }
    }
}

/// How a store session ended, as far as the password is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// The store never asked, or accepted the password
    Accepted,
    /// The store asked and no password was configured
    PasswordNeeded,
    /// The store asked again after receiving the password
    PasswordRejected,
}

/// Password protocol for a single credential store session.
#[derive(Debug)]
pub struct PasswordChallenge<'a> {
    password: Option<&'a str>,
    password_supplied_once: bool,
    password_needed: bool,
    password_rejected: bool,
}

impl<'a> PasswordChallenge<'a> {
    /// Start a session with the configured password; empty counts as none.
    pub fn new(password: Option<&'a str>) -> Self {
        Self {
            password: password.filter(|pw| !pw.is_empty()),
            password_supplied_once: false,
            password_needed: false,
            password_rejected: false,
        }
    }

    /// Called by the store whenever it needs the password.
    pub fn respond(&mut self, prompt: &str) -> ChallengeResponse<'a> {
        if self.password_supplied_once {
            log::debug!("Credential store asked again ({}), rejecting", prompt);
            self.password_rejected = true;
            return ChallengeResponse::PasswordRejected;
        }
        self.password_supplied_once = true;
        match self.password {
            Some(pw) => ChallengeResponse::Password(pw),
            None => {
                log::debug!("Credential store asked for a password ({}), none configured", prompt);
                self.password_needed = true;
                ChallengeResponse::PasswordNeeded
            },
        }
    }

    /// Outcome of the session. A missing password wins over a rejected one.
    pub fn outcome(&self) -> ChallengeOutcome {
        if self.password_needed {
            ChallengeOutcome::PasswordNeeded
        } else if self.password_rejected {
            ChallengeOutcome::PasswordRejected
        } else {
            ChallengeOutcome::Accepted
        }
    }
}

/// External credential store holding signing keys and certificates.
pub trait CredentialStore {
    /// List the identities usable for signing.
    ///
    /// The store calls [`PasswordChallenge::respond`] each time it needs the
    /// password while opening itself.
    fn signing_identities(&mut self, challenge: &mut PasswordChallenge<'_>) -> Vec<SigningIdentity>;
}

/// Lists signing identities, translating password failures into errors.
pub struct CredentialAccessor<'a, S: CredentialStore> {
    store: &'a mut S,
    settings: &'a StoreSettings,
}

impl<'a, S: CredentialStore> CredentialAccessor<'a, S> {
    /// Create an accessor over `store` with the configured store settings.
    pub fn new(store: &'a mut S, settings: &'a StoreSettings) -> Self {
        Self { store, settings }
    }

    /// List the signing identities.
    ///
    /// Both signing modes call this before signing even though they ignore the
    /// identities, since an unopened store can hang the signing call.
    pub fn list_signing_identities(&mut self) -> Result<Vec<SigningIdentity>> {
        let mut challenge = PasswordChallenge::new(self.settings.password());
        let identities = self.store.signing_identities(&mut challenge);
        match challenge.outcome() {
            ChallengeOutcome::PasswordNeeded => Err(Error::StorePasswordNeeded),
            ChallengeOutcome::PasswordRejected => Err(Error::StorePasswordRejected),
            ChallengeOutcome::Accepted => {
                log::debug!("Credential store offers {} signing identities", identities.len());
                Ok(identities)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that asks for the password `asks` times and accepts only `expected`.
    struct ScriptedStore {
        asks: usize,
        expected: Option<&'static str>,
        seen: Vec<Option<String>>,
    }

    impl ScriptedStore {
        fn new(asks: usize, expected: Option<&'static str>) -> Self {
            Self {
                asks,
                expected,
                seen: Vec::new(),
            }
        }
    }

    impl CredentialStore for ScriptedStore {
        fn signing_identities(
            &mut self,
            challenge: &mut PasswordChallenge<'_>,
        ) -> Vec<SigningIdentity> {
            for _ in 0..self.asks {
                let response = challenge.respond("NSS Certificate DB");
                let given = response.password().map(str::to_string);
                let accepted = given.is_some() && given.as_deref() == self.expected;
                self.seen.push(given);
                if accepted {
                    return vec![SigningIdentity::new("alice")];
                }
            }
            if self.asks == 0 {
                vec![SigningIdentity::new("alice"), SigningIdentity::new("bob")]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_first_response_is_configured_password() {
        let mut challenge = PasswordChallenge::new(Some("x"));
        assert_eq!(challenge.respond("db"), ChallengeResponse::Password("x"));
        assert_eq!(challenge.outcome(), ChallengeOutcome::Accepted);
    }

    #[test]
    fn test_second_response_is_always_rejection() {
        let mut challenge = PasswordChallenge::new(Some("x"));
        challenge.respond("db");
        assert_eq!(challenge.respond("db"), ChallengeResponse::PasswordRejected);
        assert_eq!(challenge.respond("db"), ChallengeResponse::PasswordRejected);
        assert_eq!(challenge.outcome(), ChallengeOutcome::PasswordRejected);
    }

    #[test]
    fn test_missing_password_is_needed() {
        let mut challenge = PasswordChallenge::new(None);
        assert_eq!(challenge.respond("db"), ChallengeResponse::PasswordNeeded);
        assert_eq!(challenge.outcome(), ChallengeOutcome::PasswordNeeded);
    }

    #[test]
    fn test_needed_wins_over_rejected() {
        let mut challenge = PasswordChallenge::new(Some(""));
        assert_eq!(challenge.respond("db"), ChallengeResponse::PasswordNeeded);
        assert_eq!(challenge.respond("db"), ChallengeResponse::PasswordRejected);
        assert_eq!(challenge.outcome(), ChallengeOutcome::PasswordNeeded);
    }

    #[test]
    fn test_accessor_without_challenge() {
        let mut store = ScriptedStore::new(0, None);
        let settings = StoreSettings::default();
        let identities = CredentialAccessor::new(&mut store, &settings)
            .list_signing_identities()
            .unwrap();
        assert_eq!(identities.len(), 2);
        assert!(store.seen.is_empty());
    }

    #[test]
    fn test_accessor_accepted_password() {
        let mut store = ScriptedStore::new(3, Some("right"));
        let settings = StoreSettings {
            directory: None,
            password: Some("right".to_string()),
        };
        let identities = CredentialAccessor::new(&mut store, &settings)
            .list_signing_identities()
            .unwrap();
        assert_eq!(identities, vec![SigningIdentity::new("alice")]);
        assert_eq!(store.seen, vec![Some("right".to_string())]);
    }

    #[test]
    fn test_accessor_wrong_password() {
        let mut store = ScriptedStore::new(3, Some("right"));
        let settings = StoreSettings {
            directory: None,
            password: Some("wrong".to_string()),
        };
        let err = CredentialAccessor::new(&mut store, &settings)
            .list_signing_identities()
            .unwrap_err();
        assert!(matches!(err, Error::StorePasswordRejected));
        assert_eq!(store.seen, vec![Some("wrong".to_string()), None, None]);
    }

    #[test]
    fn test_accessor_missing_password() {
        let mut store = ScriptedStore::new(1, Some("right"));
        let settings = StoreSettings::default();
        let err = CredentialAccessor::new(&mut store, &settings)
            .list_signing_identities()
            .unwrap_err();
        assert!(matches!(err, Error::StorePasswordNeeded));
    }

    #[test]
    fn test_sessions_do_not_share_state() {
        let mut store = ScriptedStore::new(1, Some("right"));
        let settings = StoreSettings {
            directory: None,
            password: Some("right".to_string()),
        };
        for _ in 0..2 {
            let identities = CredentialAccessor::new(&mut store, &settings)
                .list_signing_identities()
                .unwrap();
            assert_eq!(identities.len(), 1);
        }
        assert_eq!(store.seen.len(), 2);
    }
}
