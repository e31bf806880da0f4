use tracing::{info, warn};

use parley_shared::countries::DialOption;
use parley_shared::User;
use parley_store::StateStore;

use crate::auth::{self, LoginStep};
use crate::client::Client;
use crate::countries;
use crate::error::Result;
use crate::events::{ClientEvent, NoticeLevel};

impl Client {
    /// Start sign-in: check the number and "send" a code to it.
    pub async fn request_otp(&self, country_code: &str, phone_number: &str) -> Result<()> {
        let checked = self.lock()?.auth.check_phone(country_code, phone_number);
        if let Err(e) = checked {
            if e.is_validation() {
                self.events.notice(NoticeLevel::Error, "Error", e.to_string());
            }
            return Err(e);
        }

        tokio::time::sleep(self.config.otp_send_delay).await;

        let step = {
            let mut guard = self.lock()?;
            guard.auth.otp_sent(country_code, phone_number);
            guard.auth.step().clone()
        };

        info!(country_code, "OTP sent");
        self.events.emit(ClientEvent::LoginStepChanged { step });
        self.events.notice(
            NoticeLevel::Success,
            "OTP Sent",
            format!(
                "Verification code sent to {} {}",
                country_code.trim(),
                phone_number.trim()
            ),
        );
        Ok(())
    }

    /// Finish sign-in with the code from [`request_otp`](Self::request_otp).
    pub async fn verify_otp(&self, code: &str) -> Result<User> {
        tokio::time::sleep(self.config.otp_verify_delay).await;

        let mut guard = self.lock()?;
        if let Err(e) = guard.auth.check_otp(code) {
            drop(guard);
            if auth::is_invalid_otp(&e) {
                self.events
                    .notice(NoticeLevel::Error, "Error", "Invalid OTP. Please try again.");
            }
            return Err(e);
        }

        let user = guard.auth.authenticate()?;
        if let Err(e) = guard.storage().save_user(&user) {
            warn!(error = %e, "failed to persist user, session will not survive a restart");
        }
        drop(guard);

        info!(user = %user.id, "signed in");
        self.events.emit(ClientEvent::LoginStepChanged {
            step: LoginStep::Authenticated,
        });
        self.events.emit(ClientEvent::SessionChanged {
            user: Some(user.clone()),
        });
        self.events
            .notice(NoticeLevel::Success, "Success", "Login successful!");
        Ok(user)
    }

    /// Leave the OTP form and return to phone entry.
    pub fn back_to_phone(&self) -> Result<bool> {
        let changed = self.lock()?.auth.back();
        if changed {
            self.events.emit(ClientEvent::LoginStepChanged {
                step: LoginStep::EnterPhone,
            });
        }
        Ok(changed)
    }

    /// Sign out. Rooms stay on disk for the next sign-in.
    pub fn logout(&self) -> Result<Option<User>> {
        let mut guard = self.lock()?;
        let user = guard.auth.logout();
        if user.is_none() {
            return Ok(None);
        }
        if let Err(e) = guard.storage().remove_user() {
            warn!(error = %e, "failed to remove persisted user");
        }
        drop(guard);

        info!("signed out");
        self.events.emit(ClientEvent::SessionChanged { user: None });
        self.events.emit(ClientEvent::LoginStepChanged {
            step: LoginStep::EnterPhone,
        });
        self.events
            .notice(NoticeLevel::Info, "Logged out", "You have been logged out");
        Ok(user)
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        Ok(self.lock()?.auth.user().cloned())
    }

    pub fn login_step(&self) -> Result<LoginStep> {
        Ok(self.lock()?.auth.step().clone())
    }

    /// Country dial codes for the phone form. Never fails.
    pub async fn countries(&self) -> Vec<DialOption> {
        countries::dial_options(&self.config.countries_url, self.config.countries_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use parley_store::{KeyValueStore, MemoryStore};

    use super::*;
    use crate::error::ClientError;
    use crate::ClientConfig;

    fn signed_out_client() -> (Client, MemoryStore) {
        let store = MemoryStore::new();
        let client = Client::new(ClientConfig::default(), Box::new(store.clone()));
        (client, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_phone_then_otp_signs_in_and_persists() {
        let (client, store) = signed_out_client();
        assert!(client.current_user().unwrap().is_none());

        client.request_otp("+91", "9876543210").await.unwrap();
        assert!(matches!(
            client.login_step().unwrap(),
            LoginStep::OtpSent { .. }
        ));

        let user = client.verify_otp("123456").await.unwrap();
        assert_eq!(user.phone_number, "9876543210");
        assert_eq!(client.login_step().unwrap(), LoginStep::Authenticated);
        assert_eq!(store.load_user(), Some(user.clone()));

        let restored = Client::new(ClientConfig::default(), Box::new(store));
        assert_eq!(restored.current_user().unwrap(), Some(user));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_phone_is_rejected_without_delay() {
        let (client, _) = signed_out_client();
        let mut events = client.subscribe();

        let err = client.request_otp("+91", "12345").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(client.login_step().unwrap(), LoginStep::EnterPhone);
        assert!(matches!(events.try_recv().unwrap(), ClientEvent::Notice(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_length_otp_keeps_form_open() {
        let (client, store) = signed_out_client();
        client.request_otp("+1", "5550100").await.unwrap();
        let mut events = client.subscribe();

        let err = client.verify_otp("123").await.unwrap_err();
        assert!(auth::is_invalid_otp(&err));
        assert!(matches!(client.login_step().unwrap(), LoginStep::OtpSent { .. }));
        assert!(store.get(parley_shared::constants::AUTH_KEY).unwrap().is_none());

        match events.try_recv().unwrap() {
            ClientEvent::Notice(n) => assert_eq!(n.message, "Invalid OTP. Please try again."),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_otp_without_request_is_rejected() {
        let (client, _) = signed_out_client();
        assert!(matches!(
            client.verify_otp("123456").await,
            Err(ClientError::OtpNotRequested)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_and_logout() {
        let (client, store) = signed_out_client();
        client.request_otp("+1", "5550100").await.unwrap();
        assert!(client.back_to_phone().unwrap());
        assert!(!client.back_to_phone().unwrap());

        client.request_otp("+1", "5550100").await.unwrap();
        client.verify_otp("000000").await.unwrap();
        client.create_room("Kept").unwrap();

        assert!(client.logout().unwrap().is_some());
        assert!(client.current_user().unwrap().is_none());
        assert!(store.load_user().is_none());
        assert_eq!(store.load_rooms().len(), 1);
        assert!(client.logout().unwrap().is_none());
    }
}
