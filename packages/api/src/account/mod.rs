//! # Account service
//!
//! [`AccountService`] is the boundary between form-handling code and the
//! [`RecordStore`]. Every operation validates its typed input, enforces
//! uniqueness and session rules, then persists through the store.
//!
//! ## Operations
//!
//! | Area | Methods |
//! |------|---------|
//! | Session | [`register`](AccountService::register), [`login`](AccountService::login), [`logout`](AccountService::logout), [`current_user`](AccountService::current_user), [`is_logged_in`](AccountService::is_logged_in) |
//! | Profile | [`update_profile`](AccountService::update_profile), [`change_password`](AccountService::change_password), [`update_avatar`](AccountService::update_avatar), [`remove_avatar`](AccountService::remove_avatar), [`delete_account`](AccountService::delete_account) |
//! | Addresses | `addresses`, `add_address`, `update_address`, `delete_address`, `set_default_address` |
//! | Payment methods | `payment_methods`, `add_payment_method`, `update_payment_method`, `delete_payment_method`, `set_default_payment_method` |
//!
//! Everything except `register` and `login` acts on the signed-in user and
//! fails with [`AccountError::NotSignedIn`] when there is none.
//!
//! ## Normalisation
//!
//! - usernames are trimmed and lowercased before lookup and storage;
//! - emails and names are trimmed;
//! - phone numbers are stored as bare digits, or not at all when blank.

mod addresses;
mod error;
mod payments;

pub use error::AccountError;

use store::{AccountsConfig, AvatarConfig, KeyValueStore, NewUser, RecordStore, StoreError, User, UserPatch};

use crate::avatar::validate_avatar;
use crate::format::clean_phone_number;
use crate::models::{ChangePasswordInput, LoginInput, ProfileInput, SignupInput};
use crate::validation::Validator;

/// Account operations over a record store.
pub struct AccountService<S: KeyValueStore> {
    records: RecordStore<S>,
    validator: Validator,
    avatar: AvatarConfig,
}

impl<S: KeyValueStore> AccountService<S> {
    /// Open the record store on `store` and build the validator, both from
    /// `config`.
    pub fn new(store: S, config: AccountsConfig) -> Result<Self, StoreError> {
        let AccountsConfig {
            storage,
            validation,
            avatar,
        } = config;
        Ok(Self {
            records: RecordStore::open(store, storage)?,
            validator: Validator::new(validation),
            avatar,
        })
    }

    pub fn records(&self) -> &RecordStore<S> {
        &self.records
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Create an account and sign it in.
    pub fn register(&self, input: SignupInput) -> Result<User, AccountError> {
        self.validator.check(&input)?;

        let username = normalize_username(&input.username);
        if self.records.get_user_by_username(&username).is_some() {
            return Err(AccountError::UsernameTaken);
        }
        let email = input.email.trim().to_string();
        if self.records.get_user_by_email(&email).is_some() {
            return Err(AccountError::EmailTaken);
        }

        let user = self
            .records
            .create_user(NewUser {
                username,
                password: input.password,
                email,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                phone: None,
                avatar: None,
            })
            .map_err(storage_failure("create user"))?;
        self.records
            .set_current_user(user.id)
            .map_err(storage_failure("start session"))?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Sign in with username and password.
    pub fn login(&self, input: LoginInput) -> Result<User, AccountError> {
        self.validator.check(&input)?;

        let user = match self.records.get_user_by_username(&input.username) {
            Some(user) if user.password == input.password => user,
            _ => {
                tracing::warn!("Rejected login for `{}`", input.username.trim());
                return Err(AccountError::InvalidCredentials);
            }
        };
        self.records
            .set_current_user(user.id)
            .map_err(storage_failure("start session"))?;

        tracing::info!("User {} signed in", user.id);
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), AccountError> {
        self.records
            .clear_current_user()
            .map_err(storage_failure("end session"))?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.records.get_current_user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    /// Replace the signed-in user's profile fields. Username and email must
    /// not belong to any other user.
    pub fn update_profile(&self, input: ProfileInput) -> Result<User, AccountError> {
        let user = self.signed_in()?;
        self.validator.check(&input)?;

        let username = normalize_username(&input.username);
        if self
            .records
            .get_user_by_username(&username)
            .is_some_and(|other| other.id != user.id)
        {
            return Err(AccountError::UsernameTaken);
        }
        let email = input.email.trim().to_string();
        if self
            .records
            .get_user_by_email(&email)
            .is_some_and(|other| other.id != user.id)
        {
            return Err(AccountError::EmailTaken);
        }

        let phone = clean_phone_number(&input.phone);
        let patch = UserPatch {
            username: Some(username),
            email: Some(email),
            first_name: Some(input.first_name.trim().to_string()),
            last_name: Some(input.last_name.trim().to_string()),
            phone: Some((!phone.is_empty()).then_some(phone)),
            ..Default::default()
        };
        self.patch_current(user.id, patch, "update profile")
    }

    pub fn change_password(&self, input: ChangePasswordInput) -> Result<User, AccountError> {
        let user = self.signed_in()?;
        self.validator.check(&input)?;
        if user.password != input.current_password {
            return Err(AccountError::IncorrectPassword);
        }

        let patch = UserPatch {
            password: Some(input.new_password),
            ..Default::default()
        };
        let user = self.patch_current(user.id, patch, "change password")?;
        tracing::info!("User {} changed their password", user.id);
        Ok(user)
    }

    /// Store a `data:` URL as the signed-in user's avatar.
    pub fn update_avatar(&self, data_url: &str) -> Result<User, AccountError> {
        let user = self.signed_in()?;
        validate_avatar(data_url, &self.avatar)?;
        let patch = UserPatch {
            avatar: Some(Some(data_url.to_string())),
            ..Default::default()
        };
        self.patch_current(user.id, patch, "update avatar")
    }

    pub fn remove_avatar(&self) -> Result<User, AccountError> {
        let user = self.signed_in()?;
        let patch = UserPatch {
            avatar: Some(None),
            ..Default::default()
        };
        self.patch_current(user.id, patch, "remove avatar")
    }

    /// Delete the signed-in user, which also ends the session.
    pub fn delete_account(&self) -> Result<(), AccountError> {
        let user = self.signed_in()?;
        self.records
            .delete_user(user.id)
            .map_err(storage_failure("delete account"))?;
        tracing::info!("Deleted user {}", user.id);
        Ok(())
    }

    fn signed_in(&self) -> Result<User, AccountError> {
        self.current_user().ok_or(AccountError::NotSignedIn)
    }

    fn patch_current(
        &self,
        user_id: store::RecordId,
        patch: UserPatch,
        action: &'static str,
    ) -> Result<User, AccountError> {
        self.records
            .update_user(user_id, patch)
            .map_err(storage_failure(action))?
            .ok_or(AccountError::NotFound("User"))
    }
}

fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Log a failed write at the service boundary and wrap it.
fn storage_failure(action: &'static str) -> impl FnOnce(StoreError) -> AccountError {
    move |e| {
        tracing::error!("Failed to {}: {}", action, e);
        AccountError::Storage(e)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use store::MemoryStore;

    pub(crate) fn service() -> AccountService<MemoryStore> {
        AccountService::new(MemoryStore::new(), AccountsConfig::default()).unwrap()
    }

    pub(crate) fn signup(username: &str, email: &str) -> SignupInput {
        SignupInput {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password: "Secur3!ty".to_string(),
            confirm_password: "Secur3!ty".to_string(),
        }
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn profile(user: &User) -> ProfileInput {
        ProfileInput {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            phone: String::new(),
        }
    }

    #[test]
    fn test_register_session_login_scenario() {
        let accounts = service();

        let user = accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();
        assert_eq!(accounts.records().current_user_id(), Some(user.id));
        assert_eq!(accounts.current_user(), Some(user.clone()));
        assert!(accounts.is_logged_in());

        accounts.logout().unwrap();
        assert!(!accounts.is_logged_in());

        let again = accounts.login(login("johndoe", "Secur3!ty")).unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(accounts.current_user().map(|u| u.id), Some(user.id));
    }

    #[test]
    fn test_wrong_password_and_unknown_user_share_one_message() {
        let accounts = service();
        accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();
        accounts.logout().unwrap();

        let wrong = accounts.login(login("johndoe", "Wr0ng!pass")).unwrap_err();
        let unknown = accounts.login(login("nobody", "Secur3!ty")).unwrap_err();
        assert!(matches!(wrong, AccountError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(!accounts.is_logged_in());
    }

    #[test]
    fn test_login_ignores_username_case() {
        let accounts = service();
        accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();
        assert!(accounts.login(login("JohnDoe", "Secur3!ty")).is_ok());
    }

    #[test]
    fn test_register_validates_before_touching_storage() {
        let accounts = service();
        let err = accounts
            .register(SignupInput {
                password: "weak".to_string(),
                confirm_password: "weak".to_string(),
                ..signup("johndoe", "john@example.com")
            })
            .unwrap_err();
        let errors = match err {
            AccountError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert!(errors.get("password").is_some());
        assert!(accounts.records().get_all_users().is_empty());
        assert!(!accounts.is_logged_in());
    }

    #[test]
    fn test_username_uniqueness_ignores_case() {
        let accounts = service();
        let bob = accounts.register(signup("bob", "bob@example.com")).unwrap();
        assert_eq!(bob.username, "bob");

        let err = accounts
            .register(signup("Bob", "other@example.com"))
            .unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken));
        assert_eq!(accounts.records().get_all_users().len(), 1);
    }

    #[test]
    fn test_username_is_stored_lowercased() {
        let accounts = service();
        let user = accounts
            .register(signup("  JohnDoe ", "john@example.com"))
            .unwrap();
        assert_eq!(user.username, "johndoe");
    }

    #[test]
    fn test_email_must_be_unique() {
        let accounts = service();
        accounts.register(signup("alice", "same@example.com")).unwrap();
        let err = accounts
            .register(signup("bob", "same@example.com"))
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
    }

    #[test]
    fn test_update_profile() {
        let accounts = service();
        let user = accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();

        let updated = accounts
            .update_profile(ProfileInput {
                first_name: "Johnny".to_string(),
                phone: "091 234 5678".to_string(),
                ..profile(&user)
            })
            .unwrap();
        assert_eq!(updated.first_name, "Johnny");
        assert_eq!(updated.phone.as_deref(), Some("0912345678"));

        // Keeping one's own username and email is not a conflict; a blank phone clears it.
        let cleared = accounts.update_profile(profile(&updated)).unwrap();
        assert_eq!(cleared.phone, None);
        assert_eq!(cleared.username, "johndoe");
    }

    #[test]
    fn test_update_profile_rejects_other_users_names() {
        let accounts = service();
        accounts.register(signup("alice", "alice@example.com")).unwrap();
        let bob = accounts.register(signup("bob", "bob@example.com")).unwrap();

        let err = accounts
            .update_profile(ProfileInput {
                username: "ALICE".to_string(),
                ..profile(&bob)
            })
            .unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken));

        let err = accounts
            .update_profile(ProfileInput {
                email: "alice@example.com".to_string(),
                ..profile(&bob)
            })
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
    }

    #[test]
    fn test_profile_requires_session() {
        let accounts = service();
        let user = accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();
        accounts.logout().unwrap();
        assert!(matches!(
            accounts.update_profile(profile(&user)),
            Err(AccountError::NotSignedIn)
        ));
        assert!(matches!(accounts.remove_avatar(), Err(AccountError::NotSignedIn)));
    }

    #[test]
    fn test_change_password() {
        let accounts = service();
        accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();

        let err = accounts
            .change_password(ChangePasswordInput {
                current_password: "nope".to_string(),
                new_password: "N3w!passw".to_string(),
                confirm_password: "N3w!passw".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, AccountError::IncorrectPassword));

        accounts
            .change_password(ChangePasswordInput {
                current_password: "Secur3!ty".to_string(),
                new_password: "N3w!passw".to_string(),
                confirm_password: "N3w!passw".to_string(),
            })
            .unwrap();
        accounts.logout().unwrap();
        assert!(accounts.login(login("johndoe", "Secur3!ty")).is_err());
        assert!(accounts.login(login("johndoe", "N3w!passw")).is_ok());
    }

    #[test]
    fn test_avatar() {
        let accounts = service();
        accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();

        let url = "data:image/png;base64,iVBORw0KGgo=";
        let user = accounts.update_avatar(url).unwrap();
        assert_eq!(user.avatar.as_deref(), Some(url));

        let err = accounts
            .update_avatar("data:text/plain;base64,aGk=")
            .unwrap_err();
        assert!(matches!(err, AccountError::Avatar(_)));
        assert_eq!(accounts.current_user().unwrap().avatar.as_deref(), Some(url));

        let user = accounts.remove_avatar().unwrap();
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_delete_account_ends_session() {
        let accounts = service();
        let user = accounts
            .register(signup("johndoe", "john@example.com"))
            .unwrap();
        accounts.delete_account().unwrap();
        assert!(!accounts.is_logged_in());
        assert!(accounts.records().get_user_by_id(user.id).is_none());
        assert!(matches!(accounts.delete_account(), Err(AccountError::NotSignedIn)));
    }
}
