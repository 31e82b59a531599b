//! # API crate: account operations for the Accounts demo
//!
//! This crate sits between view code and the `store` crate. Views hand it typed
//! form inputs; it validates them, applies the account rules and persists the
//! result through a [`store::RecordStore`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`account`] | [`AccountService`]: register, login, profile, addresses and payment methods for the signed-in user |
//! | [`validation`] | [`Validator`] field rules, form [`Schema`]s and [`ValidationErrors`] |
//! | [`models`] | Typed form inputs and the [`UserInfo`] projection |
//! | [`format`] | Phone, card number and expiry formatting |
//! | [`avatar`] | Checks on avatar `data:` URLs |
//!
//! ## Usage
//!
//! ```no_run
//! use api::{AccountService, AccountsConfig, MemoryStore, SignupInput};
//!
//! let accounts = AccountService::new(MemoryStore::new(), AccountsConfig::default())?;
//! let user = accounts.register(SignupInput {
//!     first_name: "John".into(),
//!     last_name: "Doe".into(),
//!     email: "john@example.com".into(),
//!     username: "johndoe".into(),
//!     password: "Secur3!ty".into(),
//!     confirm_password: "Secur3!ty".into(),
//! })?;
//! assert_eq!(accounts.current_user().map(|u| u.id), Some(user.id));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod account;
pub mod avatar;
pub mod format;
pub mod models;
pub mod validation;

pub use account::{AccountError, AccountService};
pub use avatar::{validate_avatar, AvatarError};
pub use models::{
    AddressInput, ChangePasswordInput, LoginInput, PaymentInput, ProfileInput, SignupInput,
    UserInfo,
};
pub use validation::{FieldError, Form, PasswordStrength, Schema, StrengthLevel, ValidationErrors, Validator};

pub use store::{AccountsConfig, KeyValueStore, MemoryStore, RecordId, User};
