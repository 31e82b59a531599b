use store::StoreError;

use crate::avatar::AvatarError;
use crate::validation::ValidationErrors;

/// Failure of an [`AccountService`](super::AccountService) operation.
///
/// The `Display` text of every variant is fit to show to the user, except
/// [`Storage`](Self::Storage), which a UI should replace with a generic notice.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Email already exists")]
    EmailTaken,
    /// Unknown username and wrong password share this variant.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("You need to sign in first")]
    NotSignedIn,
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Avatar(#[from] AvatarError),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}
