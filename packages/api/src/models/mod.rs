//! Typed form inputs and client-facing projections of stored records.

mod forms;
mod user;

pub use forms::{
    AddressInput, ChangePasswordInput, LoginInput, PaymentInput, ProfileInput, SignupInput,
};
pub use user::UserInfo;
