//! # Form inputs
//!
//! One struct per form the account screens submit. Field names serialize as
//! camelCase, matching the keys used in [`ValidationErrors`](crate::ValidationErrors)
//! so a host UI can map an error straight back onto its input.
//!
//! | Input | Schema fields |
//! |-------|---------------|
//! | [`LoginInput`] | `username`, `password` (required only) |
//! | [`SignupInput`] | `firstName`, `lastName`, `email`, `username`, `password`, `confirmPassword` |
//! | [`ProfileInput`] | `firstName`, `lastName`, `email`, `username`, `phone` |
//! | [`ChangePasswordInput`] | `currentPassword` (required), `newPassword`, `confirmPassword` |
//! | [`AddressInput`] | `address`, `city` (required) |
//! | [`PaymentInput`] | `cardNumber`, `expiry`, `cardName` (required) |

use serde::{Deserialize, Serialize};
use store::{AddressType, CardBrand};

use crate::validation::{Form, Schema};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl Form for LoginInput {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("username", |v, f: &Self| v.validate_username(&f.username))
            .field("password", |v, f: &Self| v.validate_required(&f.password, "Password"))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl Form for SignupInput {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("firstName", |v, f: &Self| v.validate_name(&f.first_name, "First name"))
            .field("lastName", |v, f: &Self| v.validate_name(&f.last_name, "Last name"))
            .field("email", |v, f: &Self| v.validate_email(&f.email))
            .field("username", |v, f: &Self| v.validate_username(&f.username))
            .field("password", |v, f: &Self| v.validate_password(&f.password))
            .field("confirmPassword", |v, f: &Self| {
                v.validate_confirm_password(&f.password, &f.confirm_password)
            })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    /// Blank clears the phone number.
    #[serde(default)]
    pub phone: String,
}

impl Form for ProfileInput {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("firstName", |v, f: &Self| v.validate_name(&f.first_name, "First name"))
            .field("lastName", |v, f: &Self| v.validate_name(&f.last_name, "Last name"))
            .field("email", |v, f: &Self| v.validate_email(&f.email))
            .field("username", |v, f: &Self| v.validate_username(&f.username))
            .field("phone", |v, f: &Self| v.validate_phone(&f.phone))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl Form for ChangePasswordInput {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("currentPassword", |v, f: &Self| {
                v.validate_required(&f.current_password, "Current password")
            })
            .field("newPassword", |v, f: &Self| v.validate_password(&f.new_password))
            .field("confirmPassword", |v, f: &Self| {
                v.validate_confirm_password(&f.new_password, &f.confirm_password)
            })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(rename = "type", default)]
    pub kind: AddressType,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl Form for AddressInput {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("address", |v, f: &Self| v.validate_required(&f.address, "Address"))
            .field("city", |v, f: &Self| v.validate_required(&f.city, "City"))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    #[serde(rename = "type", default)]
    pub card_type: CardBrand,
    /// Full number on add. On update, blank or masked keeps the stored digits.
    pub card_number: String,
    /// `MM/YY`
    pub expiry: String,
    pub card_name: String,
}

impl Form for PaymentInput {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("cardNumber", |v, f: &Self| v.validate_card_number(&f.card_number))
            .field("expiry", |v, f: &Self| v.validate_expiry(&f.expiry))
            .field("cardName", |v, f: &Self| v.validate_required(&f.card_name, "Cardholder name"))
    }
}
