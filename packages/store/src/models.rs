//! # Domain models for accounts
//!
//! Defines the records persisted by [`crate::RecordStore`] together with the
//! draft and patch types callers hand to it. Persisted types are
//! `Serialize + Deserialize` with camelCase field names so the JSON stored under
//! the users key reads the same on every platform.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | An account: identity, plaintext password, profile fields and the two nested collections. |
//! | [`Address`] | A postal address owned by a user. Exactly one may be flagged `isDefault` once a default has been chosen. |
//! | [`PaymentMethod`] | A saved card. Only the last four digits of the number are ever kept. |
//! | [`NewUser`] / [`NewAddress`] / [`NewPaymentMethod`] | Caller-supplied fields for creation; ids, defaults and timestamps are assigned by the store. |
//! | [`UserPatch`] / [`AddressPatch`] / [`PaymentPatch`] | Shallow merges. `None` leaves a field untouched. |
//! | [`Snapshot`] | A full export of both persisted values, used for backup and restore. |

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user, address or payment method.
pub type RecordId = i64;

/// A registered account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    /// Stored lowercased by the account service.
    pub username: String,
    /// Plaintext. This store is a local demo, not a credential system.
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Digits only.
    #[serde(default)]
    pub phone: Option<String>,
    /// `data:` URL of the avatar image.
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", used for greetings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    pub fn default_payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|p| p.is_default)
    }
}

/// Fields supplied when creating a user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// A shallow update of a user's scalar fields.
///
/// `phone` and `avatar` are doubly optional: `Some(None)` clears the value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
}

impl UserPatch {
    pub(crate) fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressType {
    #[default]
    Home,
    Office,
    Other,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Home => "Home",
            Self::Office => "Office",
            Self::Other => "Other",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: AddressType,
    pub address: String,
    pub city: String,
    pub country: String,
    pub is_default: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewAddress {
    pub kind: AddressType,
    pub address: String,
    pub city: String,
    pub country: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddressPatch {
    pub kind: Option<AddressType>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Card network of a saved payment method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardBrand {
    #[default]
    Visa,
    Mastercard,
    #[serde(rename = "JCB")]
    Jcb,
    #[serde(rename = "American Express")]
    AmericanExpress,
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Jcb => "JCB",
            Self::AmericanExpress => "American Express",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: CardBrand,
    /// Last four digits of the card number.
    pub last4: String,
    /// `MM/YY`
    pub expiry: String,
    pub card_name: String,
    pub is_default: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewPaymentMethod {
    pub kind: CardBrand,
    pub last4: String,
    pub expiry: String,
    pub card_name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentPatch {
    pub kind: Option<CardBrand>,
    pub last4: Option<String>,
    pub expiry: Option<String>,
    pub card_name: Option<String>,
}

/// A user-owned collection entry with a single-default rule.
pub(crate) trait Entry: Clone {
    type Draft;
    type Patch;

    /// Human-readable collection name, for logs.
    const KIND: &'static str;

    fn new(id: RecordId, draft: Self::Draft, is_default: bool) -> Self;
    fn id(&self) -> RecordId;
    fn set_default(&mut self, is_default: bool);
    fn apply(&mut self, patch: Self::Patch);
    fn collection(user: &mut User) -> &mut Vec<Self>;
}

impl Entry for Address {
    type Draft = NewAddress;
    type Patch = AddressPatch;

    const KIND: &'static str = "address";

    fn new(id: RecordId, draft: NewAddress, is_default: bool) -> Self {
        Self {
            id,
            kind: draft.kind,
            address: draft.address,
            city: draft.city,
            country: draft.country,
            is_default,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    fn apply(&mut self, patch: AddressPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(country) = patch.country {
            self.country = country;
        }
    }

    fn collection(user: &mut User) -> &mut Vec<Self> {
        &mut user.addresses
    }
}

impl Entry for PaymentMethod {
    type Draft = NewPaymentMethod;
    type Patch = PaymentPatch;

    const KIND: &'static str = "payment method";

    fn new(id: RecordId, draft: NewPaymentMethod, is_default: bool) -> Self {
        Self {
            id,
            kind: draft.kind,
            last4: draft.last4,
            expiry: draft.expiry,
            card_name: draft.card_name,
            is_default,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    fn apply(&mut self, patch: PaymentPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(last4) = patch.last4 {
            self.last4 = last4;
        }
        if let Some(expiry) = patch.expiry {
            self.expiry = expiry;
        }
        if let Some(card_name) = patch.card_name {
            self.card_name = card_name;
        }
    }

    fn collection(user: &mut User) -> &mut Vec<Self> {
        &mut user.payment_methods
    }
}

/// Full export of the persisted state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub users: Vec<User>,
    pub current_user: Option<RecordId>,
}

impl Snapshot {
    pub const VERSION: u32 = 1;
}
