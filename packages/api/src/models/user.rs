//! # Client-safe user projection
//!
//! [`UserInfo`] is what a host UI renders for the signed-in user: the stored
//! [`User`] minus the password, with the phone already formatted for display
//! and the display name resolved.

use serde::{Deserialize, Serialize};
use store::{RecordId, User};

use crate::format::format_phone_number;

/// User information safe to hand to view code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: RecordId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// `XXX XXX XXXX` for ten-digit numbers.
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub address_count: usize,
    pub payment_method_count: usize,
}

impl UserInfo {
    /// Full name, falling back to the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.as_deref().map(format_phone_number),
            avatar: user.avatar.clone(),
            address_count: user.addresses.len(),
            payment_method_count: user.payment_methods.len(),
        }
    }
}
