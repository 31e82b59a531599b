//! Saved cards of the signed-in user.
//!
//! Only the last four digits of a card number are stored. On update, a blank
//! card number or the masked form shown in the UI (`**** **** **** 1234`)
//! keeps the stored digits and skips card-number validation.

use store::{KeyValueStore, NewPaymentMethod, PaymentMethod, PaymentPatch, RecordId};

use super::{storage_failure, AccountError, AccountService};
use crate::format::{card_last4, is_masked_card_number};
use crate::models::PaymentInput;
use crate::validation::{Form, Schema};

impl<S: KeyValueStore> AccountService<S> {
    pub fn payment_methods(&self) -> Result<Vec<PaymentMethod>, AccountError> {
        Ok(self.signed_in()?.payment_methods)
    }

    pub fn add_payment_method(&self, input: PaymentInput) -> Result<PaymentMethod, AccountError> {
        let user = self.signed_in()?;
        self.validator.check(&input)?;
        let payment = NewPaymentMethod {
            kind: input.card_type,
            last4: card_last4(&input.card_number),
            expiry: input.expiry.trim().to_string(),
            card_name: input.card_name.trim().to_string(),
        };
        self.records
            .add_payment_method(user.id, payment)
            .map_err(storage_failure("add payment method"))?
            .ok_or(AccountError::NotFound("User"))
    }

    pub fn update_payment_method(
        &self,
        payment_id: RecordId,
        input: PaymentInput,
    ) -> Result<PaymentMethod, AccountError> {
        let user = self.signed_in()?;

        let keep_number =
            input.card_number.trim().is_empty() || is_masked_card_number(&input.card_number);
        let schema = if keep_number {
            Schema::<PaymentInput>::new()
                .field("expiry", |v, f: &PaymentInput| v.validate_expiry(&f.expiry))
                .field("cardName", |v, f: &PaymentInput| {
                    v.validate_required(&f.card_name, "Cardholder name")
                })
        } else {
            PaymentInput::schema()
        };
        let errors = self.validator.validate_form(&input, &schema);
        if !errors.is_valid() {
            return Err(errors.into());
        }

        let patch = PaymentPatch {
            kind: Some(input.card_type),
            last4: (!keep_number).then(|| card_last4(&input.card_number)),
            expiry: Some(input.expiry.trim().to_string()),
            card_name: Some(input.card_name.trim().to_string()),
        };
        self.records
            .update_payment_method(user.id, payment_id, patch)
            .map_err(storage_failure("update payment method"))?
            .ok_or(AccountError::NotFound("Payment method"))
    }

    pub fn delete_payment_method(&self, payment_id: RecordId) -> Result<(), AccountError> {
        let user = self.signed_in()?;
        if !user.payment_methods.iter().any(|p| p.id == payment_id) {
            return Err(AccountError::NotFound("Payment method"));
        }
        self.records
            .delete_payment_method(user.id, payment_id)
            .map_err(storage_failure("delete payment method"))?;
        Ok(())
    }

    pub fn set_default_payment_method(&self, payment_id: RecordId) -> Result<(), AccountError> {
        let user = self.signed_in()?;
        let changed = self
            .records
            .set_default_payment_method(user.id, payment_id)
            .map_err(storage_failure("set default payment method"))?;
        if !changed {
            return Err(AccountError::NotFound("Payment method"));
        }
        Ok(())
    }
}
