//! Address book of the signed-in user.
//!
//! The first address added becomes the default. Deleting the default leaves
//! the user without one until [`set_default_address`](AccountService::set_default_address)
//! is called again.

use store::{Address, AddressPatch, KeyValueStore, NewAddress, RecordId};

use super::{storage_failure, AccountError, AccountService};
use crate::models::AddressInput;

impl<S: KeyValueStore> AccountService<S> {
    pub fn addresses(&self) -> Result<Vec<Address>, AccountError> {
        Ok(self.signed_in()?.addresses)
    }

    pub fn add_address(&self, input: AddressInput) -> Result<Address, AccountError> {
        let user = self.signed_in()?;
        self.validator.check(&input)?;
        let address = NewAddress {
            kind: input.kind,
            address: input.address.trim().to_string(),
            city: input.city.trim().to_string(),
            country: input.country.trim().to_string(),
        };
        self.records
            .add_address(user.id, address)
            .map_err(storage_failure("add address"))?
            .ok_or(AccountError::NotFound("User"))
    }

    pub fn update_address(&self, address_id: RecordId, input: AddressInput) -> Result<Address, AccountError> {
        let user = self.signed_in()?;
        self.validator.check(&input)?;
        let patch = AddressPatch {
            kind: Some(input.kind),
            address: Some(input.address.trim().to_string()),
            city: Some(input.city.trim().to_string()),
            country: Some(input.country.trim().to_string()),
        };
        self.records
            .update_address(user.id, address_id, patch)
            .map_err(storage_failure("update address"))?
            .ok_or(AccountError::NotFound("Address"))
    }

    pub fn delete_address(&self, address_id: RecordId) -> Result<(), AccountError> {
        let user = self.signed_in()?;
        if !user.addresses.iter().any(|a| a.id == address_id) {
            return Err(AccountError::NotFound("Address"));
        }
        self.records
            .delete_address(user.id, address_id)
            .map_err(storage_failure("delete address"))?;
        Ok(())
    }

    pub fn set_default_address(&self, address_id: RecordId) -> Result<(), AccountError> {
        let user = self.signed_in()?;
        let changed = self
            .records
            .set_default_address(user.id, address_id)
            .map_err(storage_failure("set default address"))?;
        if !changed {
            return Err(AccountError::NotFound("Address"));
        }
        Ok(())
    }
}
