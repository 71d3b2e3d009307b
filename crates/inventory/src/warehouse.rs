use serde::{Deserialize, Serialize};

use cragsupply_core::validate::required_text;
use cragsupply_core::{DomainError, DomainResult, Entity, WarehouseId};

const NAME_MAX: usize = 50;
const STREET_MAX: usize = 255;
const CITY_MAX: usize = 50;

/// Postal address of a warehouse (US format).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseAddress {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl WarehouseAddress {
    fn validated(self) -> DomainResult<Self> {
        let state = required_text("state", &self.state, 2)?;
        if state.len() != 2 || !state.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(
                "state must be two uppercase letters",
            ));
        }

        let zip_code = required_text("zip code", &self.zip_code, 10)?;
        if !is_zip_code(&zip_code) {
            return Err(DomainError::validation(
                "zip code must look like 12345 or 12345-6789",
            ));
        }

        Ok(Self {
            street_address: required_text("street address", &self.street_address, STREET_MAX)?,
            city: required_text("city", &self.city, CITY_MAX)?,
            state,
            zip_code,
        })
    }
}

fn is_zip_code(zip: &str) -> bool {
    let bytes = zip.as_bytes();
    let digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
    match bytes.len() {
        5 => digits(bytes),
        10 => digits(&bytes[..5]) && bytes[5] == b'-' && digits(&bytes[6..]),
        _ => false,
    }
}

/// Caller-supplied warehouse fields. Occupied capacity is never part of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseDraft {
    pub name: String,
    pub max_capacity: u32,
    pub address: WarehouseAddress,
}

/// A storage site with a finite capacity ceiling.
///
/// `current_capacity` is a cached counter: the sum of quantities of the
/// inventory lines assigned here. It only changes through
/// [`crate::capacity::CapacityChange::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
    max_capacity: u32,
    current_capacity: u32,
    address: WarehouseAddress,
}

impl Warehouse {
    /// Validate `draft` and bind it to `id`. New warehouses start empty.
    pub fn new(id: WarehouseId, draft: WarehouseDraft) -> DomainResult<Self> {
        let (name, max_capacity, address) = validate_draft(draft)?;
        Ok(Self {
            id,
            name,
            max_capacity,
            current_capacity: 0,
            address,
        })
    }

    /// Replace the descriptive fields, keeping the occupied capacity.
    ///
    /// Lowering the ceiling below what is already stored is rejected.
    pub fn revise(&self, draft: WarehouseDraft) -> DomainResult<Self> {
        let (name, max_capacity, address) = validate_draft(draft)?;
        if self.current_capacity > max_capacity {
            return Err(DomainError::capacity_exceeded(
                self.id,
                u64::from(self.current_capacity),
                max_capacity,
            ));
        }
        Ok(Self {
            id: self.id,
            name,
            max_capacity,
            current_capacity: self.current_capacity,
            address,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    pub fn current_capacity(&self) -> u32 {
        self.current_capacity
    }

    pub fn available_capacity(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_capacity)
    }

    pub fn address(&self) -> &WarehouseAddress {
        &self.address
    }

    pub(crate) fn with_current_capacity(&self, current_capacity: u32) -> Self {
        Self {
            current_capacity,
            ..self.clone()
        }
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> WarehouseId {
        self.id
    }
}

fn validate_draft(draft: WarehouseDraft) -> DomainResult<(String, u32, WarehouseAddress)> {
    let name = required_text("warehouse name", &draft.name, NAME_MAX)?;
    if draft.max_capacity < 1 {
        return Err(DomainError::validation("max capacity must be at least 1"));
    }
    Ok((name, draft.max_capacity, draft.address.validated()?))
}
