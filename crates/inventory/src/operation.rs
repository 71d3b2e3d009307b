use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cragsupply_core::DomainError;

/// Direction of a quantity adjustment on an existing inventory line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityOperation {
    Increment,
    Decrement,
}

impl QuantityOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantityOperation::Increment => "increment",
            QuantityOperation::Decrement => "decrement",
        }
    }
}

impl core::fmt::Display for QuantityOperation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityOperation {
    type Err = DomainError;

    /// Tokens are matched exactly; anything else is an `InvalidOperation`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" => Ok(QuantityOperation::Increment),
            "decrement" => Ok(QuantityOperation::Decrement),
            other => Err(DomainError::invalid_operation(format!(
                "unsupported quantity operation '{other}' (expected increment or decrement)"
            ))),
        }
    }
}
