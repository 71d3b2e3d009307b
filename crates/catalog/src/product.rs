use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cragsupply_core::validate::required_text;
use cragsupply_core::{CategoryId, DomainError, DomainResult, Entity, ProductId};

const BRAND_MAX: usize = 255;
const NAME_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 1000;

/// Price in the smallest currency unit (cents).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Parses decimal text such as `149.99`, `30` or `.5` into cents. At most two
/// fraction digits are accepted; the amount is never rounded.
impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            DomainError::validation(format!(
                "price must be a non-negative amount with at most two decimals, got '{s}'"
            ))
        };

        let raw = s.trim();
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || fraction.len() > 2
            || !digits(whole)
            || !digits(fraction)
        {
            return Err(invalid());
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Price)
            .ok_or_else(invalid)
    }
}

/// Caller-supplied product fields (no identity yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub category_id: CategoryId,
    pub brand: String,
    pub name: String,
    pub description: String,
    pub price: Price,
}

/// A sellable product. Belongs to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    category_id: CategoryId,
    brand: String,
    name: String,
    description: String,
    price: Price,
}

impl Product {
    /// Validate `draft` and bind it to `id`.
    ///
    /// Does not check that the category exists; callers resolve references.
    pub fn new(id: ProductId, draft: ProductDraft) -> DomainResult<Self> {
        Ok(Self {
            id,
            category_id: draft.category_id,
            brand: required_text("brand", &draft.brand, BRAND_MAX)?,
            name: required_text("product name", &draft.name, NAME_MAX)?,
            description: required_text("description", &draft.description, DESCRIPTION_MAX)?,
            price: draft.price,
        })
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Price {
        self.price
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rope_draft() -> ProductDraft {
        ProductDraft {
            category_id: CategoryId::from_raw(2),
            brand: "PeakPro".to_string(),
            name: "Titanium Ascend Rope 60m".to_string(),
            description: "Durable and lightweight climbing rope.".to_string(),
            price: Price::from_cents(19_999),
        }
    }

    #[test]
    fn new_product_keeps_validated_fields() {
        let product = Product::new(ProductId::from_raw(1), rope_draft()).unwrap();
        assert_eq!(product.brand(), "PeakPro");
        assert_eq!(product.category_id(), CategoryId::from_raw(2));
        assert_eq!(product.price().to_string(), "199.99");
    }

    #[test]
    fn new_product_rejects_blank_description() {
        let mut draft = rope_draft();
        draft.description = "\t".to_string();
        let err = Product::new(ProductId::from_raw(1), draft).unwrap_err();
        assert_eq!(err, DomainError::validation("description cannot be blank"));
    }

    #[test]
    fn new_product_rejects_overlong_description() {
        let mut draft = rope_draft();
        draft.description = "a".repeat(1001);
        assert!(Product::new(ProductId::from_raw(1), draft).is_err());
    }

    #[test]
    fn price_parses_decimal_text_exactly() {
        assert_eq!("149.99".parse::<Price>().unwrap().cents(), 14_999);
        assert_eq!(" 30 ".parse::<Price>().unwrap().cents(), 3_000);
        assert_eq!("0.5".parse::<Price>().unwrap().cents(), 50);
        assert_eq!(".05".parse::<Price>().unwrap().cents(), 5);
        assert_eq!("0".parse::<Price>().unwrap().cents(), 0);
    }

    #[test]
    fn price_rejects_malformed_text() {
        for raw in ["", ".", "-1.00", "1.999", "1e3", "12,50", "abc", "184467440737095516.16"] {
            let err = raw.parse::<Price>().unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "accepted '{raw}'");
        }
    }

    #[test]
    fn price_displays_with_two_decimals() {
        assert_eq!(Price::from_cents(2_405).to_string(), "24.05");
        assert_eq!(Price::from_cents(7).to_string(), "0.07");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the displayed form of a price parses back to the same cents.
            #[test]
            fn displayed_price_parses_back(cents in 0u64..10_000_000_000) {
                let shown = Price::from_cents(cents).to_string();
                prop_assert_eq!(shown.parse::<Price>().unwrap().cents(), cents);
            }

            /// Property: names with visible characters always validate.
            #[test]
            fn visible_names_validate(name in "[A-Za-z][A-Za-z0-9 ]{0,100}") {
                let mut draft = rope_draft();
                draft.name = name.clone();
                let product = Product::new(ProductId::from_raw(1), draft).unwrap();
                prop_assert_eq!(product.name(), name.trim());
            }
        }
    }
}
