use serde::{Deserialize, Serialize};

/// Declares a store-assigned numeric identifier.
///
/// Each entity gets its own type so a `ProductId` can never be passed where
/// a `CategoryId` is expected.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates an identifier from its raw value.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw value.
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Returns the value as the signed integer used by `BIGSERIAL` columns.
            pub const fn as_i64(&self) -> i64 {
                self.0 as i64
            }

            /// Creates an identifier from a `BIGSERIAL` column value.
            pub const fn from_i64(id: i64) -> Self {
                Self(id as u64)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a product category.
    CategoryId
);
entity_id!(
    /// Identifier of a product.
    ProductId
);
entity_id!(
    /// Identifier of a payment method.
    PaymentId
);
entity_id!(
    /// Identifier of a user account.
    UserId
);
entity_id!(
    /// Identifier of an order.
    OrderId
);
entity_id!(
    /// Identifier of a single line of an order.
    OrderProductId
);

/// Page-based pagination parameters.
///
/// `skip` is the 1-based page number and `limit` the page size, so the
/// first row of a page is at offset `(skip - 1) * limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Pagination {
    /// Creates pagination parameters.
    pub const fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Returns the number of rows to skip before the page starts.
    pub const fn offset(&self) -> u64 {
        self.skip.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Returns the deterministic `"<skip>-<limit>"` encoding used in cache keys.
    pub fn cache_params(&self) -> String {
        format!("{}-{}", self.skip, self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 1, limit: 10 }
    }
}
