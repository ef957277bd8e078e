//! Integer identifiers for the persisted aggregates.
//!
//! Rows are keyed by database sequences, so identifiers are positive `i64`
//! values. Each aggregate gets its own newtype so a document id can never be
//! passed where a user id is expected.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors raised when constructing an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// Sequence-backed identifiers start at one.
    #[error("identifier must be positive, got {0}")]
    NotPositive(i64),
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(try_from = "i64", into = "i64")]
        #[schema(value_type = i64, example = 42)]
        pub struct $name(i64);

        impl $name {
            /// Validate and wrap a raw identifier.
            pub fn new(raw: i64) -> Result<Self, IdValidationError> {
                if raw <= 0 {
                    return Err(IdValidationError::NotPositive(raw));
                }
                Ok(Self(raw))
            }

            /// Raw integer value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Identifier of a registered user account.
    UserId
}

define_id! {
    /// Identifier of a subscription or credit plan.
    PlanId
}

define_id! {
    /// Identifier of an authored assignment document.
    DocumentId
}

define_id! {
    /// Identifier of a payment transaction record.
    TransactionId
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(-7)]
    fn rejects_non_positive_values(#[case] raw: i64) {
        assert_eq!(UserId::new(raw), Err(IdValidationError::NotPositive(raw)));
    }

    #[test]
    fn serialises_as_plain_integer() {
        let id = DocumentId::new(12).expect("valid id");
        assert_eq!(serde_json::to_string(&id).expect("serialise"), "12");
        let parsed: DocumentId = serde_json::from_str("12").expect("deserialise");
        assert_eq!(parsed, id);
    }

    #[test]
    fn deserialising_zero_fails() {
        assert!(serde_json::from_str::<PlanId>("0").is_err());
    }
}
