//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, IdValidationError};

/// Field-level validation codes reported in error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldErrorCode {
    MissingField,
    InvalidId,
    OutOfRange,
}

impl FieldErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidId => "invalid_id",
            Self::OutOfRange => "out_of_range",
        }
    }
}

fn field_error(field: &'static str, message: String, code: FieldErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: &'static str) -> Error {
    field_error(
        field,
        format!("missing required field: {field}"),
        FieldErrorCode::MissingField,
    )
}

/// Parse an identifier carried in a request body.
pub(crate) fn parse_id_field<T>(raw: i64, field: &'static str) -> Result<T, Error>
where
    T: TryFrom<i64, Error = IdValidationError>,
{
    T::try_from(raw).map_err(|err| field_error(field, format!("{field}: {err}"), FieldErrorCode::InvalidId))
}

/// Parse a non-negative count carried in a request body.
pub(crate) fn parse_count_field(raw: i64, field: &'static str) -> Result<u32, Error> {
    u32::try_from(raw).map_err(|_| {
        field_error(
            field,
            format!("{field} must be between 0 and {}", u32::MAX),
            FieldErrorCode::OutOfRange,
        )
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{ErrorCode, PlanId};

    fn detail_code(error: &Error) -> Option<&str> {
        error.details().and_then(|d| d.get("code")).and_then(Value::as_str)
    }

    #[rstest]
    fn missing_fields_name_the_field() {
        let err = missing_field_error("planId");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(Value::as_str),
            Some("planId")
        );
        assert_eq!(detail_code(&err), Some("missing_field"));
    }

    #[rstest]
    #[case(0)]
    #[case(-9)]
    fn non_positive_ids_are_rejected(#[case] raw: i64) {
        let err = parse_id_field::<PlanId>(raw, "planId").expect_err("invalid id");
        assert_eq!(detail_code(&err), Some("invalid_id"));
    }

    #[rstest]
    #[case(-1)]
    #[case(i64::from(u32::MAX) + 1)]
    fn counts_must_fit_u32(#[case] raw: i64) {
        let err = parse_count_field(raw, "quantity").expect_err("out of range");
        assert_eq!(detail_code(&err), Some("out_of_range"));
    }

    #[rstest]
    fn valid_values_pass_through() {
        assert_eq!(parse_id_field::<PlanId>(2, "planId").map(PlanId::get), Ok(2));
        assert_eq!(parse_count_field(4, "quantity"), Ok(4));
    }
}
