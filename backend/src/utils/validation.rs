use validator::ValidationErrors;

use crate::error::AppError;
use storefront_shared::missing_field_message;

/// Unwraps a required request field, naming it when absent.
pub fn require<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(missing_field_message(field)))
}

/// Convert validator errors into a single `Validation` error listing each field.
pub fn validation_errors_to_app_error(errors: ValidationErrors) -> AppError {
    let mut error_messages = Vec::new();

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    for (field, field_errors) in fields {
        for error in field_errors {
            let message = match error.code.as_ref() {
                "length" => "Invalid length",
                "range" => "Value out of range",
                "required" => "Field is required",
                _ => "Validation error",
            };

            error_messages.push(format!("{}: {}", field, message));
        }
    }

    AppError::Validation(error_messages.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_shared::CreateProductRequest;
    use validator::Validate;

    #[test]
    fn test_require() {
        assert_eq!(require(Some(3), "stock").unwrap(), 3);
        match require::<i64>(None, "stock") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Missing field: stock"),
            _ => panic!("expected a validation error"),
        }
    }

    #[test]
    fn test_validation_errors_name_fields_in_order() {
        let request = CreateProductRequest {
            name: Some(String::new()),
            price: Some(-1),
            ..Default::default()
        };
        let err = validation_errors_to_app_error(request.validate().unwrap_err());
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "name: Invalid length, price: Value out of range")
            }
            _ => panic!("expected a validation error"),
        }
    }
}
