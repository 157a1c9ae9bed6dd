use crate::domain::error::DomainError;

/// Input checks for the free-text parts of a solution configuration.
///
/// The core takes configurations as already validated; these are what the
/// CLI runs before it builds one.
pub struct DomainValidator;

impl DomainValidator {
    /// `Company.Product`: dot-separated segments, each a letter followed by
    /// letters, digits or underscores.
    pub fn validate_solution_name(name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "solution name cannot be empty".into(),
            ));
        }
        if !is_dotted_identifier(name) {
            return Err(DomainError::InvalidConfiguration(format!(
                "solution name '{name}' must be a valid identifier (e.g. Company.Product)"
            )));
        }
        Ok(())
    }

    pub fn validate_namespace(namespace: &str) -> Result<(), DomainError> {
        if namespace.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "namespace cannot be empty".into(),
            ));
        }
        if !is_dotted_identifier(namespace) {
            return Err(DomainError::InvalidConfiguration(format!(
                "namespace '{namespace}' must be a valid .NET namespace (e.g. Company.Product)"
            )));
        }
        Ok(())
    }

    /// `netX.Y`, e.g. `net9.0`.
    pub fn validate_target_framework(framework: &str) -> Result<(), DomainError> {
        let valid = framework
            .strip_prefix("net")
            .and_then(|rest| rest.split_once('.'))
            .is_some_and(|(major, minor)| is_digits(major) && is_digits(minor));

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidConfiguration(format!(
                "target framework '{framework}' must look like 'netX.Y' (e.g. net9.0, net8.0)"
            )))
        }
    }
}

fn is_dotted_identifier(s: &str) -> bool {
    s.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_names() {
        assert!(DomainValidator::validate_solution_name("Acme").is_ok());
        assert!(DomainValidator::validate_solution_name("Acme.Shop_2").is_ok());
        assert!(DomainValidator::validate_solution_name("").is_err());
        assert!(DomainValidator::validate_solution_name("1Acme").is_err());
        assert!(DomainValidator::validate_solution_name("Acme..Shop").is_err());
        assert!(DomainValidator::validate_solution_name("Acme.").is_err());
        assert!(DomainValidator::validate_solution_name("Acme-Shop").is_err());
    }

    #[test]
    fn namespaces() {
        assert!(DomainValidator::validate_namespace("Company.Product").is_ok());
        assert!(DomainValidator::validate_namespace("  ").is_err());
        assert!(DomainValidator::validate_namespace(".Company").is_err());
    }

    #[test]
    fn target_frameworks() {
        assert!(DomainValidator::validate_target_framework("net9.0").is_ok());
        assert!(DomainValidator::validate_target_framework("net10.0").is_ok());
        assert!(DomainValidator::validate_target_framework("net9").is_err());
        assert!(DomainValidator::validate_target_framework("netcoreapp3.1").is_err());
        assert!(DomainValidator::validate_target_framework("net9.0.1").is_err());
    }
}
