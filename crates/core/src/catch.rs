//! Catch constants and validation.

use crate::error::CoreError;

/// Maximum length of a species name (characters).
pub const MAX_SPECIES_LENGTH: usize = 100;

/// Upper bound for a recorded weight in kilograms.
pub const MAX_WEIGHT_KG: f64 = 1_000.0;

/// Upper bound for a recorded length in centimetres.
pub const MAX_LENGTH_CM: f64 = 1_000.0;

/// Species is the one mandatory field of a catch.
pub fn validate_species(species: &str) -> Result<(), CoreError> {
    if species.trim().is_empty() {
        return Err(CoreError::Validation("Species is required".to_string()));
    }
    if species.chars().count() > MAX_SPECIES_LENGTH {
        return Err(CoreError::Validation(format!(
            "Species exceeds {MAX_SPECIES_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional positive measurement against an upper bound.
pub fn validate_measurement(field: &str, value: Option<f64>, max: f64) -> Result<(), CoreError> {
    match value {
        None => Ok(()),
        Some(v) if v.is_finite() && v > 0.0 && v <= max => Ok(()),
        Some(v) => Err(CoreError::Validation(format!(
            "{field} must be greater than 0 and at most {max}, got {v}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_required() {
        assert!(validate_species("Pike").is_ok());
        assert!(validate_species("  ").is_err());
    }

    #[test]
    fn test_measurement_bounds() {
        assert!(validate_measurement("weightKg", None, MAX_WEIGHT_KG).is_ok());
        assert!(validate_measurement("weightKg", Some(2.4), MAX_WEIGHT_KG).is_ok());
        assert!(validate_measurement("weightKg", Some(0.0), MAX_WEIGHT_KG).is_err());
        assert!(validate_measurement("lengthCm", Some(f64::NAN), MAX_LENGTH_CM).is_err());
        assert!(validate_measurement("lengthCm", Some(1_000.5), MAX_LENGTH_CM).is_err());
    }
}
