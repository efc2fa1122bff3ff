//! Common validation utilities.

use validator::ValidationError;

use crate::phone::PhoneKey;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that a string canonicalizes to a usable phone identity.
pub fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    match PhoneKey::parse(raw) {
        Ok(_) => Ok(()),
        Err(e) => {
            let mut err = ValidationError::new("phone_invalid");
            err.message = Some(e.to_string().into());
            Err(err)
        }
    }
}

/// Validates an estimated-arrival value in minutes.
pub fn validate_eta_minutes(eta: i32) -> Result<(), ValidationError> {
    if (0..=600).contains(&eta) {
        Ok(())
    } else {
        let mut err = ValidationError::new("eta_range");
        err.message = Some("Estimated arrival must be between 0 and 600 minutes".into());
        Err(err)
    }
}
