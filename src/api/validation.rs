use super::ApiError;
use crate::domain::ServiceType;

/// Accepts `true`/`1` and `false`/`0`/empty.
pub fn parse_flag(name: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(ApiError::validation(format!(
            "Invalid {name}: '{other}'. Expected true or false"
        ))),
    }
}

pub fn parse_service_type(value: &str) -> Result<ServiceType, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::validation(format!(
            "Invalid type: '{value}'. Expected one of api, individual, code-editor"
        ))
    })
}

pub fn validate_page(value: &str) -> Result<u32, ApiError> {
    match value.trim().parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(ApiError::validation(format!(
            "Invalid page: '{value}'. Page must be a positive integer"
        ))),
    }
}

pub fn validate_limit(value: &str, max: u32) -> Result<u32, ApiError> {
    match value.trim().parse::<u32>() {
        Ok(limit) if (1..=max).contains(&limit) => Ok(limit),
        _ => Err(ApiError::validation(format!(
            "Invalid limit: '{value}'. Limit must be between 1 and {max}"
        ))),
    }
}

/// Empty means "not set".
pub fn parse_min_rating(value: &str) -> Result<Option<f64>, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(rating) if rating.is_finite() && rating >= 0.0 => Ok(Some(rating)),
        _ => Err(ApiError::validation(format!(
            "Invalid minRating: '{value}'. Expected a non-negative number"
        ))),
    }
}

/// Empty and `0` mean "not set".
pub fn parse_release_year(value: &str) -> Result<Option<i32>, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<i32>() {
        Ok(0) => Ok(None),
        Ok(year) if year > 0 => Ok(Some(year)),
        _ => Err(ApiError::validation(format!(
            "Invalid releaseYear: '{value}'. Expected a year"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("hasFree", "true").unwrap());
        assert!(parse_flag("hasFree", "1").unwrap());
        assert!(!parse_flag("hasFree", "false").unwrap());
        assert!(!parse_flag("hasFree", "").unwrap());
        assert!(parse_flag("hasFree", "yes").is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit("9", 100).unwrap(), 9);
        assert!(validate_limit("0", 100).is_err());
        assert!(validate_limit("101", 100).is_err());
        assert!(validate_limit("abc", 100).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page("3").unwrap(), 3);
        assert!(validate_page("0").is_err());
        assert!(validate_page("-1").is_err());
    }

    #[test]
    fn test_release_year_zero_is_unset() {
        assert_eq!(parse_release_year("0").unwrap(), None);
        assert_eq!(parse_release_year("").unwrap(), None);
        assert_eq!(parse_release_year("2024").unwrap(), Some(2024));
        assert!(parse_release_year("twenty").is_err());
    }

    #[test]
    fn test_parse_min_rating() {
        assert_eq!(parse_min_rating("4.5").unwrap(), Some(4.5));
        assert_eq!(parse_min_rating("").unwrap(), None);
        assert!(parse_min_rating("-1").is_err());
        assert!(parse_min_rating("NaN").is_err());
    }

    #[test]
    fn test_parse_service_type() {
        assert_eq!(parse_service_type("code-editor").unwrap(), ServiceType::CodeEditor);
        assert!(parse_service_type("desktop").is_err());
    }
}
