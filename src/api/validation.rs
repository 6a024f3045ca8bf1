use super::ApiError;

pub const DEFAULT_HISTORY_LIMIT: u64 = 50;

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 1000;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Limite inválido: {limit}. Use um valor entre {MIN_LIMIT} e {MAX_LIMIT}"
        )));
    }
    Ok(limit)
}

pub fn validate_record_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!("ID inválido: {id}")));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(50).is_ok());
        assert!(validate_limit(1000).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1001).is_err());
    }

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id(1).is_ok());
        assert!(validate_record_id(0).is_err());
        assert!(validate_record_id(-3).is_err());
    }
}
