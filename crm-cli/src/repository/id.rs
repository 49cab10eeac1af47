//! Record id parsing
//!
//! Ids crossing the repository boundary are positive integers; callers may
//! pass them as integers or as strings that parse to one.

use super::error::RepositoryError;

/// Conversion into a validated record id
pub trait IntoRecordId {
    fn into_record_id(self) -> Result<i64, RepositoryError>;
}

fn positive(id: i64, original: impl ToString) -> Result<i64, RepositoryError> {
    if id > 0 {
        Ok(id)
    } else {
        Err(RepositoryError::InvalidId(original.to_string()))
    }
}

impl IntoRecordId for i64 {
    fn into_record_id(self) -> Result<i64, RepositoryError> {
        positive(self, self)
    }
}

impl IntoRecordId for i32 {
    fn into_record_id(self) -> Result<i64, RepositoryError> {
        positive(i64::from(self), self)
    }
}

impl IntoRecordId for u32 {
    fn into_record_id(self) -> Result<i64, RepositoryError> {
        positive(i64::from(self), self)
    }
}

impl IntoRecordId for &str {
    fn into_record_id(self) -> Result<i64, RepositoryError> {
        let id = self
            .trim()
            .parse::<i64>()
            .map_err(|_| RepositoryError::InvalidId(self.to_string()))?;
        positive(id, self)
    }
}

impl IntoRecordId for String {
    fn into_record_id(self) -> Result<i64, RepositoryError> {
        self.as_str().into_record_id()
    }
}

impl IntoRecordId for &String {
    fn into_record_id(self) -> Result<i64, RepositoryError> {
        self.as_str().into_record_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ids() {
        assert_eq!(7i64.into_record_id().unwrap(), 7);
        assert_eq!(7i32.into_record_id().unwrap(), 7);
        assert!(0i64.into_record_id().is_err());
        assert!((-3i32).into_record_id().is_err());
    }

    #[test]
    fn test_string_ids() {
        assert_eq!(" 42 ".into_record_id().unwrap(), 42);
        assert_eq!("42".to_string().into_record_id().unwrap(), 42);
        assert!(matches!(
            "forty-two".into_record_id(),
            Err(RepositoryError::InvalidId(s)) if s == "forty-two"
        ));
        assert!("".into_record_id().is_err());
    }
}
