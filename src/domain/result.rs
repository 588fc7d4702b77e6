//! Result type alias for jobrelay

use super::errors::JobRelayError;

/// Result type alias for jobrelay operations
///
/// # Examples
///
/// ```
/// use jobrelay::domain::result::Result;
/// use jobrelay::domain::errors::JobRelayError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(JobRelayError::InvalidArgument("empty prefix".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, JobRelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
