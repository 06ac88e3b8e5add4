use std::error::Error;

/// Result with boxed error as trait object.
pub type GenericResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[cfg(test)]
pub(crate) type TestResult = Result<(), Box<dyn Error>>;
