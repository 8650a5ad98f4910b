use std::fmt;

use thiserror::Error;

/// A single capability violation, tied to the function and the position
/// (parameter, return value, field path) it was found at.
#[derive(Debug, Error, PartialEq)]
#[error("{function}: {position}: {problem}")]
pub struct ValidationError {
    pub function: String,
    pub position: String,
    pub problem: Problem,
}

#[derive(Debug, Error, PartialEq)]
pub enum Problem {
    #[error("unsupported map type {0}, only string keys are supported")]
    NonStringMapKey(String),
    #[error("anonymous/embedded field not supported, name the field")]
    AnonymousField,
    #[error("only void callbacks are supported, drop the result list")]
    CallbackWithResults,
    #[error("nested callback not supported, pass data instead of a function")]
    NestedCallback,
    #[error("callback not supported as a return type")]
    CallbackAsReturn,
    #[error("callback only supported as a direct function parameter")]
    CallbackNotParameter,
    #[error("error return type must be last")]
    ErrorNotLast,
    #[error("type {0} is not supported, use primitive or declared types")]
    Unsupported(String),
}

/// Every violation found across the whole signature list. Validation never
/// stops at the first problem, so one report covers everything a user has
/// to fix.
#[derive(Debug, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} unsupported declaration(s) in exported functions:",
            self.0.len()
        )?;
        for error in &self.0 {
            writeln!(f, "  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
