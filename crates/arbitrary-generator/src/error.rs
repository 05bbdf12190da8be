//! Error types for generator construction.

use arbitrary_core::RecipeError;
use thiserror::Error;

/// Errors surfaced while building generators.
///
/// Generators never fail once built: every variant here is reported at
/// construction time.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// A constant distribution parameter is outside its domain.
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Template placeholders and supplied parts disagree.
    #[error("Template has {placeholders} placeholder(s) but {parts} part(s) were supplied")]
    TemplateMismatch { placeholders: usize, parts: usize },

    /// A named generator is not declared in the recipe.
    #[error("Unknown generator: {0}")]
    UnknownGenerator(String),

    /// A named generator depends on itself.
    #[error("Generator '{0}' is part of a reference cycle")]
    ReferenceCycle(String),

    /// Recipe loading error.
    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),
}
