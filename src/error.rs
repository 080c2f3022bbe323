//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors
///
/// Represents the various error conditions that can occur while building a
/// binding graph, looking up factories, or constructing instances.
///
/// # Examples
///
/// ```rust
/// use dictor::{Container, DiError, Resolver};
///
/// // Example of NotFound error
/// let container = Container::new(Vec::new());
/// match container.resolve::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use dictor::DiError;
///
/// let circular = DiError::Circular(vec!["Auto", "Engine", "Auto"]);
/// assert_eq!(circular.to_string(), "Circular dependency: Auto -> Engine -> Auto");
///
/// let shape = DiError::MultipleEligibleConstructors("Engine", 2);
/// assert!(shape.is_constructor_shape());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// The type declares no injectable constructor
    NoEligibleConstructor(&'static str),
    /// The type declares more than one injectable constructor (type, count)
    MultipleEligibleConstructors(&'static str, usize),
    /// Circular dependency detected (includes path)
    Circular(Vec<&'static str>),
    /// No provider in the chain yields a factory for the type
    NotFound(&'static str),
    /// User construction logic failed (type, message)
    Construction(&'static str, String),
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Maximum recursion depth exceeded
    DepthExceeded(usize),
    /// Invalid configuration value
    Config(String),
    /// Binding model serialization failed
    Export(String),
}

impl DiError {
    /// Builds a [`DiError::Construction`] attributed to `T`.
    pub fn construction<T: ?Sized + 'static>(message: impl Into<String>) -> Self {
        DiError::Construction(std::any::type_name::<T>(), message.into())
    }

    /// Returns `true` for errors describing an invalid constructor declaration.
    pub fn is_constructor_shape(&self) -> bool {
        matches!(
            self,
            DiError::NoEligibleConstructor(_) | DiError::MultipleEligibleConstructors(_, _)
        )
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NoEligibleConstructor(name) => {
                write!(f, "No injectable constructor for: {}", name)
            }
            DiError::MultipleEligibleConstructors(name, count) => {
                write!(f, "Expected at most one injectable constructor for {}, found {}", name, count)
            }
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::NotFound(name) => write!(f, "No provider found for: {}", name),
            DiError::Construction(name, msg) => {
                write!(f, "Failed to construct {}: {}", name, msg)
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DiError::Export(msg) => write!(f, "Export error: {}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout dictor.
pub type DiResult<T> = Result<T, DiError>;
