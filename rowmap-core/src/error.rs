use thiserror::Error;

/// Failures raised by the mapping compiler and by compiled routines.
///
/// Carried inside [`crate::Error`], recover it with
/// `error.downcast_ref::<MappingError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The row or parameter shape cannot feed the target type.
    #[error("Shape {shape} cannot be mapped to `{target}`: {reason}")]
    ShapeMismatch {
        target: &'static str,
        shape: String,
        reason: String,
    },
    /// No usable constructor or member binding.
    #[error("Cannot bind shape {shape} to `{target}`: {reason}")]
    BindingError {
        target: &'static str,
        shape: String,
        reason: String,
    },
    /// A value could not be coerced while a routine was running.
    #[error("Cannot convert field `{field}` of `{target}`: {reason}")]
    ConversionError {
        target: &'static str,
        field: String,
        reason: String,
    },
    /// Contradictory registrations of pluggable rules.
    #[error("Registration conflict: {0}")]
    RegistrationConflict(String),
}

impl MappingError {
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, MappingError::ShapeMismatch { .. })
    }
    pub fn is_binding_error(&self) -> bool {
        matches!(self, MappingError::BindingError { .. })
    }
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, MappingError::ConversionError { .. })
    }
    pub fn is_registration_conflict(&self) -> bool {
        matches!(self, MappingError::RegistrationConflict(..))
    }
}
