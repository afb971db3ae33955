/// Convenience result type used across weightpaint.
pub type WeightResult<T> = Result<T, WeightError>;

/// Top-level error taxonomy used by the weight-map APIs.
#[derive(thiserror::Error, Debug)]
pub enum WeightError {
    /// Degenerate or non-finite bone segment.
    #[error("invalid bone: {0}")]
    InvalidBone(String),

    /// Two bones in one set share a name.
    #[error("duplicate bone name '{0}'")]
    DuplicateBoneName(String),

    /// Invalid user-provided parameters or rig data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing rig descriptions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeightError {
    /// Build a [`WeightError::InvalidBone`] value.
    pub fn invalid_bone(msg: impl Into<String>) -> Self {
        Self::InvalidBone(msg.into())
    }

    /// Build a [`WeightError::DuplicateBoneName`] value.
    pub fn duplicate_bone_name(name: impl Into<String>) -> Self {
        Self::DuplicateBoneName(name.into())
    }

    /// Build a [`WeightError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WeightError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
