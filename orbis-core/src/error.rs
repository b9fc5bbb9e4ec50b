/// Error types for the view, stack, scene and camera core
use thiserror::Error;

/// Broad category of a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Degenerate vectors, bases or scene references
    Construction,
    /// Invalid numeric parameters or malformed step notation
    Parameter,
    /// Transform stack misuse
    StackDiscipline,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("cannot normalize a vector of length {0}")]
    DegenerateVector(f32),

    #[error("up vector is parallel to the view direction")]
    DegenerateBasis,

    #[error("invalid projection parameters: {0}")]
    InvalidProjection(String),

    #[error("invalid navigation step: {0}")]
    InvalidNavigation(String),

    #[error("transform stack underflow: the base frame cannot be popped")]
    StackUnderflow,

    #[error("unbalanced transform stack: expected depth {expected}, found {found}")]
    Unbalanced { expected: usize, found: usize },

    #[error("no scene part named {0:?}")]
    UnknownPart(String),

    #[error("failed to parse transform steps: {0}")]
    Parse(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DegenerateVector(_) | Self::DegenerateBasis | Self::UnknownPart(_) => {
                ErrorKind::Construction
            }
            Self::InvalidProjection(_) | Self::InvalidNavigation(_) | Self::Parse(_) => {
                ErrorKind::Parameter
            }
            Self::StackUnderflow | Self::Unbalanced { .. } => ErrorKind::StackDiscipline,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
