// MIT/Apache2 License

use core::fmt;
use easel_geometry::InvalidDash;

/// Sum error type for easel operations.
///
/// Errors are sticky: once a [`Context`](crate::Context) or a
/// [`Pattern`](crate::Pattern) enters an error state, every later operation on
/// it reports the same error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Error {
    /// An allocation failed.
    NoMemory,
    /// `restore()` was called without a matching `save()`.
    InvalidRestore,
    /// A matrix could not be inverted.
    InvalidMatrix,
    /// A surface or pattern that was needed was absent.
    NullPointer,
    /// A surface was requested with a size it cannot have.
    InvalidSize,
    /// A dash array was rejected.
    InvalidDash,
    /// An index was out of range.
    InvalidIndex,
    /// A relative path operation was attempted without a current point.
    NoCurrentPoint,
    /// An operation was used on a pattern of the wrong type.
    PatternTypeMismatch,
    /// The surface has already been finished.
    SurfaceFinished,
    /// A surface was used as a backend it is not.
    SurfaceTypeMismatch,
    /// A mesh pattern was built out of order.
    InvalidMeshConstruction,
    /// The clip cannot be expressed as a list of user space rectangles.
    ClipNotRepresentable,
    /// Attempted to run an unsupported operation.
    NotSupported(NSOpType),
}

/// An operation that is not supported.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NSOpType {
    Gradients,
    SurfacePatterns,
    MeshPatterns,
    RasterSources,
    BlendModes,
    Formats,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMemory => f.write_str("Out of memory"),
            Self::InvalidRestore => f.write_str("restore() called without a matching save()"),
            Self::InvalidMatrix => f.write_str("Matrix is not invertible"),
            Self::NullPointer => f.write_str("Required object was not present"),
            Self::InvalidSize => f.write_str("Invalid surface size"),
            Self::InvalidDash => fmt::Display::fmt(&InvalidDash, f),
            Self::InvalidIndex => f.write_str("Index out of range"),
            Self::NoCurrentPoint => f.write_str("No current point"),
            Self::PatternTypeMismatch => f.write_str("Operation used on the wrong type of pattern"),
            Self::SurfaceFinished => f.write_str("Surface has already been finished"),
            Self::SurfaceTypeMismatch => f.write_str("Surface is not of the requested type"),
            Self::InvalidMeshConstruction => f.write_str("Mesh pattern built out of order"),
            Self::ClipNotRepresentable => {
                f.write_str("Clip cannot be represented as user space rectangles")
            }
            Self::NotSupported(nsop) => {
                write!(f, "Surface does not support feature \"{:?}\"", nsop)
            }
        }
    }
}

impl From<InvalidDash> for Error {
    #[inline]
    fn from(_: InvalidDash) -> Error {
        Error::InvalidDash
    }
}

pub type Result<T = ()> = core::result::Result<T, Error>;
