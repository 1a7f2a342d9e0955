/// Error type shared by the calibration engine and the `calib` binary.
///
/// The engine's failure modes form a small closed taxonomy. Every failing
/// operation is atomic: when an error is returned, no source graph, total
/// graph, provenance array, or flag has been mutated.
#[derive(Clone, PartialEq)]
pub enum CalError {
    /// Empty or otherwise unusable point sequence handed to `add`.
    InvalidInput(String),
    /// Index into the total (or residual) graph outside `0..len`.
    OutOfRange { index: usize, len: usize },
    /// `scale` or `set_residual` invoked before any successful fit.
    MissingFit,
    /// The fit solver could not produce a finite solution.
    Fit(String),
    /// File-level failure while reading or writing point/set files.
    Io(String),
}

impl CalError {
    /// Process exit code used by the `calib` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CalError::InvalidInput(_) | CalError::Io(_) => 2,
            CalError::OutOfRange { .. } => 3,
            CalError::MissingFit | CalError::Fit(_) => 4,
        }
    }
}

impl std::fmt::Display for CalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CalError::OutOfRange { index, len } => {
                write!(f, "point index {index} out of range (total graph has {len} points)")
            }
            CalError::MissingFit => write!(f, "no fitted function attached; call fit() first"),
            CalError::Fit(msg) => write!(f, "fit failed: {msg}"),
            CalError::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::fmt::Debug for CalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CalError({self})")
    }
}

impl std::error::Error for CalError {}
