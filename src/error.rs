use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogdiskError {
    #[error("Disk capacity cannot be zero")]
    ZeroCapacity,

    #[error("Block size cannot be zero")]
    ZeroBlockSize,

    #[error("Block size ({block}) exceeds disk capacity ({capacity})")]
    BlockExceedsCapacity { block: u64, capacity: u64 },

    #[error("Disk capacity ({capacity}) is not a whole multiple of block size ({block})")]
    UnalignedBlockSize { block: u64, capacity: u64 },

    #[error("Malformed command: {0}")]
    Syntax(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid quantity: {0} (whole number in range required)")]
    BadQuantity(String),

    #[error("Invalid unit '{unit}' for {command}")]
    BadUnit { unit: String, command: &'static str },

    #[error("Expected {expected} command, found: {found}")]
    GeometryProtocol {
        expected: &'static str,
        found: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(String),

    #[error("Requested size ({requested} bytes) exceeds disk capacity ({capacity} bytes)")]
    WriteTooLarge { requested: u64, capacity: u64 },

    #[error("Not enough free blocks: need {required}, have {free}")]
    InsufficientSpace { required: u64, free: u64 },
}

impl LogdiskError {
    /// Whether this error must abort the whole run.
    ///
    /// Geometry, syntax, and I/O failures poison everything that follows and
    /// terminate the session. The remaining variants are per-command
    /// failures: the session reports them and skips to the next command.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            LogdiskError::FileNotFound(_)
                | LogdiskError::DirectoryNotFound(_)
                | LogdiskError::WriteTooLarge { .. }
                | LogdiskError::InsufficientSpace { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LogdiskError>;
