use std::{fmt, io};

/// Everything that can go wrong while building a game session.
#[derive(Debug)]
pub enum Error {
    InvalidTileSize { w: f32, h: f32 },
    InvalidCellSize { w: f32, h: f32 },
    InvalidSpeed(f64),
    InvalidLength(usize),
    InvalidFps(f64),
    InvalidScreen { width: u16, height: u16 },
    Config(ron::error::SpannedError),
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidTileSize { w, h } => {
                write!(f, "tile size must be positive, got {}x{}", w, h)
            }
            Error::InvalidCellSize { w, h } => {
                write!(f, "grid cell size must be positive, got {}x{}", w, h)
            }
            Error::InvalidSpeed(speed) => {
                write!(f, "snake speed must be a positive number of cells/sec, got {}", speed)
            }
            Error::InvalidLength(len) => write!(f, "snake start length must be at least 1, got {}", len),
            Error::InvalidFps(fps) => write!(f, "frame rate cap must be positive, got {}", fps),
            Error::InvalidScreen { width, height } => {
                write!(f, "screen of {}x{} cells cannot hold a single tile", width, height)
            }
            Error::Config(err) => write!(f, "invalid config file: {}", err),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ron::error::SpannedError> for Error {
    fn from(err: ron::error::SpannedError) -> Self {
        Error::Config(err)
    }
}
