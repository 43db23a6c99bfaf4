use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjError {
    #[error("Invalid definition: {0}")]
    Definition(String),

    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Projection init failed: {0}")]
    Init(String),

    #[error("Grid shift failed: {0}")]
    GridShift(String),

    #[error("Grid load failed: {0}")]
    GridLoad(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    #[error("Projection failed: {0}")]
    Projection(String),
}

impl From<std::io::Error> for ProjError {
    fn from(err: std::io::Error) -> Self {
        ProjError::GridLoad(err.to_string())
    }
}

impl From<tiff::TiffError> for ProjError {
    fn from(err: tiff::TiffError) -> Self {
        ProjError::GridLoad(err.to_string())
    }
}

impl From<serde_json::Error> for ProjError {
    fn from(err: serde_json::Error) -> Self {
        ProjError::Definition(err.to_string())
    }
}
