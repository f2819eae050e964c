use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Allocation of {elements} elements failed")]
    Allocation { elements: usize },

    #[error("Shape {sizes:?} overflows the addressable element range")]
    ShapeOverflow { sizes: Vec<usize> },

    #[error("Shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Only 1-channel gray images and 3-channel RGB images are supported, got {0} channels")]
    UnsupportedChannels(usize),

    #[error("Invalid resize target: {0}")]
    InvalidResizeTarget(String),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ContainerError>;
