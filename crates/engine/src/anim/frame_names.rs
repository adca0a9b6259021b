use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameNameError {
    #[error("frame name must not be empty")]
    Empty,
    #[error("frame name must be relative to the animation directory")]
    Absolute,
    #[error("frame name must use '/' separators")]
    Backslash,
    #[error("frame name must not leave the animation directory")]
    ParentTraversal,
    #[error("frame name contains invalid character '{character}'")]
    InvalidCharacter { character: char },
    #[error("frame name must end in .png")]
    NotPng,
}

/// Frame names are paths relative to the animation directory.
pub(crate) fn validate_frame_name(name: &str) -> Result<(), FrameNameError> {
    if name.is_empty() {
        return Err(FrameNameError::Empty);
    }
    if name.starts_with('/') {
        return Err(FrameNameError::Absolute);
    }
    if name.contains('\\') {
        return Err(FrameNameError::Backslash);
    }
    if name.split('/').any(|segment| segment == "..") {
        return Err(FrameNameError::ParentTraversal);
    }
    if let Some(character) = name
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '/')))
    {
        return Err(FrameNameError::InvalidCharacter { character });
    }
    if !name.to_ascii_lowercase().ends_with(".png") {
        return Err(FrameNameError::NotPng);
    }
    Ok(())
}
