/// Convenience result type used across Epigram.
pub type EpigramResult<T> = Result<T, EpigramError>;

/// Top-level error taxonomy exposed by the engine APIs.
///
/// Every internal stage rewraps its failures into one of these four kinds.
/// Kinds carrying an [`anyhow::Error`] keep the full cause chain; the
/// alternate `Display` format (`{:#}`) prints it colon-separated, and the
/// chain can be walked programmatically via [`anyhow::Error::chain`].
#[derive(thiserror::Error, Debug)]
pub enum EpigramError {
    /// No usable font or background file is present.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// The background image failed to open or decode.
    #[error("image load error: {0:#}")]
    ImageLoad(anyhow::Error),

    /// Degenerate text or metrics prevented wrapping or fitting.
    #[error("layout error: {0}")]
    Layout(String),

    /// Any drawing-stage failure not otherwise classified.
    #[error("render error: {0:#}")]
    Render(anyhow::Error),
}

impl EpigramError {
    /// Build an [`EpigramError::AssetNotFound`] value.
    pub fn asset_not_found(msg: impl Into<String>) -> Self {
        Self::AssetNotFound(msg.into())
    }

    /// Build an [`EpigramError::ImageLoad`] value, keeping `err` as cause.
    pub fn image_load(err: impl Into<anyhow::Error>) -> Self {
        Self::ImageLoad(err.into())
    }

    /// Build an [`EpigramError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build an [`EpigramError::Render`] value, keeping `err` as cause.
    pub fn render(err: impl Into<anyhow::Error>) -> Self {
        Self::Render(err.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
