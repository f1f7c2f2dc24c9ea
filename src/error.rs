use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    /// `H·Σ·Hᵗ + Q` hit a zero pivot during inversion.
    #[error("innovation covariance is singular")]
    SingularInnovation,
}
