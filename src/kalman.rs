use log::{debug, trace, warn};

use crate::error::FilterError;
use crate::traits::{MatrixRef, Scalar, VectorRef};
use crate::{Matrix, Vector};

/// Gaussian belief over an `N`-dimensional state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Estimate<T, const N: usize> {
    pub mean: Vector<T, N>,
    pub covariance: Matrix<T, N, N>,
}

impl<T: Scalar, const N: usize> Estimate<T, N> {
    pub fn zeros() -> Self {
        Self {
            mean: Vector::zeros(),
            covariance: Matrix::zeros(),
        }
    }
}

/// `J·Σ·Jᵗ + noise`.
pub(crate) fn propagate<T: Scalar, const N: usize>(
    jacobian: &Matrix<T, N, N>,
    jacobian_t: &Matrix<T, N, N>,
    covariance: &Matrix<T, N, N>,
    noise: &Matrix<T, N, N>,
) -> Matrix<T, N, N> {
    *jacobian * *covariance * *jacobian_t + *noise
}

/// `H·Σ·Hᵗ + Q`.
pub(crate) fn innovation_covariance<T: Scalar, const N: usize, const M: usize>(
    observation: &Matrix<T, M, N>,
    observation_t: &Matrix<T, N, M>,
    covariance: &Matrix<T, N, N>,
    noise: &Matrix<T, M, M>,
) -> Matrix<T, M, M> {
    *observation * *covariance * *observation_t + *noise
}

/// Applies `gain` to the prior: `μ + K·ν` and `(I − K·H)·Σ`.
pub(crate) fn correct<T: Scalar, const N: usize, const M: usize>(
    prior: &Estimate<T, N>,
    gain: &Matrix<T, N, M>,
    observation: &Matrix<T, M, N>,
    innovation: Vector<T, M>,
) -> Estimate<T, N> {
    Estimate {
        mean: prior.mean + *gain * innovation,
        covariance: (Matrix::<T, N, N>::eye() - *gain * *observation) * prior.covariance,
    }
}

/// Linear Kalman filter without control input.
///
/// `N` is the state dimension and `M` the measurement dimension. The
/// posterior starts at zero mean and zero covariance unless seeded through
/// [`KalmanFilter::with_state`].
#[derive(Debug, Clone)]
pub struct KalmanFilter<T, const N: usize, const M: usize> {
    transition: Matrix<T, N, N>,
    transition_t: Matrix<T, N, N>,
    observation: Matrix<T, M, N>,
    observation_t: Matrix<T, N, M>,
    process_noise: Matrix<T, N, N>,
    measurement_noise: Matrix<T, M, M>,
    gain: Matrix<T, N, M>,
    prior: Estimate<T, N>,
    posterior: Estimate<T, N>,
}

impl<T: Scalar, const N: usize, const M: usize> KalmanFilter<T, N, M> {
    pub fn new(
        transition: Matrix<T, N, N>,
        observation: Matrix<T, M, N>,
        process_noise: Matrix<T, N, N>,
        measurement_noise: Matrix<T, M, M>,
    ) -> Self {
        debug!("kalman filter: {N} states, {M} measurements");
        Self {
            transition,
            transition_t: transition.transpose(),
            observation,
            observation_t: observation.transpose(),
            process_noise,
            measurement_noise,
            gain: Matrix::zeros(),
            prior: Estimate::zeros(),
            posterior: Estimate::zeros(),
        }
    }

    /// Seeds the posterior mean and covariance.
    pub fn with_state(mut self, mean: Vector<T, N>, covariance: Matrix<T, N, N>) -> Self {
        self.posterior = Estimate { mean, covariance };
        self
    }

    /// One predict/correct cycle.
    ///
    /// The innovation covariance must be invertible; otherwise the new
    /// posterior is undefined. See [`KalmanFilter::try_update`].
    pub fn update(&mut self, measurement: &Vector<T, M>) {
        let prior = self.predict();
        let innovation_cov = innovation_covariance(
            &self.observation,
            &self.observation_t,
            &prior.covariance,
            &self.measurement_noise,
        );
        let gain = prior.covariance * self.observation_t * innovation_cov.inverse();
        self.commit(prior, gain, measurement);
    }

    /// Like [`KalmanFilter::update`], but leaves the filter untouched when the
    /// innovation covariance cannot be inverted.
    pub fn try_update(&mut self, measurement: &Vector<T, M>) -> Result<(), FilterError> {
        let prior = self.predict();
        let innovation_cov = innovation_covariance(
            &self.observation,
            &self.observation_t,
            &prior.covariance,
            &self.measurement_noise,
        );
        let Some(inverse) = innovation_cov.try_inverse() else {
            warn!("kalman filter: singular innovation covariance, update skipped");
            return Err(FilterError::SingularInnovation);
        };
        let gain = prior.covariance * self.observation_t * inverse;
        self.commit(prior, gain, measurement);
        Ok(())
    }

    fn predict(&self) -> Estimate<T, N> {
        Estimate {
            mean: self.transition * self.posterior.mean,
            covariance: propagate(
                &self.transition,
                &self.transition_t,
                &self.posterior.covariance,
                &self.process_noise,
            ),
        }
    }

    fn commit(&mut self, prior: Estimate<T, N>, gain: Matrix<T, N, M>, measurement: &Vector<T, M>) {
        let innovation = *measurement - self.observation * prior.mean;
        trace!("kalman filter: innovation {:?}", innovation.as_slice());
        self.posterior = correct(&prior, &gain, &self.observation, innovation);
        self.prior = prior;
        self.gain = gain;
    }

    /// Posterior mean.
    pub fn state(&self) -> &Vector<T, N> {
        &self.posterior.mean
    }

    pub fn covariance(&self) -> &Matrix<T, N, N> {
        &self.posterior.covariance
    }

    pub fn prior_state(&self) -> &Vector<T, N> {
        &self.prior.mean
    }

    pub fn prior_covariance(&self) -> &Matrix<T, N, N> {
        &self.prior.covariance
    }

    /// Gain used by the most recent update.
    pub fn gain(&self) -> &Matrix<T, N, M> {
        &self.gain
    }
}
