use log::{debug, trace, warn};

use crate::error::FilterError;
use crate::kalman::{correct, innovation_covariance, propagate, Estimate};
use crate::traits::{MatrixMut, MatrixRef, MeasurementModel, ProcessModel, Scalar, VectorRef};
use crate::{Matrix, Vector};

/// Extended Kalman filter over a nonlinear process `F` and measurement `H`.
///
/// Each cycle linearises `F` around the previous posterior and `H` around
/// the new prior, then runs the usual Kalman correction. No control input.
#[derive(Debug, Clone)]
pub struct ExtendedKalmanFilter<T, const N: usize, const M: usize, F, H> {
    process: F,
    process_noise: Matrix<T, N, N>,
    measurement: H,
    measurement_noise: Matrix<T, M, M>,
    process_jacobian: Matrix<T, N, N>,
    measurement_jacobian: Matrix<T, M, N>,
    gain: Matrix<T, N, M>,
    prior: Estimate<T, N>,
    posterior: Estimate<T, N>,
}

impl<T, const N: usize, const M: usize, F, H> ExtendedKalmanFilter<T, N, M, F, H>
where
    T: Scalar,
    F: ProcessModel<T, N>,
    H: MeasurementModel<T, N, M>,
{
    pub fn new(
        process: F,
        process_noise: Matrix<T, N, N>,
        measurement: H,
        measurement_noise: Matrix<T, M, M>,
    ) -> Self {
        debug!("extended kalman filter: {N} states, {M} measurements");
        Self {
            process,
            process_noise,
            measurement,
            measurement_noise,
            process_jacobian: Matrix::zeros(),
            measurement_jacobian: Matrix::zeros(),
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

    /// One predict/correct cycle over a step of `dt`.
    ///
    /// `H·Σ·Hᵗ + Q` must be invertible; otherwise the new posterior is
    /// undefined. See [`ExtendedKalmanFilter::try_update`].
    pub fn update(&mut self, measurement: &Vector<T, M>, dt: T) {
        let prior = self.predict(dt);
        let innovation_cov = self.linearize_measurement(&prior, dt);
        let gain = prior.covariance * self.measurement_jacobian.transpose() * innovation_cov.inverse();
        self.commit(prior, gain, measurement, dt);
    }

    /// Like [`ExtendedKalmanFilter::update`], but keeps the previous posterior
    /// when `H·Σ·Hᵗ + Q` cannot be inverted.
    ///
    /// The cached Jacobians always reflect the latest attempt.
    pub fn try_update(&mut self, measurement: &Vector<T, M>, dt: T) -> Result<(), FilterError> {
        let prior = self.predict(dt);
        let innovation_cov = self.linearize_measurement(&prior, dt);
        let Some(inverse) = innovation_cov.try_inverse() else {
            warn!("extended kalman filter: singular innovation covariance, update skipped");
            return Err(FilterError::SingularInnovation);
        };
        let gain = prior.covariance * self.measurement_jacobian.transpose() * inverse;
        self.commit(prior, gain, measurement, dt);
        Ok(())
    }

    fn predict(&mut self, dt: T) -> Estimate<T, N> {
        self.process_jacobian.fill(T::zero());
        self.process
            .jacobian(&self.posterior.mean, dt, &mut self.process_jacobian);
        Estimate {
            mean: self.process.predict(&self.posterior.mean, dt),
            covariance: propagate(
                &self.process_jacobian,
                &self.process_jacobian.transpose(),
                &self.posterior.covariance,
                &self.process_noise,
            ),
        }
    }

    /// Refreshes `H` at the prior mean and returns the innovation covariance.
    fn linearize_measurement(&mut self, prior: &Estimate<T, N>, dt: T) -> Matrix<T, M, M> {
        self.measurement_jacobian.fill(T::zero());
        self.measurement
            .jacobian(&prior.mean, dt, &mut self.measurement_jacobian);
        innovation_covariance(
            &self.measurement_jacobian,
            &self.measurement_jacobian.transpose(),
            &prior.covariance,
            &self.measurement_noise,
        )
    }

    fn commit(
        &mut self,
        prior: Estimate<T, N>,
        gain: Matrix<T, N, M>,
        measurement: &Vector<T, M>,
        dt: T,
    ) {
        let innovation = *measurement - self.measurement.measure(&prior.mean, dt);
        trace!(
            "extended kalman filter: dt {:?}, innovation {:?}",
            dt,
            innovation.as_slice()
        );
        self.posterior = correct(&prior, &gain, &self.measurement_jacobian, innovation);
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

    pub fn gain(&self) -> &Matrix<T, N, M> {
        &self.gain
    }

    /// `∂f/∂x` from the latest update.
    pub fn process_jacobian(&self) -> &Matrix<T, N, N> {
        &self.process_jacobian
    }

    /// `∂h/∂x` from the latest update.
    pub fn measurement_jacobian(&self) -> &Matrix<T, M, N> {
        &self.measurement_jacobian
    }

    pub fn process(&self) -> &F {
        &self.process
    }

    pub fn measurement(&self) -> &H {
        &self.measurement
    }
}

/// [`ProcessModel`] built from a transition closure and its Jacobian.
#[derive(Debug, Clone, Copy)]
pub struct FnProcess<F, J> {
    function: F,
    jacobian: J,
}

impl<F, J> FnProcess<F, J> {
    pub fn new(function: F, jacobian: J) -> Self {
        Self { function, jacobian }
    }
}

impl<T, const N: usize, F, J> ProcessModel<T, N> for FnProcess<F, J>
where
    F: Fn(&Vector<T, N>, T) -> Vector<T, N>,
    J: Fn(&Vector<T, N>, T, &mut Matrix<T, N, N>),
{
    fn predict(&self, state: &Vector<T, N>, dt: T) -> Vector<T, N> {
        (self.function)(state, dt)
    }

    fn jacobian(&self, state: &Vector<T, N>, dt: T, jacobian: &mut Matrix<T, N, N>) {
        (self.jacobian)(state, dt, jacobian)
    }
}

/// [`MeasurementModel`] built from an observation closure and its Jacobian.
#[derive(Debug, Clone, Copy)]
pub struct FnMeasurement<H, J> {
    function: H,
    jacobian: J,
}

impl<H, J> FnMeasurement<H, J> {
    pub fn new(function: H, jacobian: J) -> Self {
        Self { function, jacobian }
    }
}

impl<T, const N: usize, const M: usize, H, J> MeasurementModel<T, N, M> for FnMeasurement<H, J>
where
    H: Fn(&Vector<T, N>, T) -> Vector<T, M>,
    J: Fn(&Vector<T, N>, T, &mut Matrix<T, M, N>),
{
    fn measure(&self, state: &Vector<T, N>, dt: T) -> Vector<T, M> {
        (self.function)(state, dt)
    }

    fn jacobian(&self, state: &Vector<T, N>, dt: T, jacobian: &mut Matrix<T, M, N>) {
        (self.jacobian)(state, dt, jacobian)
    }
}
