use core::ops::Neg;
use core::time::Duration;

use log::debug;
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

use crate::ekf::ExtendedKalmanFilter;
use crate::error::FilterError;
use crate::traits::{MatrixMut, MeasurementModel, ProcessModel, Scalar, VectorMut, VectorRef};
use crate::{Matrix, Vector};

pub const STATE_SIZE: usize = 12;
pub const MEASUREMENT_SIZE: usize = 9;

const AXES: usize = 3;
const STATE_BLOCKS: usize = STATE_SIZE / AXES;
const MEASUREMENT_BLOCKS: usize = MEASUREMENT_SIZE / AXES;

// State blocks, in order.
const OMEGA: usize = 0;
const OMEGA_DOT: usize = 1;
const GRAVITY: usize = 2;
const MAGNETIC: usize = 3;

/// `[ω, ω̇, g, m]`, three components each.
pub type State = Vector<f32, STATE_SIZE>;

/// `[ω, g, m]` as read from gyroscope, accelerometer and magnetometer.
pub type Measurement = Vector<f32, MEASUREMENT_SIZE>;

/// Cross-product matrix: `skew(w) * v == w × v`.
pub fn skew<T, V>(w: &V) -> Matrix<T, 3, 3>
where
    T: Scalar + Neg<Output = T>,
    V: VectorRef<T, 3> + ?Sized,
{
    let w = w.as_slice();
    let (x, y, z) = (w[0], w[1], w[2]);
    let zero = T::zero();
    Matrix::new([[zero, -z, y], [z, zero, -x], [-y, x, zero]])
}

/// Constant angular acceleration; gravity and magnetic field are fixed in
/// the world frame, so in the body frame they rotate against `ω`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationProcess;

impl<T: Scalar + Neg<Output = T>> ProcessModel<T, STATE_SIZE> for OrientationProcess {
    fn predict(&self, state: &Vector<T, STATE_SIZE>, dt: T) -> Vector<T, STATE_SIZE> {
        let [omega, omega_dot, gravity, magnetic] = state.partition::<AXES, STATE_BLOCKS>();
        let rotation = skew(&omega).scale(dt);

        let mut next = *state;
        let [mut next_omega, _, mut next_gravity, mut next_magnetic] =
            next.partition_mut::<AXES, STATE_BLOCKS>();
        next_omega += omega_dot.scale(dt);
        next_gravity += rotation * gravity;
        next_magnetic += rotation * magnetic;
        next
    }

    fn jacobian(
        &self,
        state: &Vector<T, STATE_SIZE>,
        dt: T,
        jacobian: &mut Matrix<T, STATE_SIZE, STATE_SIZE>,
    ) {
        let [omega, _, gravity, magnetic] = state.partition::<AXES, STATE_BLOCKS>();
        let eye = Matrix::<T, AXES, AXES>::eye();
        let coupling = eye + skew(&omega).scale(dt);

        let mut blocks = jacobian.partition_mut::<AXES, AXES, STATE_BLOCKS, STATE_BLOCKS>();
        blocks[(OMEGA, OMEGA)].copy_from(&eye);
        blocks[(OMEGA, OMEGA_DOT)].copy_from(&eye.scale(dt));
        blocks[(OMEGA_DOT, OMEGA_DOT)].copy_from(&eye);
        blocks[(GRAVITY, OMEGA)].copy_from(&-skew(&gravity).scale(dt));
        blocks[(GRAVITY, GRAVITY)].copy_from(&coupling);
        blocks[(MAGNETIC, OMEGA)].copy_from(&-skew(&magnetic).scale(dt));
        blocks[(MAGNETIC, MAGNETIC)].copy_from(&coupling);
    }
}

/// Direct readings of `ω`, `g` and `m`; `ω̇` is not observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationMeasurement;

const OBSERVED: [usize; MEASUREMENT_BLOCKS] = [OMEGA, GRAVITY, MAGNETIC];

impl<T: Scalar> MeasurementModel<T, STATE_SIZE, MEASUREMENT_SIZE> for OrientationMeasurement {
    fn measure(&self, state: &Vector<T, STATE_SIZE>, _dt: T) -> Vector<T, MEASUREMENT_SIZE> {
        let blocks = state.partition::<AXES, STATE_BLOCKS>();
        let mut measurement = Vector::<T, MEASUREMENT_SIZE>::zeros();
        let readings = measurement.partition_mut::<AXES, MEASUREMENT_BLOCKS>();
        for (mut reading, block) in readings.into_iter().zip(OBSERVED) {
            reading.copy_from(&blocks[block]);
        }
        measurement
    }

    fn jacobian(
        &self,
        _state: &Vector<T, STATE_SIZE>,
        _dt: T,
        jacobian: &mut Matrix<T, MEASUREMENT_SIZE, STATE_SIZE>,
    ) {
        let eye = Matrix::<T, AXES, AXES>::eye();
        let mut blocks = jacobian.partition_mut::<AXES, AXES, MEASUREMENT_BLOCKS, STATE_BLOCKS>();
        for (row, block) in OBSERVED.into_iter().enumerate() {
            blocks[(row, block)].copy_from(&eye);
        }
    }
}

/// Assembles a [`Measurement`] from the three sensor readings.
pub fn measurement(
    gyroscope: Vector3<f32>,
    accelerometer: Vector3<f32>,
    magnetometer: Vector3<f32>,
) -> Measurement {
    let mut measurement = Measurement::zeros();
    let readings = measurement.partition_mut::<AXES, MEASUREMENT_BLOCKS>();
    for (mut reading, sensor) in readings
        .into_iter()
        .zip([gyroscope, accelerometer, magnetometer])
    {
        reading.copy_from(&Vector::from(sensor));
    }
    measurement
}

/// Noise variances and the initial uncertainty of [`OrientationEstimator`].
///
/// Each variance applies to all three axes of its block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EstimatorParams {
    pub rate_noise: f32,
    pub rate_derivative_noise: f32,
    pub gravity_noise: f32,
    pub magnetic_noise: f32,
    pub gyroscope_noise: f32,
    pub accelerometer_noise: f32,
    pub magnetometer_noise: f32,
    /// Diagonal of the initial state covariance.
    pub initial_covariance: f32,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            rate_noise: 1e-3,
            rate_derivative_noise: 1e-2,
            gravity_noise: 1e-4,
            magnetic_noise: 1e-4,
            gyroscope_noise: 1e-3,
            accelerometer_noise: 1e-2,
            magnetometer_noise: 1e-2,
            initial_covariance: 1.0,
        }
    }
}

impl EstimatorParams {
    pub fn process_noise(&self) -> Matrix<f32, STATE_SIZE, STATE_SIZE> {
        let variances = [
            self.rate_noise,
            self.rate_derivative_noise,
            self.gravity_noise,
            self.magnetic_noise,
        ];
        Matrix::from_diagonal(&Vector::<f32, STATE_SIZE>::from_fn(|i| variances[i / AXES]))
    }

    pub fn measurement_noise(&self) -> Matrix<f32, MEASUREMENT_SIZE, MEASUREMENT_SIZE> {
        let variances = [
            self.gyroscope_noise,
            self.accelerometer_noise,
            self.magnetometer_noise,
        ];
        Matrix::from_diagonal(&Vector::<f32, MEASUREMENT_SIZE>::from_fn(|i| variances[i / AXES]))
    }
}

pub type OrientationFilter = ExtendedKalmanFilter<
    f32,
    STATE_SIZE,
    MEASUREMENT_SIZE,
    OrientationProcess,
    OrientationMeasurement,
>;

/// MARG orientation estimator on top of [`ExtendedKalmanFilter`].
#[derive(Debug, Clone)]
pub struct OrientationEstimator {
    params: EstimatorParams,
    filter: OrientationFilter,
}

impl Default for OrientationEstimator {
    fn default() -> OrientationEstimator {
        OrientationEstimator::new(EstimatorParams::default())
    }
}

impl OrientationEstimator {
    /// Starts at rest, level, facing magnetic north.
    pub fn new(params: EstimatorParams) -> Self {
        let state = State::new([
            0.0, 0.0, 0.0, // ω
            0.0, 0.0, 0.0, // ω̇
            0.0, 0.0, 1.0, // g
            1.0, 0.0, 0.0, // m
        ]);
        OrientationEstimator::new_with_state(params, state)
    }

    pub fn new_with_state(params: EstimatorParams, state: State) -> Self {
        debug!("orientation estimator: {params:?}");
        let covariance = Matrix::<f32, STATE_SIZE, STATE_SIZE>::eye().scale(params.initial_covariance);
        let filter = ExtendedKalmanFilter::new(
            OrientationProcess,
            params.process_noise(),
            OrientationMeasurement,
            params.measurement_noise(),
        )
        .with_state(state, covariance);
        OrientationEstimator { params, filter }
    }

    /// `dt` in seconds.
    pub fn update(&mut self, measurement: &Measurement, dt: f32) {
        self.filter.update(measurement, dt);
    }

    pub fn try_update(&mut self, measurement: &Measurement, dt: f32) -> Result<(), FilterError> {
        self.filter.try_update(measurement, dt)
    }

    pub fn update_sensors(
        &mut self,
        gyroscope: Vector3<f32>,
        accelerometer: Vector3<f32>,
        magnetometer: Vector3<f32>,
        sample_period: Duration,
    ) {
        let measurement = measurement(gyroscope, accelerometer, magnetometer);
        self.update(&measurement, sample_period.as_secs_f32());
    }

    pub fn state(&self) -> &State {
        self.filter.state()
    }

    pub fn covariance(&self) -> &Matrix<f32, STATE_SIZE, STATE_SIZE> {
        self.filter.covariance()
    }

    fn block(&self, block: usize) -> Vector3<f32> {
        let state = self.filter.state();
        Vector3::from_fn(|axis, _| state[block * AXES + axis])
    }

    pub fn angular_rate(&self) -> Vector3<f32> {
        self.block(OMEGA)
    }

    pub fn angular_acceleration(&self) -> Vector3<f32> {
        self.block(OMEGA_DOT)
    }

    /// Estimated "up" direction in the body frame, as an accelerometer at
    /// rest reads it.
    pub fn gravity(&self) -> Vector3<f32> {
        self.block(GRAVITY)
    }

    pub fn magnetic_field(&self) -> Vector3<f32> {
        self.block(MAGNETIC)
    }

    /// Rotation from the body frame to North-West-Up.
    ///
    /// `None` when gravity or the magnetic field is near zero, or the two are
    /// parallel.
    pub fn orientation(&self) -> Option<UnitQuaternion<f32>> {
        let up = self.gravity().try_normalize(f32::EPSILON)?;
        let west = up
            .cross(&self.magnetic_field())
            .try_normalize(f32::EPSILON)?;
        let north = west.cross(&up);

        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_rows(&[
            north.transpose(),
            west.transpose(),
            up.transpose(),
        ]));
        Some(UnitQuaternion::from_rotation_matrix(&rotation))
    }

    pub fn params(&self) -> &EstimatorParams {
        &self.params
    }

    pub fn filter(&self) -> &OrientationFilter {
        &self.filter
    }
}
