#![no_std]
#![allow(clippy::needless_doctest_main)]
#![doc = include_str!("../README.md")]

mod convert;
mod ekf;
mod error;
mod kalman;
mod matrix;
mod orientation;
mod traits;
mod vector;
mod view;

pub use ekf::{ExtendedKalmanFilter, FnMeasurement, FnProcess};
pub use error::FilterError;
pub use kalman::KalmanFilter;
pub use matrix::Matrix;
pub use orientation::{
    measurement, skew, EstimatorParams, Measurement, OrientationEstimator, OrientationFilter,
    OrientationMeasurement, OrientationProcess, State, MEASUREMENT_SIZE, STATE_SIZE,
};
pub use traits::{
    MatrixMut, MatrixRef, MeasurementModel, ProcessModel, Scalar, VectorMut, VectorRef,
};
pub use vector::Vector;
pub use view::{Blocks, MatrixView, MatrixViewMut, VectorView, VectorViewMut};
