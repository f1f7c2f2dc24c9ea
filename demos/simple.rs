use core::f32::consts::PI;
use core::time::Duration;

use nalgebra::{UnitQuaternion, Vector3};
use uf_ekf::{EstimatorParams, OrientationEstimator};

fn main() {
    env_logger::init();

    let dt = Duration::from_secs_f32(1.0 / 100.0);
    let mut estimator = OrientationEstimator::new(EstimatorParams::default());

    // Level body, a quarter turn per second about "up".
    let gyr = Vector3::new(0.0, 0.0, PI / 2.0);
    let acc = Vector3::new(0.0, 0.0, 9.81);
    let field = Vector3::new(20.0, 0.0, -40.0);

    for step in 1..=200 {
        let t = step as f32 * dt.as_secs_f32();
        let turn = UnitQuaternion::from_euler_angles(0.0, 0.0, gyr.z * t);
        estimator.update_sensors(gyr, acc, turn * field, dt);

        if step % 50 == 0 {
            let euler = estimator.orientation().map(|q| q.euler_angles());
            println!(
                "t = {t:.2} s  rate = {:.3?}  euler = {euler:.3?}",
                estimator.angular_rate().as_slice()
            );
        }
    }
}
