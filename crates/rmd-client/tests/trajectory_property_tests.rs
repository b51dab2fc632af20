//! 正弦轨迹的属性测试
//!
//! 使用 proptest 验证轨迹公式。

use proptest::prelude::*;
use rmd_client::control::{SineTrajectory, TrajectoryParams};
use rmd_client::types::{Deg, Rad};
use std::f64::consts::TAU;

fn tolerance(scale: f64) -> f64 {
    1e-9 * scale.max(1.0)
}

proptest! {
    /// 位置 = A·sin(2πft)
    #[test]
    fn position_matches_formula(
        a in 0.001..720.0f64,
        f in 0.01..20.0f64,
        t in 0.0..100.0f64,
    ) {
        let params = TrajectoryParams::new(a, f).unwrap();
        let r = SineTrajectory::with_velocity(params).reference(t);
        prop_assert!((r.position - a * (TAU * f * t).sin()).abs() < tolerance(a));
    }

    /// 速度 = A·2πf·cos(2πft)
    #[test]
    fn velocity_matches_formula(
        a in 0.001..720.0f64,
        f in 0.01..20.0f64,
        t in 0.0..100.0f64,
    ) {
        let params = TrajectoryParams::new(a, f).unwrap();
        let r = SineTrajectory::with_velocity(params).reference(t);
        let expected = a * TAU * f * (TAU * f * t).cos();
        prop_assert!((r.velocity.unwrap() - expected).abs() < tolerance(a * TAU * f));
    }

    /// 同一时刻总是得到相同结果
    #[test]
    fn reference_is_idempotent(
        a in 0.001..720.0f64,
        f in 0.01..20.0f64,
        t in 0.0..100.0f64,
    ) {
        let trajectory = SineTrajectory::with_velocity(TrajectoryParams::new(a, f).unwrap());
        prop_assert_eq!(trajectory.reference(t), trajectory.reference(t));
    }

    /// t = 0 时位置为 0，速度为 A·2πf
    #[test]
    fn starts_at_zero_with_peak_velocity(a in 0.001..720.0f64, f in 0.01..20.0f64) {
        let r = SineTrajectory::with_velocity(TrajectoryParams::new(a, f).unwrap()).reference(0.0);
        prop_assert_eq!(r.position, 0.0);
        prop_assert!((r.velocity.unwrap() - a * TAU * f).abs() < tolerance(a * TAU * f));
    }

    /// 位置始终在 [-A, A] 内
    #[test]
    fn position_is_bounded(
        a in 0.001..720.0f64,
        f in 0.01..20.0f64,
        t in 0.0..100.0f64,
    ) {
        let r = SineTrajectory::position_only(TrajectoryParams::new(a, f).unwrap()).reference(t);
        prop_assert!(r.position.abs() <= a);
        prop_assert!(r.velocity.is_none());
    }

    /// 轨迹不做单位换算：弧度幅值的结果换算成角度等于角度幅值的结果
    #[test]
    fn generator_is_unit_agnostic(
        a_deg in 0.1..360.0f64,
        f in 0.01..20.0f64,
        t in 0.0..10.0f64,
    ) {
        let deg = SineTrajectory::position_only(TrajectoryParams::new(a_deg, f).unwrap());
        let rad = SineTrajectory::position_only(
            TrajectoryParams::new(Deg(a_deg).to_rad().0, f).unwrap(),
        );
        let via_rad = Rad(rad.reference(t).position).to_deg().0;
        prop_assert!((deg.reference(t).position - via_rad).abs() < 1e-9);
    }
}

#[test]
fn test_quarter_period_scenario() {
    // 45°, 1 Hz, 运控模式（弧度）
    let params = TrajectoryParams::new(Deg(45.0).to_rad().0, 1.0).unwrap();
    let r = SineTrajectory::with_velocity(params).reference(0.25);
    assert!((Rad(r.position).to_deg().0 - 45.0).abs() < 1e-9);
    assert!(r.velocity.unwrap().abs() < 1e-9);
}
