/*
 * @Author       : 老董
 * @Date         : 2025-12-20
 * @Description  : SGD 优化器测试
 */

use approx::assert_abs_diff_eq;
use ndarray::{ArrayD, IxDyn, array};

use crate::nn::ModelError;
use crate::nn::optimizer::{Optimizer, OptimizerKind, SGD};

#[test]
fn test_sgd_update() {
    // w = w - lr * g : 2.0 - 0.1 * 3.0 = 1.7
    let mut w = array![[2.0f32]].into_dyn();
    let grads = vec![array![[3.0f32]].into_dyn()];
    let mut sgd = SGD::new(0.1);

    sgd.step(&mut [w.view_mut()], &grads).unwrap();
    assert_abs_diff_eq!(w[[0, 0]], 1.7, epsilon = 1e-6);

    // 无状态：第二步的更新量与第一步相同
    sgd.step(&mut [w.view_mut()], &grads).unwrap();
    assert_abs_diff_eq!(w[[0, 0]], 1.4, epsilon = 1e-6);
}

#[test]
fn test_sgd_multiple_params() {
    let mut w = array![1.0f32, -1.0].into_dyn();
    let mut b = array![0.5f32].into_dyn();
    let grads = vec![array![1.0f32, 2.0].into_dyn(), array![-1.0f32].into_dyn()];
    let mut sgd = SGD::new(0.5);

    sgd.step(&mut [w.view_mut(), b.view_mut()], &grads).unwrap();
    assert_abs_diff_eq!(w[[0]], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(w[[1]], -2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(b[[0]], 1.0, epsilon = 1e-6);
}

#[test]
fn test_sgd_shape_mismatch() {
    let mut w = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
    let grads = vec![ArrayD::<f32>::zeros(IxDyn(&[2, 3]))];
    let mut sgd = SGD::new(0.1);

    let result = sgd.step(&mut [w.view_mut()], &grads);
    assert!(matches!(result, Err(ModelError::ShapeMismatch { .. })));

    let result = sgd.step(&mut [w.view_mut()], &[]);
    assert!(matches!(result, Err(ModelError::ShapeMismatch { .. })));
}

#[test]
fn test_sgd_learning_rate_through_kind() {
    let mut optimizer = OptimizerKind::from(SGD::new(0.01));
    assert_eq!(optimizer.learning_rate(), 0.01);
    optimizer.set_learning_rate(0.001);
    assert_eq!(optimizer.learning_rate(), 0.001);
}
