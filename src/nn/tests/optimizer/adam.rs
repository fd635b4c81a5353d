/*
 * @Author       : 老董
 * @Date         : 2025-12-20
 * @Description  : Adam 优化器测试
 */

use approx::assert_abs_diff_eq;
use ndarray::array;

use crate::nn::optimizer::{Adam, Optimizer, OptimizerKind};

#[test]
fn test_adam_creation() {
    let adam = Adam::new(0.001, 0.9, 0.999, 1e-8);
    assert_eq!(adam.learning_rate(), 0.001);

    let adam_default = Adam::default();
    assert_eq!(adam_default.learning_rate(), 1e-3);

    // 默认优化器为 Adam
    assert!(matches!(OptimizerKind::default(), OptimizerKind::Adam(_)));
}

#[test]
fn test_adam_update() {
    // 初始值 w=2，梯度 g=3
    // Adam更新 (beta1=0.9, beta2=0.999, eps=1e-8, lr=0.1):
    //   m_1 = 0.1 * 3 = 0.3
    //   v_1 = 0.001 * 9 = 0.009
    //   m_hat = 0.3 / (1-0.9) = 3.0
    //   v_hat = 0.009 / (1-0.999) = 9.0
    //   update = 0.1 * 3.0 / (sqrt(9.0) + 1e-8) ≈ 0.1
    //   w_new = 2.0 - 0.1 ≈ 1.9
    let mut w = array![[2.0f32]].into_dyn();
    let grads = vec![array![[3.0f32]].into_dyn()];
    let mut adam = Adam::new_default(0.1);

    adam.step(&mut [w.view_mut()], &grads).unwrap();
    assert_abs_diff_eq!(w[[0, 0]], 1.9, epsilon = 1e-5);
}

#[test]
fn test_adam_constant_gradient_steps() {
    // 梯度恒定时，偏差修正后每步更新量都约等于 lr
    let mut w = array![0.0f32].into_dyn();
    let grads = vec![array![0.5f32].into_dyn()];
    let mut adam = Adam::new_default(0.01);

    for _ in 0..5 {
        adam.step(&mut [w.view_mut()], &grads).unwrap();
    }
    assert_abs_diff_eq!(w[[0]], -0.05, epsilon = 1e-4);
}

#[test]
fn test_adam_reset() {
    let grads = vec![array![[3.0f32]].into_dyn()];
    let mut adam = Adam::new_default(0.1);

    let mut w = array![[2.0f32]].into_dyn();
    adam.step(&mut [w.view_mut()], &grads).unwrap();
    adam.step(&mut [w.view_mut()], &grads).unwrap();

    // 重置后再走一步，结果应与全新优化器的第一步一致
    adam.reset();
    let mut w2 = array![[2.0f32]].into_dyn();
    adam.step(&mut [w2.view_mut()], &grads).unwrap();
    assert_abs_diff_eq!(w2[[0, 0]], 1.9, epsilon = 1e-5);
}
