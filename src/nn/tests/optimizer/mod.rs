/*
 * @Author       : 老董
 * @Date         : 2025-12-20
 * @Description  : 优化器模块单元测试
 *
 * 测试按功能分组：
 * - sgd: SGD 优化器测试
 * - adam: Adam 优化器测试
 */

mod adam;
mod sgd;
