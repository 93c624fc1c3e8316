//! 可复现的高斯噪声生成器
//!
//! 仿真传感器的读数会叠加噪声。种子为 0 时使用系统熵，
//! 否则每次运行产生相同的序列。

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
    enabled: bool,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng, enabled: true }
    }

    /// 始终返回 0 的生成器
    pub fn silent() -> Self {
        Self {
            rng: SmallRng::seed_from_u64(1),
            enabled: false,
        }
    }

    /// 从同一个种子派生独立的子生成器（每个传感器一个）
    pub fn fork(&mut self) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(self.rng.next_u64()),
            enabled: self.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// N(0, stddev²) 采样
    #[inline]
    pub fn gaussian(&mut self, stddev: f64) -> f64 {
        if !self.enabled || stddev == 0.0 {
            return 0.0;
        }
        let n: f64 = self.rng.sample(StandardNormal);
        n * stddev.abs()
    }
}
