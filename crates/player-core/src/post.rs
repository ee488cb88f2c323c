//! Post-process parameters: ambient occlusion and film grain

use crate::config::PostConfig;

/// Uniforms of the film-grain pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilmGrain {
    pub amount: f32,
    pub time: f32,
}

impl FilmGrain {
    pub fn new(config: &PostConfig) -> Self {
        Self {
            amount: config.grain_amount,
            time: 0.0,
        }
    }
}

impl Default for FilmGrain {
    fn default() -> Self {
        Self::new(&PostConfig::default())
    }
}

/// Screen-space ambient occlusion settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ssao {
    pub enabled: bool,
    pub kernel_radius: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Coarse quality buckets engines expose instead of a kernel size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsaoQuality {
    Low,
    Medium,
    High,
    Ultra,
}

impl Ssao {
    pub fn new(config: &PostConfig) -> Self {
        Self {
            enabled: config.ssao,
            kernel_radius: config.ssao_kernel_radius,
            min_distance: config.ssao_min_distance,
            max_distance: config.ssao_max_distance,
        }
    }

    pub fn quality(&self) -> SsaoQuality {
        match self.kernel_radius {
            r if r >= 32.0 => SsaoQuality::Ultra,
            r if r >= 16.0 => SsaoQuality::High,
            r if r >= 8.0 => SsaoQuality::Medium,
            _ => SsaoQuality::Low,
        }
    }

    /// Assumed thickness of occluders, taken from the depth window
    pub fn object_thickness(&self) -> f32 {
        (self.max_distance - self.min_distance).max(0.0)
    }
}

impl Default for Ssao {
    fn default() -> Self {
        Self::new(&PostConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grain_starts_at_zero_time() {
        let grain = FilmGrain::default();
        assert_eq!(grain.time, 0.0);
        assert!((grain.amount - PostConfig::default().grain_amount).abs() < 1e-9);
    }

    #[test]
    fn test_ssao_defaults() {
        let ssao = Ssao::default();
        assert!(ssao.enabled);
        assert_eq!(ssao.quality(), SsaoQuality::High);
        assert!((ssao.object_thickness() - 0.099).abs() < 1e-6);
    }
}
