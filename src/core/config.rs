//! Engine-wide configuration, threaded explicitly through constructors
//! rather than read from global mutable statics.

/// Tunables shared by [`crate::resource::cache::ResourceCache`] and
/// [`crate::render::pipeline::RenderPipeline`], constructed once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Eviction budget for removable, non-core resource payloads, in bytes.
    pub eviction_budget_bytes: u64,
    /// Shadow map resolution, in texels per side.
    pub shadow_map_resolution: u32,
    /// MSAA sample count for the main color/depth framebuffer; `1` disables MSAA.
    pub msaa_samples: u32,
    /// Default clear color for the main pass.
    pub clear_color: crate::core::math::Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eviction_budget_bytes: 256 * 1024 * 1024,
            shadow_map_resolution: 2048,
            msaa_samples: 4,
            clear_color: crate::core::math::Color::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_256_mib() {
        assert_eq!(EngineConfig::default().eviction_budget_bytes, 256 * 1024 * 1024);
    }
}
