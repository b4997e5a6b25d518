//! Sort keys, draw commands, the per-frame pipeline, and post-processing.

pub mod command;
pub mod pipeline;
pub mod post_process;
pub mod renderable;
pub mod sort_key;

pub use command::{DrawCommand, PassFlags, NON_PICKABLE, NO_SCENE_OBJECT};
pub use pipeline::{FrameStats, RenderPipeline};
pub use post_process::{EffectSamplingFlags, PostProcessEffect, PostProcessingChain};
pub use renderable::{RenderSettings, Renderable, TransparencyMode};
pub use sort_key::{SortKey, SortKeyFields};
