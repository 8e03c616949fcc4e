pub mod derived;
pub mod presets;
pub mod scenario;
pub mod synthesizer;
pub mod types;

pub use derived::{compute_ar_opacity, compute_safety_level, is_adverse_weather};
pub use presets::Preset;
pub use scenario::{ScenarioKind, ScenarioTemplate, SCENARIOS};
pub use synthesizer::{apply_override, SynthesisError, Synthesizer};
pub use types::{Gear, StatePatch, ValidationError, VehicleContext, VehicleState};
