// Purpose: voice pool, MIDI scheduling, render loop
// This layer sits above the dsp primitives and owns everything the audio thread touches

pub mod allocator;
pub mod message;
pub mod queue;
pub mod sampler;
pub mod status;
pub mod voice;

pub use allocator::{RetriggerPolicy, VoicePool};
pub use message::{ControlMessage, ParamId};
pub use sampler::{Sampler, SamplerHandle};
pub use status::EngineStatus;
