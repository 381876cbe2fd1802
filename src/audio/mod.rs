pub mod backend;
pub mod clip;
pub mod device;
pub mod mock;
pub mod stream;

pub use backend::{AudioFrame, CaptureError, MicBackend, MicConfig, MicFactory, MicSource};
pub use clip::AudioClip;
pub use device::DeviceMic;
pub use mock::{MockMic, ToneMic};
pub use stream::{AudioStream, TrackHandle};
