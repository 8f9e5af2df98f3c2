// 播放器核心模块

pub mod decode;
pub mod demux;
pub mod frame_queue;
pub mod media;
pub mod scheduler;
pub mod track;

pub use decode::{AudioDecoder, StreamDecoder, VideoDecoder};
pub use demux::{Demuxer, PacketSource};
pub use frame_queue::FrameQueue;
pub use media::{Media, DEFAULT_QUEUE_CAPACITY};
pub use scheduler::{PlaybackState, Released, Scheduler};
pub use track::{FrameRelease, QueuedFrame, Track};
