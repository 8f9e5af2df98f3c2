use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("FFmpeg 错误: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("无法打开媒体源: {0}")]
    Open(String),

    #[error("无法找到视频流")]
    NoVideoStream,

    #[error("无法找到音频流")]
    NoAudioStream,

    // 队满仍继续解码属于调度器的缺陷，不是需要恢复的运行时状况
    #[error("帧队列已满")]
    QueueFull,

    #[error("帧队列为空")]
    QueueEmpty,
}

pub type Result<T> = std::result::Result<T, PlayerError>;
