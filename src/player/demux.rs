use crate::core::{PlayerError, Result, SessionLog};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::{format, media};

/// 数据包来源抽象
///
/// 真实实现由 FFmpeg 解封装器提供；测试里可以注入合成包序列。
pub trait PacketSource {
    type Packet;

    /// 读取下一个数据包及其所属流序号
    ///
    /// 返回：
    /// - Ok(Some((index, packet))): 成功读到一个包
    /// - Ok(None): 容器已耗尽（预期的终止信号，不是错误）
    /// - Err(e): 读取错误
    fn read_packet(&mut self) -> Result<Option<(usize, Self::Packet)>>;
}

/// 解封装器 - 打开媒体源并按容器顺序逐包读出压缩数据
///
/// 只跟踪最先找到的一条视频流和一条音频流，后续同类型流忽略。
pub struct Demuxer {
    input: format::context::Input,
    video_stream_index: usize,
    audio_stream_index: usize,
    url: String,
}

impl Demuxer {
    /// 打开媒体文件或 URL
    pub fn open(url: &str, log: &SessionLog) -> Result<Self> {
        let input = format::input(&url)
            .map_err(|e| PlayerError::Open(format!("{}: {}", url, e)))?;

        let video_stream_index = input
            .streams()
            .find(|s| s.parameters().medium() == media::Type::Video)
            .map(|s| s.index())
            .ok_or(PlayerError::NoVideoStream)?;

        let audio_stream_index = input
            .streams()
            .find(|s| s.parameters().medium() == media::Type::Audio)
            .map(|s| s.index())
            .ok_or(PlayerError::NoAudioStream)?;

        log.info(
            "demux",
            format!(
                "已打开 {}（视频流 {}，音频流 {}）",
                url, video_stream_index, audio_stream_index
            ),
        );

        Ok(Self {
            input,
            video_stream_index,
            audio_stream_index,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn input(&self) -> &format::context::Input {
        &self.input
    }

    pub fn video_stream(&self) -> format::stream::Stream {
        self.input.stream(self.video_stream_index).unwrap()
    }

    pub fn audio_stream(&self) -> format::stream::Stream {
        self.input.stream(self.audio_stream_index).unwrap()
    }
}

impl PacketSource for Demuxer {
    type Packet = ffmpeg::Packet;

    fn read_packet(&mut self) -> Result<Option<(usize, Self::Packet)>> {
        match self.input.packets().next() {
            Some((stream, packet)) => Ok(Some((stream.index(), packet))),
            None => Ok(None),
        }
    }
}
