use crate::core::{Result, SessionLog};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::{codec, format, software, util};

/// 解码原语抽象
///
/// 真实实现封装一个 FFmpeg 解码上下文；测试里可以注入合成解码器
/// 驱动调度器。每次 `receive_into` 至多产出一帧，"还需要更多包"与
/// "流已排空"都表现为 `Ok(None)`，不是错误。
pub trait StreamDecoder {
    type Packet;
    /// 队列槽位类型：视频是换算好的 RGB 帧，音频是原始采样帧
    type Slot;

    /// 预分配一个队列槽
    fn alloc_slot(&self) -> Self::Slot;

    /// 送入一个压缩包
    fn send_packet(&mut self, packet: &Self::Packet) -> Result<()>;

    /// 至多取出一帧原地写入槽位，返回帧的原生时间戳
    fn receive_into(&mut self, slot: &mut Self::Slot) -> Result<Option<i64>>;
}

/// 视频解码器 - 软件解码并换算到终端显示用的 RGB24 帧
pub struct VideoDecoder {
    decoder: codec::decoder::Video,
    /// 像素格式在解出第一帧前未必可知，按首帧惰性创建
    scaler: Option<software::scaling::Context>,
    /// 解码暂存帧：归解码器私有，随解码器一同释放，不对外暴露
    scratch: util::frame::Video,
    out_width: u32,
    out_height: u32,
    log: SessionLog,
}

impl VideoDecoder {
    /// 从视频流创建解码器，输出尺寸在会话开始时一次性确定
    pub fn from_stream(
        stream: &format::stream::Stream,
        out_size: (u32, u32),
        log: SessionLog,
    ) -> Result<Self> {
        let context = codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = context.decoder().video()?;

        log.debug(
            "decode",
            format!(
                "视频解码器: {}x{} -> {}x{}",
                decoder.width(),
                decoder.height(),
                out_size.0,
                out_size.1
            ),
        );

        Ok(Self {
            decoder,
            scaler: None,
            scratch: util::frame::Video::empty(),
            out_width: out_size.0,
            out_height: out_size.1,
            log,
        })
    }

}

impl StreamDecoder for VideoDecoder {
    type Packet = ffmpeg::Packet;
    type Slot = util::frame::Video;

    fn alloc_slot(&self) -> Self::Slot {
        util::frame::Video::new(format::Pixel::RGB24, self.out_width, self.out_height)
    }

    fn send_packet(&mut self, packet: &Self::Packet) -> Result<()> {
        match self.decoder.send_packet(packet) {
            Ok(()) => Ok(()),
            // 解码器已排空或内部缓冲已满，该包忽略，下个 tick 自然重试
            Err(ffmpeg::Error::Eof) => Ok(()),
            Err(ffmpeg::Error::Other { errno: 11 }) => Ok(()), // EAGAIN
            Err(e) => {
                self.log
                    .warn("decode", format!("视频包送入失败（已跳过）: {}", e));
                Ok(())
            }
        }
    }

    fn receive_into(&mut self, slot: &mut Self::Slot) -> Result<Option<i64>> {
        match self.decoder.receive_frame(&mut self.scratch) {
            Ok(()) => {}
            Err(ffmpeg::Error::Other { errno: 11 }) => return Ok(None), // EAGAIN
            Err(ffmpeg::Error::Eof) => return Ok(None),
            Err(e) => {
                self.log
                    .warn("decode", format!("视频解码错误（已跳过）: {}", e));
                return Ok(None);
            }
        }

        if self.scaler.is_none() {
            self.scaler = Some(software::scaling::Context::get(
                self.scratch.format(),
                self.scratch.width(),
                self.scratch.height(),
                format::Pixel::RGB24,
                self.out_width,
                self.out_height,
                software::scaling::Flags::BILINEAR,
            )?);
        }

        // 直接换算进队列槽位，不做每帧分配
        if let Err(e) = self.scaler.as_mut().unwrap().run(&self.scratch, slot) {
            self.log
                .warn("decode", format!("视频格式换算失败（已跳过）: {}", e));
            return Ok(None);
        }

        Ok(Some(self.scratch.timestamp().unwrap_or(0)))
    }
}

/// 音频解码器 - 采样帧不做重采样，原样入队
pub struct AudioDecoder {
    decoder: codec::decoder::Audio,
    log: SessionLog,
}

impl AudioDecoder {
    /// 从音频流创建解码器
    pub fn from_stream(stream: &format::stream::Stream, log: SessionLog) -> Result<Self> {
        let context = codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = context.decoder().audio()?;

        log.debug(
            "decode",
            format!(
                "音频解码器: {} Hz, {} 声道",
                decoder.rate(),
                decoder.channels()
            ),
        );

        Ok(Self { decoder, log })
    }
}

impl StreamDecoder for AudioDecoder {
    type Packet = ffmpeg::Packet;
    type Slot = util::frame::Audio;

    fn alloc_slot(&self) -> Self::Slot {
        // 解码器会自行填充槽位缓冲并在复用时回收
        util::frame::Audio::empty()
    }

    fn send_packet(&mut self, packet: &Self::Packet) -> Result<()> {
        match self.decoder.send_packet(packet) {
            Ok(()) => Ok(()),
            Err(ffmpeg::Error::Eof) => Ok(()),
            Err(ffmpeg::Error::Other { errno: 11 }) => Ok(()), // EAGAIN
            Err(e) => {
                self.log
                    .warn("decode", format!("音频包送入失败（已跳过）: {}", e));
                Ok(())
            }
        }
    }

    fn receive_into(&mut self, slot: &mut Self::Slot) -> Result<Option<i64>> {
        match self.decoder.receive_frame(slot) {
            Ok(()) => Ok(Some(slot.timestamp().unwrap_or(0))),
            Err(ffmpeg::Error::Other { errno: 11 }) => Ok(None), // EAGAIN
            Err(ffmpeg::Error::Eof) => Ok(None),
            Err(e) => {
                self.log
                    .warn("decode", format!("音频解码错误（已跳过）: {}", e));
                Ok(None)
            }
        }
    }
}
