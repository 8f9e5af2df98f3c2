use std::time::Instant;

use crate::core::{
    MediaSummary, Result, SessionLog, TimeBase, TrackClock, TrackDetail, TrackInfo,
};
use crate::player::decode::{AudioDecoder, VideoDecoder};
use crate::player::demux::Demuxer;
use crate::player::scheduler::Scheduler;
use crate::player::track::Track;
use crate::ui::ascii;
use ffmpeg_next::{codec, format};

/// 默认的每轨帧队列容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// 媒体会话 - 一条视频轨 + 一条音频轨 + 共享解封装器
///
/// 打开时一次完成：找流、建解码器、按终端尺寸定输出分辨率、
/// 预分配全部队列槽位、捕获两条轨道的时钟原点。
pub struct Media {
    demuxer: Demuxer,
    video: Track<VideoDecoder>,
    audio: Track<AudioDecoder>,
    summary: MediaSummary,
}

impl Media {
    /// 打开媒体源并组装双轨会话
    pub fn open(
        url: &str,
        term_size: (u16, u16),
        capacity: usize,
        log: &SessionLog,
    ) -> Result<Self> {
        let demuxer = Demuxer::open(url, log)?;

        let video_info = describe_video(&demuxer.video_stream())?;
        let audio_info = describe_audio(&demuxer.audio_stream())?;

        let (src_w, src_h) = match video_info.detail {
            TrackDetail::Video { width, height, .. } => (width, height),
            _ => unreachable!(),
        };
        let out_size = ascii::fit_size(term_size, src_w, src_h);
        log.info(
            "demux",
            format!("显示尺寸 {}x{}（源 {}x{}）", out_size.0, out_size.1, src_w, src_h),
        );

        let video_decoder =
            VideoDecoder::from_stream(&demuxer.video_stream(), out_size, log.clone())?;
        let audio_decoder = AudioDecoder::from_stream(&demuxer.audio_stream(), log.clone())?;

        // 两条轨道共用同一打开时刻作为时钟原点
        let origin = Instant::now();
        let video = Track::new(
            video_info.clone(),
            video_decoder,
            capacity,
            TrackClock::with_origin(video_info.time_base, origin),
        );
        let audio = Track::new(
            audio_info.clone(),
            audio_decoder,
            capacity,
            TrackClock::with_origin(audio_info.time_base, origin),
        );

        let summary = MediaSummary {
            url: demuxer.url().to_string(),
            format: demuxer.input().format().description().to_string(),
            duration_us: demuxer.input().duration(),
            video: video_info,
            audio: audio_info,
        };

        Ok(Self {
            demuxer,
            video,
            audio,
            summary,
        })
    }

    pub fn summary(&self) -> &MediaSummary {
        &self.summary
    }

    /// 拆出调度器，会话进入播放阶段
    pub fn into_scheduler(self, log: SessionLog) -> Scheduler<Demuxer, VideoDecoder, AudioDecoder> {
        Scheduler::new(self.demuxer, self.video, self.audio, log)
    }
}

fn codec_long_name(params: &codec::Parameters) -> String {
    match codec::decoder::find(params.id()) {
        Some(codec) => codec.description().to_string(),
        None => params.id().name().to_string(),
    }
}

fn bit_rate(params: &codec::Parameters) -> i64 {
    // 安全 API 未暴露码率字段，从参数结构直接读取
    unsafe { (*params.as_ptr()).bit_rate }
}

fn describe_video(stream: &format::stream::Stream) -> Result<TrackInfo> {
    let params = stream.parameters();
    let context = codec::context::Context::from_parameters(stream.parameters())?;
    let decoder = context.decoder().video()?;
    let rate = stream.avg_frame_rate();
    let tb = stream.time_base();

    Ok(TrackInfo {
        stream_index: stream.index(),
        time_base: TimeBase::new(tb.numerator(), tb.denominator()),
        codec: codec_long_name(&params),
        bit_rate: bit_rate(&params),
        detail: TrackDetail::Video {
            width: decoder.width(),
            height: decoder.height(),
            frame_rate: (rate.numerator(), rate.denominator()),
        },
    })
}

fn describe_audio(stream: &format::stream::Stream) -> Result<TrackInfo> {
    let params = stream.parameters();
    let context = codec::context::Context::from_parameters(stream.parameters())?;
    let decoder = context.decoder().audio()?;
    let tb = stream.time_base();

    Ok(TrackInfo {
        stream_index: stream.index(),
        time_base: TimeBase::new(tb.numerator(), tb.denominator()),
        codec: codec_long_name(&params),
        bit_rate: bit_rate(&params),
        detail: TrackDetail::Audio {
            channels: decoder.channels(),
            sample_rate: decoder.rate(),
        },
    })
}
