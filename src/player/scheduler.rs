use std::time::Instant;

use crate::core::{Result, SessionLog};
use crate::player::decode::StreamDecoder;
use crate::player::demux::PacketSource;
use crate::player::track::{FrameRelease, Track};

/// 播放调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// 正常播放：继续读包解码
    Running,
    /// 容器已读尽，只排空队列里剩余的帧
    Draining,
    /// 终止态
    Stopped,
}

/// 本 tick 到期释放的帧
pub enum Released<'a, V, A> {
    Video(FrameRelease<'a, V>),
    Audio(FrameRelease<'a, A>),
}

/// 播放调度器 - 协作式单线程控制核心
///
/// 每个 tick 按固定次序推进：响应退出、读一个包并路由解码、
/// 逐轨道释放到期帧、检查排空完成。解码最多一步、每轨道最多
/// 释放一帧，随后把控制权交还给重绘与输入轮询。
///
/// 读包步骤是两条轨道共享的，由更拥堵的一侧把关：任一队列满
/// 则本 tick 不读包，于是视频队列满也会顺带停住音频解码。
/// 这是有意的简化，跨轨道的背压耦合属于既定行为。
pub struct Scheduler<S, V, A>
where
    S: PacketSource,
    V: StreamDecoder<Packet = S::Packet>,
    A: StreamDecoder<Packet = S::Packet>,
{
    source: S,
    video: Track<V>,
    audio: Track<A>,
    state: PlaybackState,
    log: SessionLog,
}

impl<S, V, A> Scheduler<S, V, A>
where
    S: PacketSource,
    V: StreamDecoder<Packet = S::Packet>,
    A: StreamDecoder<Packet = S::Packet>,
{
    pub fn new(source: S, video: Track<V>, audio: Track<A>, log: SessionLog) -> Self {
        Self {
            source,
            video,
            audio,
            state: PlaybackState::Running,
            log,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn video(&self) -> &Track<V> {
        &self.video
    }

    pub fn audio(&self) -> &Track<A> {
        &self.audio
    }

    /// 推进一个调度 tick
    pub fn tick<F>(&mut self, quit: bool, sink: F) -> Result<PlaybackState>
    where
        F: FnMut(Released<'_, V::Slot, A::Slot>),
    {
        self.tick_at(Instant::now(), quit, sink)
    }

    /// 以给定时刻推进一个调度 tick（测试用合成时刻驱动）
    pub fn tick_at<F>(&mut self, now: Instant, quit: bool, mut sink: F) -> Result<PlaybackState>
    where
        F: FnMut(Released<'_, V::Slot, A::Slot>),
    {
        // 1. 退出立即生效：队列里未显示的帧直接作废
        if quit {
            if self.state != PlaybackState::Stopped {
                self.log.info("sched", "收到退出指令，立即停止".to_string());
            }
            self.state = PlaybackState::Stopped;
            return Ok(self.state);
        }
        if self.state == PlaybackState::Stopped {
            return Ok(self.state);
        }

        // 2. 读包解码：两条队列都有空位才读，容器耗尽后转入排空
        if self.state == PlaybackState::Running
            && self.video.has_room()
            && self.audio.has_room()
        {
            match self.source.read_packet()? {
                Some((index, packet)) => {
                    if index == self.video.stream_index() {
                        self.video.decode_packet(&packet)?;
                    } else if index == self.audio.stream_index() {
                        self.audio.decode_packet(&packet)?;
                    }
                    // 其余流的包直接丢弃
                }
                None => {
                    self.state = PlaybackState::Draining;
                    self.log
                        .info("sched", "容器读取完毕，进入排空阶段".to_string());
                }
            }
        }

        // 3. 释放到期帧：逐轨道与各自的时钟比较，只会按时或迟到
        if let Some(release) = self.video.pop_due(now) {
            sink(Released::Video(release));
        }
        if let Some(release) = self.audio.pop_due(now) {
            sink(Released::Audio(release));
        }

        // 4. 排空完成即终止
        if self.state == PlaybackState::Draining
            && self.video.is_empty()
            && self.audio.is_empty()
        {
            self.state = PlaybackState::Stopped;
            self.log.info("sched", "播放结束".to_string());
        }

        Ok(self.state)
    }
}
