use std::time::Instant;

use crate::core::{Result, TrackClock, TrackInfo};
use crate::player::decode::StreamDecoder;
use crate::player::frame_queue::FrameQueue;

/// 入队的解码帧：槽位数据加上原生时间戳与解码序号
///
/// 序号只用来报告"至今解出第几帧"，消费次序始终是到达次序。
pub struct QueuedFrame<T> {
    pub data: T,
    pub pts: i64,
    pub seq: u64,
}

/// 到期释放给渲染层的帧视图
pub struct FrameRelease<'a, T> {
    pub data: &'a T,
    pub pts: i64,
    pub seq: u64,
    /// 释放后该轨道队列的占用量
    pub queued: usize,
}

/// 一条基本流轨道：解码上下文 + 有界帧队列 + 演示时钟
///
/// 槽位在建轨时一次性预分配，解码始终原地写入下一个空槽；
/// 解码上下文与槽位都随轨道一同销毁，会话中途不重建。
pub struct Track<D: StreamDecoder> {
    info: TrackInfo,
    decoder: D,
    queue: FrameQueue<QueuedFrame<D::Slot>>,
    clock: TrackClock,
    frames_decoded: u64,
    frames_released: u64,
    last_released_pts: i64,
}

impl<D: StreamDecoder> Track<D> {
    pub fn new(info: TrackInfo, decoder: D, capacity: usize, clock: TrackClock) -> Self {
        let slots = (0..capacity.max(1))
            .map(|_| QueuedFrame {
                data: decoder.alloc_slot(),
                pts: 0,
                seq: 0,
            })
            .collect();
        Self {
            info,
            decoder,
            queue: FrameQueue::new(slots),
            clock,
            frames_decoded: 0,
            frames_released: 0,
            last_released_pts: 0,
        }
    }

    pub fn stream_index(&self) -> usize {
        self.info.stream_index
    }

    pub fn has_room(&self) -> bool {
        self.queue.has_room()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    pub fn frames_released(&self) -> u64 {
        self.frames_released
    }

    pub fn last_released_pts(&self) -> i64 {
        self.last_released_pts
    }

    /// 解码一个属于本轨道的压缩包
    ///
    /// 调用方必须先确认队列有空位——解码一旦发出就无法撤销。
    /// 返回本次是否有帧入队；解码器"尚无帧可出"不算错误。
    pub fn decode_packet(&mut self, packet: &D::Packet) -> Result<bool> {
        // 先取写入槽再送包：队满在发出解码前就报出
        let slot = self.queue.write_slot()?;
        self.decoder.send_packet(packet)?;
        match self.decoder.receive_into(&mut slot.data)? {
            Some(pts) => {
                self.frames_decoded += 1;
                slot.pts = pts;
                slot.seq = self.frames_decoded;
                self.queue.commit()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 队首帧到期则出队释放；未到期或队空返回 None
    ///
    /// 到期判定：本轨道时钟流逝刻度 >= 队首帧时间戳。只会按时或迟到，
    /// 从不提前，也不丢帧。
    pub fn pop_due(&mut self, now: Instant) -> Option<FrameRelease<'_, D::Slot>> {
        let front = self.queue.peek()?;
        if self.clock.ticks_at(now) < front.pts {
            return None;
        }
        self.frames_released += 1;
        self.last_released_pts = front.pts;
        let queued = self.queue.len() - 1;
        let slot = self.queue.pop().ok()?;
        Some(FrameRelease {
            data: &slot.data,
            pts: slot.pts,
            seq: slot.seq,
            queued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerError, TimeBase, TrackDetail};
    use std::collections::VecDeque;
    use std::time::Duration;

    /// 合成解码器：送入的包时间戳排队，逐次吐回；blocked 时只吞包不出帧
    struct FakeDecoder {
        pending: VecDeque<i64>,
        blocked: bool,
    }

    impl FakeDecoder {
        fn new() -> Self {
            Self {
                pending: VecDeque::new(),
                blocked: false,
            }
        }
    }

    impl StreamDecoder for FakeDecoder {
        type Packet = i64;
        type Slot = i64;

        fn alloc_slot(&self) -> i64 {
            0
        }

        fn send_packet(&mut self, packet: &i64) -> Result<()> {
            self.pending.push_back(*packet);
            Ok(())
        }

        fn receive_into(&mut self, slot: &mut i64) -> Result<Option<i64>> {
            if self.blocked {
                return Ok(None);
            }
            match self.pending.pop_front() {
                Some(pts) => {
                    *slot = pts;
                    Ok(Some(pts))
                }
                None => Ok(None),
            }
        }
    }

    fn info() -> TrackInfo {
        TrackInfo {
            stream_index: 0,
            time_base: TimeBase::new(1, 1000),
            codec: "fake".to_string(),
            bit_rate: 0,
            detail: TrackDetail::Video {
                width: 16,
                height: 16,
                frame_rate: (25, 1),
            },
        }
    }

    fn track(capacity: usize, origin: Instant) -> Track<FakeDecoder> {
        Track::new(
            info(),
            FakeDecoder::new(),
            capacity,
            TrackClock::with_origin(TimeBase::new(1, 1000), origin),
        )
    }

    #[test]
    fn test_decode_stamps_sequence() {
        let t0 = Instant::now();
        let mut track = track(4, t0);
        assert!(track.decode_packet(&10).unwrap());
        assert!(track.decode_packet(&20).unwrap());
        assert_eq!(track.frames_decoded(), 2);
        assert_eq!(track.queue_len(), 2);

        let release = track.pop_due(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(release.pts, 10);
        assert_eq!(release.seq, 1);
        assert_eq!(release.queued, 1);
    }

    #[test]
    fn test_decode_into_full_queue_is_defect() {
        let t0 = Instant::now();
        let mut track = track(2, t0);
        track.decode_packet(&1).unwrap();
        track.decode_packet(&2).unwrap();
        assert!(matches!(
            track.decode_packet(&3),
            Err(PlayerError::QueueFull)
        ));
        // 失败的调用不得污染计数
        assert_eq!(track.frames_decoded(), 2);
    }

    #[test]
    fn test_pop_due_respects_clock() {
        let t0 = Instant::now();
        let mut track = track(4, t0);
        track.decode_packet(&50).unwrap();

        // 流逝 49 刻度：未到期
        assert!(track.pop_due(t0 + Duration::from_millis(49)).is_none());
        assert_eq!(track.queue_len(), 1);

        // 流逝 50 刻度：恰好到期
        let release = track.pop_due(t0 + Duration::from_millis(50)).unwrap();
        assert_eq!(release.pts, 50);
        assert_eq!(track.frames_released(), 1);
        assert_eq!(track.last_released_pts(), 50);
    }

    #[test]
    fn test_pop_due_on_empty_queue() {
        let t0 = Instant::now();
        let mut track = track(2, t0);
        assert!(track.pop_due(t0 + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_no_frame_ready_is_not_an_error() {
        let t0 = Instant::now();
        let mut track = track(2, t0);
        track.decoder.blocked = true;
        // 解码器尚无帧可出：包被吞掉，不入队也不报错
        assert!(!track.decode_packet(&1).unwrap());
        assert!(!track.decode_packet(&2).unwrap());
        assert_eq!(track.queue_len(), 0);
        assert_eq!(track.frames_decoded(), 0);
    }
}
