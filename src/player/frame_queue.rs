use crate::core::{PlayerError, Result};

/// 固定容量环形帧队列
///
/// 槽位在建队时一次性分配，之后原地复用：解码方先取写入槽填充，
/// 再提交入队；逻辑最旧的帧始终位于 `start` 槽。
/// 不变量：`0 <= size <= capacity`。
pub struct FrameQueue<T> {
    slots: Vec<T>,
    start: usize,
    size: usize,
}

impl<T> FrameQueue<T> {
    /// 用预分配好的槽位建队；容量即 `slots.len()`
    pub fn new(slots: Vec<T>) -> Self {
        assert!(!slots.is_empty(), "帧队列容量至少为 1");
        Self {
            slots,
            start: 0,
            size: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == self.slots.len()
    }

    pub fn has_room(&self) -> bool {
        !self.is_full()
    }

    /// 下一个写入槽（最旧帧之后第 `size` 个槽）
    ///
    /// 调用方写好内容后用 [`commit`](Self::commit) 入队；队满时返回 `QueueFull`，
    /// 调用方必须在发起会产生帧的解码之前检查容量。
    pub fn write_slot(&mut self) -> Result<&mut T> {
        if self.is_full() {
            return Err(PlayerError::QueueFull);
        }
        let index = (self.start + self.size) % self.slots.len();
        Ok(&mut self.slots[index])
    }

    /// 提交写入槽中的帧
    pub fn commit(&mut self) -> Result<()> {
        if self.is_full() {
            return Err(PlayerError::QueueFull);
        }
        self.size += 1;
        Ok(())
    }

    /// 入队一个现成值
    pub fn push(&mut self, value: T) -> Result<()> {
        *self.write_slot()? = value;
        self.commit()
    }

    /// 最旧的帧；队空时返回 None
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        Some(&self.slots[self.start])
    }

    /// 出队最旧的帧并返回其槽位内容
    ///
    /// 槽位存储归队列所有，返回的引用在下一次写入该槽前有效。
    pub fn pop(&mut self) -> Result<&T> {
        if self.is_empty() {
            return Err(PlayerError::QueueEmpty);
        }
        let index = self.start;
        self.start = (self.start + 1) % self.slots.len();
        self.size -= 1;
        Ok(&self.slots[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(capacity: usize) -> FrameQueue<i64> {
        FrameQueue::new(vec![0; capacity])
    }

    #[test]
    fn test_fifo_law() {
        // 交替压入/弹出，弹出序列必须等于压入序列
        let mut q = queue(4);
        let mut popped = Vec::new();
        for v in 0..10 {
            q.push(v).unwrap();
            if v % 2 == 1 {
                popped.push(*q.pop().unwrap());
                popped.push(*q.pop().unwrap());
            }
        }
        assert_eq!(popped, (0..10).collect::<Vec<_>>());
        assert!(q.is_empty());
    }

    #[test]
    fn test_full_and_empty_guards() {
        let mut q = queue(2);
        assert!(matches!(q.pop(), Err(PlayerError::QueueEmpty)));
        q.push(1).unwrap();
        q.push(2).unwrap();
        assert!(q.is_full());
        assert!(matches!(q.push(3), Err(PlayerError::QueueFull)));
        assert!(matches!(q.write_slot(), Err(PlayerError::QueueFull)));
        assert_eq!(*q.pop().unwrap(), 1);
        q.push(3).unwrap();
        assert_eq!(*q.pop().unwrap(), 2);
        assert_eq!(*q.pop().unwrap(), 3);
    }

    #[test]
    fn test_peek_is_idempotent() {
        let mut q = queue(3);
        q.push(7).unwrap();
        q.push(8).unwrap();
        for _ in 0..5 {
            assert_eq!(q.peek(), Some(&7));
        }
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_wraparound() {
        // 反复绕环，次序不乱
        let mut q = queue(3);
        for round in 0..7i64 {
            q.push(round * 2).unwrap();
            q.push(round * 2 + 1).unwrap();
            assert_eq!(*q.pop().unwrap(), round * 2);
            assert_eq!(*q.pop().unwrap(), round * 2 + 1);
        }
    }

    #[test]
    fn test_size_bounds_hold() {
        for capacity in 1..=5 {
            let mut q = queue(capacity);
            for v in 0..(capacity as i64 * 3) {
                if q.has_room() {
                    q.push(v).unwrap();
                }
                assert!(q.len() <= q.capacity());
                if v % 2 == 0 && !q.is_empty() {
                    q.pop().unwrap();
                }
            }
        }
    }

    #[test]
    fn test_write_slot_then_commit() {
        let mut q = queue(2);
        *q.write_slot().unwrap() = 41;
        // 未提交前队列仍为空
        assert!(q.is_empty());
        q.commit().unwrap();
        assert_eq!(q.peek(), Some(&41));
    }
}
