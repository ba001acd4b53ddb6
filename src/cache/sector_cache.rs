//! 扇区缓存实现
//!
//! 固定槽位、全相联、按逻辑时间戳做 LRU 驱逐。
//!
//! # 结构
//!
//! ```text
//! struct SectorCache<N> {
//!     entries: [CacheEntry; N],  // 预分配，永不释放
//!     counter: u32,              // 每次访问（命中或插入）递增
//!     stats: CacheStats,
//! }
//! ```
//!
//! 查找、插入、失效都是对 `entries` 的线性扫描。槽位数很小（默认 8），
//! 扫描开销相对设备 I/O 可以忽略。
//!
//! # 时间戳回绕
//!
//! `counter` 使用回绕加法。驱逐时比较的是"年龄" `counter - stamp`（回绕减法），
//! 选年龄最大的有效槽位。计数器回绕之前，这与"选最小时间戳"完全等价；
//! 回绕之后只要任意两次访问间隔小于 2^32，顺序依然正确。

use super::entry::CacheEntry;
use crate::consts::{SectorBuf, CACHE_SIZE, SECTOR_SIZE};

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 查找次数
    pub lookups: u64,
    /// 命中次数
    pub hits: u64,
    /// 未命中次数
    pub misses: u64,
    /// 插入次数
    pub inserts: u64,
    /// 因容量不足驱逐的次数
    pub evictions: u64,
    /// 被失效的槽位总数
    pub invalidations: u64,
}

impl CacheStats {
    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

/// 扇区缓存
///
/// 键为 `(drive, sector)`，值为一个扇区的数据。
/// 对任意 `(drive, sector)`，同一时刻最多只有一个有效槽位。
///
/// # 示例
///
/// ```rust,ignore
/// use diskio_cache::cache::SectorCache;
///
/// let mut cache: SectorCache = SectorCache::new();
///
/// cache.insert(0, 100, &sector);
///
/// let mut out = [0u8; 512];
/// if cache.lookup(0, 100, &mut out) {
///     // 命中
/// }
///
/// // 写入前使范围失效
/// cache.invalidate(0, 96, 8);
/// ```
pub struct SectorCache<const N: usize = CACHE_SIZE> {
    entries: [CacheEntry; N],
    counter: u32,
    stats: CacheStats,
}

impl<const N: usize> SectorCache<N> {
    /// 创建空缓存，所有槽位无效
    pub fn new() -> Self {
        Self {
            entries: core::array::from_fn(|_| CacheEntry::empty()),
            counter: 0,
            stats: CacheStats::default(),
        }
    }

    /// 取下一个时间戳
    #[inline]
    fn next_stamp(&mut self) -> u32 {
        self.counter = self.counter.wrapping_add(1);
        self.counter
    }

    /// 槽位年龄（距今的访问次数）
    #[inline]
    fn age(&self, stamp: u32) -> u32 {
        self.counter.wrapping_sub(stamp)
    }

    fn position(&self, drive: u8, sector: u32) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(drive, sector))
    }

    /// 查找扇区并复制到 `out`
    ///
    /// 命中时刷新该槽位的时间戳（查找本身就是一次访问）。
    ///
    /// # 返回
    ///
    /// 命中返回 `true`；未命中返回 `false`，`out` 不变。
    pub fn lookup(&mut self, drive: u8, sector: u32, out: &mut SectorBuf) -> bool {
        match self.get(drive, sector) {
            Some(data) => {
                out.copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    /// 查找扇区并返回数据的引用
    ///
    /// 与 [`lookup`](Self::lookup) 相同，命中时刷新时间戳。
    pub fn get(&mut self, drive: u8, sector: u32) -> Option<&SectorBuf> {
        self.stats.lookups += 1;

        let Some(idx) = self.position(drive, sector) else {
            self.stats.misses += 1;
            log::trace!("[CACHE] lookup drive={} sector={:#x} MISS", drive, sector);
            return None;
        };

        self.stats.hits += 1;
        let stamp = self.next_stamp();
        let entry = &mut self.entries[idx];
        entry.stamp = stamp;
        log::trace!(
            "[CACHE] lookup drive={} sector={:#x} HIT slot={} stamp={}",
            drive,
            sector,
            idx,
            stamp
        );
        Some(&entry.data)
    }

    /// 选择插入目标槽位
    ///
    /// 顺序：同键的有效槽位 → 任一无效槽位 → 年龄最大的有效槽位。
    /// 返回 `(下标, 是否驱逐了有效数据)`。
    fn pick_slot(&self, drive: u8, sector: u32) -> Option<(usize, bool)> {
        if let Some(idx) = self.position(drive, sector) {
            return Some((idx, false));
        }
        if let Some(idx) = self.entries.iter().position(|e| !e.valid) {
            return Some((idx, false));
        }

        let mut victim: Option<(usize, u32)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            let age = self.age(entry.stamp);
            if victim.map_or(true, |(_, oldest)| age > oldest) {
                victim = Some((idx, age));
            }
        }
        victim.map(|(idx, _)| (idx, true))
    }

    /// 插入扇区数据
    ///
    /// 缓存满时驱逐最久未访问的槽位。找不到可用槽位（仅当容量为 0）时
    /// 静默丢弃本次插入。
    pub fn insert(&mut self, drive: u8, sector: u32, data: &SectorBuf) {
        let Some((idx, evicted)) = self.pick_slot(drive, sector) else {
            log::error!(
                "[CACHE] no slot available for drive={} sector={:#x}, insert dropped",
                drive,
                sector
            );
            return;
        };

        if evicted {
            self.stats.evictions += 1;
            let old = &self.entries[idx];
            log::debug!(
                "[CACHE] evict slot={} drive={} sector={:#x} stamp={}",
                idx,
                old.drive,
                old.sector,
                old.stamp
            );
        }

        let stamp = self.next_stamp();
        let entry = &mut self.entries[idx];
        entry.data.copy_from_slice(data);
        entry.valid = true;
        entry.drive = drive;
        entry.sector = sector;
        entry.stamp = stamp;
        self.stats.inserts += 1;

        log::trace!(
            "[CACHE] insert drive={} sector={:#x} slot={} stamp={}",
            drive,
            sector,
            idx,
            stamp
        );
    }

    /// 使 `[sector, sector+count)` 范围内属于 `drive` 的槽位失效
    ///
    /// 只清除有效标志，不清零数据。
    ///
    /// # 返回
    ///
    /// 实际失效的槽位数量
    pub fn invalidate(&mut self, drive: u8, sector: u32, count: u32) -> usize {
        let start = sector as u64;
        let end = start + count as u64;

        let mut invalidated = 0;
        for entry in self.entries.iter_mut() {
            if entry.within(drive, start, end) {
                entry.valid = false;
                invalidated += 1;
            }
        }

        if invalidated > 0 {
            self.stats.invalidations += invalidated as u64;
            log::debug!(
                "[CACHE] invalidate drive={} range=[{:#x}, {:#x}) -> {} slots",
                drive,
                start,
                end,
                invalidated
            );
        }
        invalidated
    }

    /// 使属于 `drive` 的所有槽位失效
    pub fn invalidate_drive(&mut self, drive: u8) -> usize {
        let mut invalidated = 0;
        for entry in self.entries.iter_mut().filter(|e| e.valid && e.drive == drive) {
            entry.valid = false;
            invalidated += 1;
        }
        if invalidated > 0 {
            self.stats.invalidations += invalidated as u64;
            log::debug!("[CACHE] invalidate drive={} -> {} slots", drive, invalidated);
        }
        invalidated
    }

    /// 使所有槽位失效
    ///
    /// # 返回
    ///
    /// 失效前的有效槽位数量
    pub fn clear(&mut self) -> usize {
        let mut invalidated = 0;
        for entry in self.entries.iter_mut().filter(|e| e.valid) {
            entry.valid = false;
            invalidated += 1;
        }
        self.stats.invalidations += invalidated as u64;
        invalidated
    }

    /// 是否缓存了 `(drive, sector)`（不刷新时间戳）
    pub fn contains(&self, drive: u8, sector: u32) -> bool {
        self.position(drive, sector).is_some()
    }

    /// 遍历所有槽位（含无效槽位）
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter()
    }

    /// 获取缓存统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// 缓存容量（槽位数）
    pub const fn capacity(&self) -> usize {
        N
    }

    /// 有效槽位数量
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    /// 检查缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| !e.valid)
    }

    /// 缓存占用的数据字节数
    pub const fn data_bytes(&self) -> usize {
        N * SECTOR_SIZE
    }
}

impl<const N: usize> Default for SectorCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for SectorCache<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SectorCache")
            .field("capacity", &N)
            .field("len", &self.len())
            .field("counter", &self.counter)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sector_of(byte: u8) -> SectorBuf {
        [byte; SECTOR_SIZE]
    }

    #[test]
    fn test_cache_creation() {
        let cache: SectorCache = SectorCache::new();
        assert_eq!(cache.capacity(), 8);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.data_bytes(), 8 * 512);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut cache: SectorCache = SectorCache::new();
        cache.insert(0, 100, &sector_of(0x42));

        let mut out = [0u8; SECTOR_SIZE];
        assert!(cache.lookup(0, 100, &mut out));
        assert_eq!(out, sector_of(0x42));

        // 不同驱动器同一扇区
        let mut untouched = [0x11u8; SECTOR_SIZE];
        assert!(!cache.lookup(1, 100, &mut untouched));
        assert_eq!(untouched, [0x11u8; SECTOR_SIZE]);

        let stats = cache.stats();
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_lookup_refreshes_stamp() {
        let mut cache: SectorCache = SectorCache::new();
        cache.insert(0, 1, &sector_of(1));
        cache.insert(0, 2, &sector_of(2));

        let before = cache.entries().find(|e| e.matches(0, 1)).unwrap().stamp();
        assert!(cache.get(0, 1).is_some());
        let after = cache.entries().find(|e| e.matches(0, 1)).unwrap().stamp();
        assert!(after > before);
        assert_eq!(after, 3);
    }

    #[test]
    fn test_free_slot_preferred() {
        let mut cache: SectorCache<4> = SectorCache::new();
        for i in 0..4 {
            cache.insert(0, i, &sector_of(i as u8));
        }
        // 失效一个槽位后，新插入必须复用它而不是驱逐
        assert_eq!(cache.invalidate(0, 2, 1), 1);
        cache.insert(0, 10, &sector_of(10));

        assert_eq!(cache.len(), 4);
        assert_eq!(cache.stats().evictions, 0);
        assert!(cache.contains(0, 0));
        assert!(cache.contains(0, 10));
        assert!(!cache.contains(0, 2));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache: SectorCache<4> = SectorCache::new();
        for i in 0..4 {
            cache.insert(0, i, &sector_of(i as u8));
        }

        // 访问扇区 0，使其成为最近使用
        assert!(cache.get(0, 0).is_some());

        // 插入新扇区，应该驱逐扇区 1
        cache.insert(0, 10, &sector_of(10));
        assert_eq!(cache.len(), 4);
        assert!(cache.contains(0, 0));
        assert!(!cache.contains(0, 1));
        assert!(cache.contains(0, 10));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_victim_has_smallest_stamp() {
        let mut cache: SectorCache = SectorCache::new();
        let stamps = [5u32, 2, 9, 1, 7, 3, 8, 4];
        for (idx, stamp) in stamps.iter().enumerate() {
            let entry = &mut cache.entries[idx];
            entry.valid = true;
            entry.drive = 0;
            entry.sector = idx as u32;
            entry.stamp = *stamp;
        }
        cache.counter = 9;

        cache.insert(1, 500, &sector_of(0xEE));

        // 时间戳为 1 的槽位（下标 3）被驱逐
        assert!(!cache.contains(0, 3));
        assert!(cache.entries[3].matches(1, 500));
        assert_eq!(cache.entries[3].stamp(), 10);
        for idx in [0u32, 1, 2, 4, 5, 6, 7] {
            assert!(cache.contains(0, idx));
        }
    }

    #[test]
    fn test_eviction_across_counter_wrap() {
        let mut cache: SectorCache<2> = SectorCache::new();
        cache.counter = u32::MAX - 1;

        cache.insert(0, 1, &sector_of(1)); // stamp = u32::MAX
        cache.insert(0, 2, &sector_of(2)); // stamp = 0（回绕）
        assert_eq!(cache.entries[1].stamp(), 0);

        // 扇区 1 时间戳数值最大，但实际上最旧
        cache.insert(0, 3, &sector_of(3));
        assert!(!cache.contains(0, 1));
        assert!(cache.contains(0, 2));
        assert!(cache.contains(0, 3));
    }

    #[test]
    fn test_insert_existing_key_updates_in_place() {
        let mut cache: SectorCache = SectorCache::new();
        cache.insert(0, 7, &sector_of(1));
        cache.insert(0, 7, &sector_of(2));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(0, 7), Some(&sector_of(2)));
    }

    #[test]
    fn test_invalidate_range() {
        let mut cache: SectorCache = SectorCache::new();
        for sector in 8..14 {
            cache.insert(0, sector, &sector_of(sector as u8));
        }
        cache.insert(1, 10, &sector_of(0xAA));

        // [10, 13) 只影响驱动器 0 的 10、11、12
        assert_eq!(cache.invalidate(0, 10, 3), 3);
        assert!(cache.contains(0, 9));
        assert!(!cache.contains(0, 10));
        assert!(!cache.contains(0, 12));
        assert!(cache.contains(0, 13));
        assert!(cache.contains(1, 10));
        assert_eq!(cache.stats().invalidations, 3);

        // 空范围
        assert_eq!(cache.invalidate(0, 8, 0), 0);
    }

    #[test]
    fn test_invalidate_does_not_overflow() {
        let mut cache: SectorCache = SectorCache::new();
        cache.insert(0, u32::MAX, &sector_of(1));
        assert_eq!(cache.invalidate(0, u32::MAX - 1, u32::MAX), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_keeps_data() {
        let mut cache: SectorCache = SectorCache::new();
        cache.insert(0, 4, &sector_of(0x5A));
        cache.invalidate(0, 4, 1);

        let entry = cache.entries().next().unwrap();
        assert!(!entry.is_valid());
        assert_eq!(entry.data(), &sector_of(0x5A));
    }

    #[test]
    fn test_invalidate_drive() {
        let mut cache: SectorCache = SectorCache::new();
        cache.insert(0, 1, &sector_of(1));
        cache.insert(0, u32::MAX, &sector_of(2));
        cache.insert(1, 1, &sector_of(3));

        assert_eq!(cache.invalidate_drive(0), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(1, 1));
    }

    #[test]
    fn test_clear() {
        let mut cache: SectorCache = SectorCache::new();
        for sector in 0..5 {
            cache.insert(0, sector, &sector_of(0));
        }
        assert_eq!(cache.clear(), 5);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_drops_insert() {
        let mut cache: SectorCache<0> = SectorCache::new();
        cache.insert(0, 1, &sector_of(1));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().inserts, 0);
        assert!(cache.get(0, 1).is_none());
    }

    #[test]
    fn test_capacity_and_uniqueness_under_random_ops() {
        let mut cache: SectorCache = SectorCache::new();
        let mut seed: u32 = 0x1234_5678;
        let mut next = || {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            seed >> 16
        };

        for _ in 0..2000 {
            let drive = (next() % 2) as u8;
            let sector = next() % 24;
            match next() % 3 {
                0 => cache.insert(drive, sector, &sector_of(sector as u8)),
                1 => {
                    let _ = cache.get(drive, sector);
                }
                _ => {
                    cache.invalidate(drive, sector, next() % 4 + 1);
                }
            }

            let valid: Vec<(u8, u32)> = cache
                .entries()
                .filter(|e| e.is_valid())
                .map(|e| (e.drive(), e.sector()))
                .collect();
            assert!(valid.len() <= 8);
            for (i, a) in valid.iter().enumerate() {
                assert!(valid[i + 1..].iter().all(|b| b != a));
            }
        }
    }
}
