//! 缓存槽位结构

use crate::consts::{SectorBuf, SECTOR_SIZE};

/// 缓存槽位
///
/// 一个槽位保存一个扇区的数据。`valid == false` 时槽位空闲，
/// 其余字段无意义；失效只清除有效标志，不清零数据。
///
/// # 字段说明
///
/// - `data`: 扇区数据（512 字节）
/// - `valid`: 槽位是否有效
/// - `drive`: 所属驱动器号
/// - `sector`: 扇区地址（LBA）
/// - `stamp`: 最近一次访问（插入或命中）的逻辑时间戳
#[derive(Clone)]
pub struct CacheEntry {
    pub(super) data: SectorBuf,
    pub(super) valid: bool,
    pub(super) drive: u8,
    pub(super) sector: u32,
    pub(super) stamp: u32,
}

impl CacheEntry {
    /// 创建空槽位
    pub const fn empty() -> Self {
        Self {
            data: [0u8; SECTOR_SIZE],
            valid: false,
            drive: 0,
            sector: 0,
            stamp: 0,
        }
    }

    /// 槽位是否有效
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// 所属驱动器号
    pub fn drive(&self) -> u8 {
        self.drive
    }

    /// 扇区地址
    pub fn sector(&self) -> u32 {
        self.sector
    }

    /// 最近访问时间戳
    pub fn stamp(&self) -> u32 {
        self.stamp
    }

    /// 扇区数据
    pub fn data(&self) -> &SectorBuf {
        &self.data
    }

    /// 是否缓存了 `(drive, sector)`
    #[inline]
    pub(super) fn matches(&self, drive: u8, sector: u32) -> bool {
        self.valid && self.drive == drive && self.sector == sector
    }

    /// 是否落在 `[start, end)` 范围内
    #[inline]
    pub(super) fn within(&self, drive: u8, start: u64, end: u64) -> bool {
        let sector = self.sector as u64;
        self.valid && self.drive == drive && sector >= start && sector < end
    }
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self::empty()
    }
}

impl core::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("valid", &self.valid)
            .field("drive", &self.drive)
            .field("sector", &self.sector)
            .field("stamp", &self.stamp)
            .finish()
    }
}
