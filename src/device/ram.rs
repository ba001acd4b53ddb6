//! 内存盘
//!
//! 以 `Vec<u8>` 为存储的 [`SectorDevice`] 实现。
//! 除了作为 RAM 驱动器使用外，还提供故障注入与调用计数，
//! 控制端 [`RamDiskState`] 通过 `Arc` 共享，设备被移交给门面层后仍可操作。

use super::SectorDevice;
use crate::consts::SECTOR_SIZE;
use crate::error::{Error, ErrorKind, Result};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// 内存盘的共享控制状态与计数器
#[derive(Debug)]
pub struct RamDiskState {
    inserted: AtomicBool,
    read_only: AtomicBool,
    fail_startup: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    startups: AtomicU32,
    reads: AtomicU32,
    writes: AtomicU32,
    status_clears: AtomicU32,
}

impl Default for RamDiskState {
    fn default() -> Self {
        Self {
            inserted: AtomicBool::new(true),
            read_only: AtomicBool::new(false),
            fail_startup: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            startups: AtomicU32::new(0),
            reads: AtomicU32::new(0),
            writes: AtomicU32::new(0),
            status_clears: AtomicU32::new(0),
        }
    }
}

impl RamDiskState {
    /// 设置介质是否插入
    pub fn set_inserted(&self, inserted: bool) {
        self.inserted.store(inserted, Ordering::Relaxed);
    }

    /// 设置写保护
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Relaxed);
    }

    /// 让后续 `startup` 失败
    pub fn set_fail_startup(&self, fail: bool) {
        self.fail_startup.store(fail, Ordering::Relaxed);
    }

    /// 让后续读操作失败
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// 让后续写操作失败
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// `startup` 调用次数
    pub fn startups(&self) -> u32 {
        self.startups.load(Ordering::Relaxed)
    }

    /// `read_sectors` 调用次数（含失败）
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }

    /// `write_sectors` 调用次数（含失败）
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }

    /// `clear_status` 调用次数
    pub fn status_clears(&self) -> u32 {
        self.status_clears.load(Ordering::Relaxed)
    }
}

/// 内存盘
pub struct RamDisk {
    storage: Vec<u8>,
    state: Arc<RamDiskState>,
}

impl RamDisk {
    /// 创建一个包含 `sector_count` 个全零扇区的内存盘
    pub fn new(sector_count: u32) -> Self {
        Self {
            storage: alloc::vec![0u8; sector_count as usize * SECTOR_SIZE],
            state: Arc::new(RamDiskState::default()),
        }
    }

    /// 获取共享控制状态
    pub fn state(&self) -> Arc<RamDiskState> {
        Arc::clone(&self.state)
    }

    /// 扇区总数
    pub fn sector_count(&self) -> u32 {
        (self.storage.len() / SECTOR_SIZE) as u32
    }

    /// 计算 `[sector, sector+count)` 在存储中的字节范围
    fn byte_range(&self, sector: u32, count: u32, buf_len: usize) -> Result<core::ops::Range<usize>> {
        let len = (count as usize)
            .checked_mul(SECTOR_SIZE)
            .ok_or(Error::new(ErrorKind::InvalidInput, "Sector count too large"))?;
        if buf_len < len {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Buffer too small for requested sectors",
            ));
        }
        let start = (sector as usize)
            .checked_mul(SECTOR_SIZE)
            .ok_or(Error::new(ErrorKind::Io, "Sector range beyond end of disk"))?;
        match start.checked_add(len) {
            Some(end) if end <= self.storage.len() => Ok(start..end),
            _ => Err(Error::new(ErrorKind::Io, "Sector range beyond end of disk")),
        }
    }
}

impl SectorDevice for RamDisk {
    fn startup(&mut self) -> Result<()> {
        self.state.startups.fetch_add(1, Ordering::Relaxed);
        if self.state.fail_startup.load(Ordering::Relaxed) {
            return Err(Error::new(ErrorKind::NotReady, "RAM disk startup failed"));
        }
        Ok(())
    }

    fn is_inserted(&self) -> bool {
        self.state.inserted.load(Ordering::Relaxed)
    }

    fn read_sectors(&mut self, sector: u32, count: u32, buf: &mut [u8]) -> Result<()> {
        self.state.reads.fetch_add(1, Ordering::Relaxed);
        if self.state.fail_reads.load(Ordering::Relaxed) {
            return Err(Error::new(ErrorKind::Io, "RAM disk read failed"));
        }
        let range = self.byte_range(sector, count, buf.len())?;
        let len = range.len();
        buf[..len].copy_from_slice(&self.storage[range]);
        Ok(())
    }

    fn write_sectors(&mut self, sector: u32, count: u32, buf: &[u8]) -> Result<()> {
        self.state.writes.fetch_add(1, Ordering::Relaxed);
        if self.state.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::new(ErrorKind::Io, "RAM disk write failed"));
        }
        let range = self.byte_range(sector, count, buf.len())?;
        let len = range.len();
        self.storage[range].copy_from_slice(&buf[..len]);
        Ok(())
    }

    fn clear_status(&mut self) -> Result<()> {
        self.state.status_clears.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        self.state.read_only.load(Ordering::Relaxed)
    }
}

impl core::fmt::Debug for RamDisk {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RamDisk")
            .field("sectors", &self.sector_count())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_roundtrip() {
        let mut disk = RamDisk::new(16);
        let data = [0xA5u8; SECTOR_SIZE * 2];
        disk.write_sectors(3, 2, &data).unwrap();

        let mut out = [0u8; SECTOR_SIZE * 2];
        disk.read_sectors(3, 2, &mut out).unwrap();
        assert_eq!(out, data);

        let mut untouched = [0xFFu8; SECTOR_SIZE];
        disk.read_sectors(5, 1, &mut untouched).unwrap();
        assert!(untouched.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_out_of_range() {
        let mut disk = RamDisk::new(4);
        let mut buf = [0u8; SECTOR_SIZE * 2];
        let err = disk.read_sectors(3, 2, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_huge_addresses() {
        let mut disk = RamDisk::new(4);
        let mut buf = [0u8; SECTOR_SIZE];
        let err = disk.read_sectors(0, u32::MAX, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = disk.read_sectors(u32::MAX, 1, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        let err = disk.write_sectors(0x0080_0000, 1, &buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut disk = RamDisk::new(4);
        let mut buf = [0u8; SECTOR_SIZE];
        let err = disk.read_sectors(0, 2, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_failure_injection() {
        let mut disk = RamDisk::new(4);
        let state = disk.state();

        state.set_fail_startup(true);
        assert!(disk.startup().is_err());
        state.set_fail_startup(false);
        assert!(disk.startup().is_ok());
        assert_eq!(state.startups(), 2);

        state.set_fail_writes(true);
        assert!(disk.write_sectors(0, 1, &[0u8; SECTOR_SIZE]).is_err());
        state.set_fail_reads(true);
        assert!(disk.read_sectors(0, 1, &mut [0u8; SECTOR_SIZE]).is_err());
        assert_eq!(state.reads(), 1);
        assert_eq!(state.writes(), 1);

        state.set_inserted(false);
        assert!(!disk.is_inserted());
        state.set_read_only(true);
        assert!(disk.is_read_only());
    }
}
