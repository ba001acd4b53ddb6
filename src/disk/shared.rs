//! 加锁的磁盘 I/O 门面
//!
//! 缓存查找会修改时间戳，驱逐也会改写槽位，所以即便是读操作也必须独占。
//! 这里把 [`DiskIo`] 整体放进一把 `Mutex`，每个入口持锁完成。

use super::{DiskIo, DiskStatus, IoctlCommand};
use crate::consts::CACHE_SIZE;
use crate::device::DriveSelector;
use crate::error::{Error, ErrorKind, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// 可在线程间共享的磁盘 I/O 门面
///
/// ```rust,ignore
/// let io = SharedDiskIo::new(DiskIo::with_default_cache(drives));
/// let worker = io.clone();
/// std::thread::spawn(move || {
///     let mut buf = [0u8; 512];
///     worker.read(DRIVE_SD, &mut buf, 0, 1)
/// });
/// ```
pub struct SharedDiskIo<S: DriveSelector, const N: usize = CACHE_SIZE> {
    inner: Arc<Mutex<DiskIo<S, N>>>,
}

impl<S: DriveSelector, const N: usize> Clone for SharedDiskIo<S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DriveSelector, const N: usize> SharedDiskIo<S, N> {
    /// 包装门面
    pub fn new(io: DiskIo<S, N>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(io)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, DiskIo<S, N>>> {
        self.inner
            .lock()
            .map_err(|_| Error::new(ErrorKind::Io, "Failed to acquire disk I/O lock"))
    }

    /// 初始化驱动器，见 [`DiskIo::initialize`]
    pub fn initialize(&self, drive: u8) -> DiskStatus {
        match self.lock() {
            Ok(mut io) => io.initialize(drive),
            Err(_) => DiskStatus::NOINIT,
        }
    }

    /// 查询驱动器状态，见 [`DiskIo::status`]
    pub fn status(&self, drive: u8) -> DiskStatus {
        match self.lock() {
            Ok(mut io) => io.status(drive),
            Err(_) => DiskStatus::NOINIT,
        }
    }

    /// 读取扇区，见 [`DiskIo::read`]
    pub fn read(&self, drive: u8, buf: &mut [u8], sector: u32, count: u32) -> Result<()> {
        self.lock()?.read(drive, buf, sector, count)
    }

    /// 写入扇区，见 [`DiskIo::write`]
    pub fn write(&self, drive: u8, buf: &[u8], sector: u32, count: u32) -> Result<()> {
        self.lock()?.write(drive, buf, sector, count)
    }

    /// 设备控制，见 [`DiskIo::ioctl`]
    pub fn ioctl(&self, drive: u8, command: IoctlCommand) -> Result<()> {
        self.lock()?.ioctl(drive, command)
    }

    /// 在锁内对门面执行任意操作
    pub fn with<R>(&self, f: impl FnOnce(&mut DiskIo<S, N>) -> R) -> Result<R> {
        let mut io = self.lock()?;
        Ok(f(&mut io))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SECTOR_SIZE;
    use crate::device::{DriveTable, RamDisk};
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn test_shared_concurrent_access() {
        let disk = RamDisk::new(64);
        let state = disk.state();
        let io = SharedDiskIo::new(DiskIo::with_default_cache(
            DriveTable::new().with_drive(disk),
        ));
        assert!(io.status(0).is_ready());

        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let io = io.clone();
                thread::spawn(move || {
                    let sector = t as u32;
                    let data = [t; SECTOR_SIZE];
                    let mut buf = [0u8; SECTOR_SIZE];
                    for _ in 0..50 {
                        io.write(0, &data, sector, 1).unwrap();
                        io.read(0, &mut buf, sector, 1).unwrap();
                        assert_eq!(buf, data);
                        io.read(0, &mut buf, sector, 1).unwrap();
                        assert_eq!(buf, data);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.startups(), 1);
        let (len, hits) = io
            .with(|io| (io.cache().len(), io.cache_stats().hits))
            .unwrap();
        assert_eq!(len, 4);
        // 每轮写后第一次读未命中，第二次命中
        assert_eq!(hits, 200);
    }
}
