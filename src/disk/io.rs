//! 磁盘 I/O 门面实现

use super::types::{DiskStatus, IoctlCommand};
use crate::cache::{CacheStats, SectorCache};
use crate::consts::{SectorBuf, CACHE_SIZE, SECTOR_SIZE};
use crate::device::{DriveSelector, SectorDevice};
use crate::error::{Error, ErrorKind, Result};
use alloc::boxed::Box;
use alloc::vec::Vec;

/// 单个驱动器的状态
#[derive(Default)]
struct DriveSlot {
    /// 设备句柄，首次初始化时从选择器取得
    device: Option<Box<dyn SectorDevice>>,
    /// 是否已向选择器解析过
    resolved: bool,
    /// `startup` 是否已成功
    started: bool,
}

/// 取已启动的设备
fn ready_device(drives: &mut [DriveSlot], drive: u8) -> Result<&mut (dyn SectorDevice + 'static)> {
    let slot = drives
        .get_mut(drive as usize)
        .ok_or(Error::new(ErrorKind::InvalidInput, "Unknown drive number"))?;
    match slot.device.as_deref_mut() {
        Some(device) if slot.started => Ok(device),
        _ => Err(Error::new(ErrorKind::NotReady, "Drive not initialized")),
    }
}

/// 检查扇区数与缓冲区大小
fn check_transfer(buf_len: usize, count: u32) -> Result<()> {
    if count == 0 {
        return Err(Error::new(ErrorKind::InvalidInput, "Sector count must be non-zero"));
    }
    let len = (count as usize)
        .checked_mul(SECTOR_SIZE)
        .ok_or(Error::new(ErrorKind::InvalidInput, "Sector count too large"))?;
    if buf_len < len {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Buffer too small for requested sectors",
        ));
    }
    Ok(())
}

/// 设备错误统一归为 I/O 错误，保留设备给出的消息
fn device_error(err: Error) -> Error {
    Error::new(ErrorKind::Io, err.message())
}

/// 磁盘 I/O 门面
///
/// 为多个物理驱动器提供统一的 status/read/write/ioctl 接口，
/// 并用 [`SectorCache`] 加速单扇区读取。
///
/// # 缓存策略
///
/// - 单扇区读：先查缓存；未命中则读设备，成功后填充缓存
/// - 多扇区读：先使 `[sector, sector+count)` 失效，再直接读设备，不填充缓存
/// - 写：先使 `[sector, sector+count)` 失效，再直接写设备（写穿）
///
/// # 并发使用
///
/// DiskIo 本身不包含内部锁，在单线程环境中可以直接使用。
/// 多线程环境下整个门面（连同缓存）必须放在同一把锁之后：
///
/// ```rust,ignore
/// // 单线程
/// let mut io = DiskIo::with_default_cache(drives);
///
/// // 多线程（需要 `std` 特性）
/// let io = SharedDiskIo::new(DiskIo::with_default_cache(drives));
/// ```
pub struct DiskIo<S: DriveSelector, const N: usize = CACHE_SIZE> {
    /// 驱动器选择器
    selector: S,
    /// 按驱动器号索引的驱动器状态
    drives: Vec<DriveSlot>,
    /// 扇区缓存
    cache: SectorCache<N>,
    /// 逻辑读取次数（包括缓存命中）
    read_count: u64,
    /// 逻辑写入次数
    write_count: u64,
    /// 物理读取次数（实际设备操作）
    physical_read_count: u64,
    /// 物理写入次数（实际设备操作）
    physical_write_count: u64,
}

impl<S: DriveSelector> DiskIo<S> {
    /// 创建使用默认缓存大小的门面
    ///
    /// 使用 `CACHE_SIZE` (8 个扇区) 作为缓存大小
    pub fn with_default_cache(selector: S) -> Self {
        Self::new(selector, SectorCache::new())
    }
}

impl<S: DriveSelector, const N: usize> DiskIo<S, N> {
    /// 创建门面
    ///
    /// # 参数
    ///
    /// * `selector` - 驱动器选择器
    /// * `cache` - 扇区缓存
    pub fn new(selector: S, cache: SectorCache<N>) -> Self {
        let drives = (0..selector.drive_count())
            .map(|_| DriveSlot::default())
            .collect();
        Self {
            selector,
            drives,
            cache,
            read_count: 0,
            write_count: 0,
            physical_read_count: 0,
            physical_write_count: 0,
        }
    }

    /// 初始化驱动器
    ///
    /// 对应 FatFs 的 `disk_initialize`。
    ///
    /// 首次调用时向选择器解析设备句柄并调用 `startup`；`startup` 成功后
    /// 不再重复调用，之后只查询插入状态。启动失败时句柄保留，
    /// 下一次调用会重新尝试 `startup`。
    ///
    /// # 返回
    ///
    /// - 空集：就绪
    /// - `NOINIT`：驱动器号无效、没有后端或启动失败
    /// - `NOINIT | NODISK`：介质未插入
    /// - `PROTECT`：介质写保护（仍然就绪）
    pub fn initialize(&mut self, drive: u8) -> DiskStatus {
        let Some(slot) = self.drives.get_mut(drive as usize) else {
            log::warn!("[DISKIO] status: unknown drive {}", drive);
            return DiskStatus::NOINIT;
        };

        if !slot.resolved {
            slot.resolved = true;
            slot.device = self.selector.resolve(drive);
            if slot.device.is_none() {
                log::warn!("[DISKIO] drive {} has no backing device", drive);
            }
        }

        let Some(device) = slot.device.as_deref_mut() else {
            return DiskStatus::NOINIT;
        };

        if !slot.started {
            if let Err(err) = device.startup() {
                log::warn!("[DISKIO] drive {} startup failed: {}", drive, err);
                return DiskStatus::NOINIT;
            }
            slot.started = true;
            log::debug!("[DISKIO] drive {} started", drive);
        }

        let mut status = DiskStatus::empty();
        if !device.is_inserted() {
            status |= DiskStatus::NOINIT | DiskStatus::NODISK;
        }
        if device.is_read_only() {
            status |= DiskStatus::PROTECT;
        }

        if status.contains(DiskStatus::NODISK) {
            // 介质可能被更换，丢弃该驱动器的缓存
            self.cache.invalidate_drive(drive);
        }
        status
    }

    /// 查询驱动器状态
    ///
    /// 与 [`initialize`](Self::initialize) 相同：按需初始化设备，且每个驱动器
    /// 只成功初始化一次。未初始化、启动失败与未插入对调用者都表现为未就绪。
    pub fn status(&mut self, drive: u8) -> DiskStatus {
        self.initialize(drive)
    }

    /// 读取扇区
    ///
    /// 对应 FatFs 的 `disk_read`。
    ///
    /// # 参数
    ///
    /// * `drive` - 驱动器号
    /// * `buf` - 目标缓冲区（大小至少为 count * 512）
    /// * `sector` - 起始扇区地址（LBA）
    /// * `count` - 扇区数
    ///
    /// # 错误
    ///
    /// - `InvalidInput`：驱动器号无效、`count == 0` 或缓冲区过小
    /// - `NotReady`：驱动器未成功初始化
    /// - `Io`：设备读取失败（不重试）
    pub fn read(&mut self, drive: u8, buf: &mut [u8], sector: u32, count: u32) -> Result<()> {
        let device = ready_device(&mut self.drives, drive)?;
        check_transfer(buf.len(), count)?;

        self.read_count += 1;

        if count == 1 {
            let dst: &mut SectorBuf = (&mut buf[..SECTOR_SIZE])
                .try_into()
                .map_err(|_| Error::new(ErrorKind::InvalidInput, "Buffer too small for sector"))?;

            if self.cache.lookup(drive, sector, dst) {
                return Ok(());
            }

            self.physical_read_count += 1;
            device.read_sectors(sector, 1, &mut dst[..]).map_err(|err| {
                log::warn!("[DISKIO] read drive={} sector={:#x} failed: {}", drive, sector, err);
                device_error(err)
            })?;
            self.cache.insert(drive, sector, dst);
            return Ok(());
        }

        // 多扇区读取绕过缓存，范围内的旧条目不能留下
        self.cache.invalidate(drive, sector, count);
        self.physical_read_count += 1;
        device.read_sectors(sector, count, buf).map_err(|err| {
            log::warn!(
                "[DISKIO] read drive={} sector={:#x} count={} failed: {}",
                drive,
                sector,
                count,
                err
            );
            device_error(err)
        })
    }

    /// 写入扇区
    ///
    /// 对应 FatFs 的 `disk_write`。总是先使 `[sector, sector+count)` 失效，
    /// 再直接写入设备。写入失败时范围保持失效状态。
    ///
    /// # 错误
    ///
    /// - `InvalidInput`：驱动器号无效、`count == 0` 或缓冲区过小
    /// - `NotReady`：驱动器未成功初始化
    /// - `WriteProtected`：介质写保护
    /// - `Io`：设备写入失败（不重试）
    pub fn write(&mut self, drive: u8, buf: &[u8], sector: u32, count: u32) -> Result<()> {
        let device = ready_device(&mut self.drives, drive)?;
        check_transfer(buf.len(), count)?;

        self.write_count += 1;
        self.cache.invalidate(drive, sector, count);

        if device.is_read_only() {
            log::warn!("[DISKIO] write to write-protected drive {}", drive);
            return Err(Error::new(ErrorKind::WriteProtected, "Medium is write protected"));
        }

        self.physical_write_count += 1;
        device.write_sectors(sector, count, buf).map_err(|err| {
            log::warn!(
                "[DISKIO] write drive={} sector={:#x} count={} failed: {}",
                drive,
                sector,
                count,
                err
            );
            device_error(err)
        })
    }

    /// 设备控制
    ///
    /// 对应 FatFs 的 `disk_ioctl`。只支持 [`IoctlCommand::Sync`]，
    /// 它让设备清除挂起状态与错误状态；不涉及缓存（缓存没有需要写回的数据）。
    ///
    /// # 错误
    ///
    /// - `InvalidInput`：驱动器号无效或不支持的控制命令
    /// - `NotReady`：驱动器未成功初始化
    /// - `Io`：设备清除状态失败
    pub fn ioctl(&mut self, drive: u8, command: IoctlCommand) -> Result<()> {
        if drive as usize >= self.drives.len() {
            log::warn!("[DISKIO] ioctl: unknown drive {}", drive);
            return Err(Error::new(ErrorKind::InvalidInput, "Unknown drive number"));
        }
        if command != IoctlCommand::Sync {
            log::warn!("[DISKIO] ioctl: unsupported command {:?} on drive {}", command, drive);
            return Err(Error::new(ErrorKind::InvalidInput, "Unsupported control code"));
        }

        let device = ready_device(&mut self.drives, drive)?;
        device.clear_status().map_err(device_error)
    }

    // ===== 访问器 =====

    /// 获取驱动器选择器的引用
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// 驱动器数量
    pub fn drive_count(&self) -> u8 {
        self.drives.len() as u8
    }

    /// 驱动器是否已成功初始化
    pub fn is_initialized(&self, drive: u8) -> bool {
        self.drives
            .get(drive as usize)
            .map(|slot| slot.started)
            .unwrap_or(false)
    }

    /// 获取扇区缓存的引用
    pub fn cache(&self) -> &SectorCache<N> {
        &self.cache
    }

    /// 获取缓存统计信息
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 获取逻辑读取次数（包括缓存命中）
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// 获取逻辑写入次数
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// 获取物理读取次数（实际设备操作）
    pub fn physical_read_count(&self) -> u64 {
        self.physical_read_count
    }

    /// 获取物理写入次数（实际设备操作）
    pub fn physical_write_count(&self) -> u64 {
        self.physical_write_count
    }

    /// 获取缓存命中率
    ///
    /// 返回 0.0 到 1.0 之间的值，表示不需要访问设备的读取所占比例
    pub fn cache_hit_rate(&self) -> f64 {
        if self.read_count == 0 {
            return 0.0;
        }
        let hits = self.read_count.saturating_sub(self.physical_read_count);
        hits as f64 / self.read_count as f64
    }
}

impl<S: DriveSelector, const N: usize> core::fmt::Debug for DiskIo<S, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DiskIo")
            .field("drives", &self.drives.len())
            .field("cache", &self.cache)
            .field("read_count", &self.read_count)
            .field("write_count", &self.write_count)
            .field("physical_read_count", &self.physical_read_count)
            .field("physical_write_count", &self.physical_write_count)
            .finish()
    }
}
