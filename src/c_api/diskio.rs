//! C API 兼容层 - 磁盘 I/O
//!
//! 提供 FatFs 兼容的函数名与 `DSTATUS`/`DRESULT` 返回码。
//! 所有函数都是 [`DiskIo`] 方法的简单包装。

use crate::device::DriveSelector;
use crate::disk::{DiskIo, IoctlCommand};
use crate::error::{Error, ErrorKind, Result};

/// 磁盘操作结果码
///
/// 对应 FatFs 的 `DRESULT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DResult {
    /// 成功
    Ok = 0,
    /// 读写错误
    Error = 1,
    /// 写保护
    WrPrt = 2,
    /// 未就绪
    NotRdy = 3,
    /// 参数错误
    ParErr = 4,
}

impl From<&Error> for DResult {
    fn from(err: &Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => DResult::ParErr,
            ErrorKind::NotReady => DResult::NotRdy,
            ErrorKind::WriteProtected => DResult::WrPrt,
            _ => DResult::Error,
        }
    }
}

impl From<Result<()>> for DResult {
    fn from(res: Result<()>) -> Self {
        match res {
            Ok(()) => DResult::Ok,
            Err(err) => DResult::from(&err),
        }
    }
}

/// C API: disk_initialize
///
/// 初始化驱动器，返回 `DSTATUS` 位。
/// 内部调用 `DiskIo::initialize`。
pub fn disk_initialize<S: DriveSelector, const N: usize>(io: &mut DiskIo<S, N>, drv: u8) -> u8 {
    io.initialize(drv).bits()
}

/// C API: disk_status
///
/// 查询驱动器状态，返回 `DSTATUS` 位。
/// 内部调用 `DiskIo::status`。
pub fn disk_status<S: DriveSelector, const N: usize>(io: &mut DiskIo<S, N>, drv: u8) -> u8 {
    io.status(drv).bits()
}

/// C API: disk_read
///
/// 读取扇区。
/// 内部调用 `DiskIo::read`。
pub fn disk_read<S: DriveSelector, const N: usize>(
    io: &mut DiskIo<S, N>,
    drv: u8,
    buff: &mut [u8],
    sector: u32,
    count: u32,
) -> DResult {
    io.read(drv, buff, sector, count).into()
}

/// C API: disk_write
///
/// 写入扇区。
/// 内部调用 `DiskIo::write`。
pub fn disk_write<S: DriveSelector, const N: usize>(
    io: &mut DiskIo<S, N>,
    drv: u8,
    buff: &[u8],
    sector: u32,
    count: u32,
) -> DResult {
    io.write(drv, buff, sector, count).into()
}

/// C API: disk_ioctl
///
/// 设备控制。未知控制码返回 `ParErr`。
/// 内部调用 `DiskIo::ioctl`。
pub fn disk_ioctl<S: DriveSelector, const N: usize>(
    io: &mut DiskIo<S, N>,
    drv: u8,
    ctrl: u8,
) -> DResult {
    match IoctlCommand::try_from(ctrl) {
        Ok(command) => io.ioctl(drv, command).into(),
        Err(err) => DResult::from(&err),
    }
}
