//! 扇区设备抽象
//!
//! 提供物理块设备接口以及驱动器号到设备的解析。
//!
//! device/mod.rs 定义 [`SectorDevice`] 与 [`DriveSelector`] 两个能力接口，
//! 缓存与门面层只依赖这两个接口，不关心具体硬件后端。
//! device/table.rs 提供基于 `Vec` 的驱动器表，device/ram.rs 提供内存盘。

mod ram;
mod table;

pub use ram::{RamDisk, RamDiskState};
pub use table::DriveTable;

use crate::error::Result;
use alloc::boxed::Box;

/// 扇区设备接口
///
/// 每个物理后端（闪存卡、SD 卡、内存盘……）各自实现此 trait。
/// 所有地址均以 512 字节扇区为单位。
///
/// # 示例
///
/// ```rust,ignore
/// use diskio_cache::{SectorDevice, Result};
///
/// struct MyCard {
///     // ...
/// }
///
/// impl SectorDevice for MyCard {
///     fn startup(&mut self) -> Result<()> {
///         // 上电、握手
///         Ok(())
///     }
///
///     fn is_inserted(&self) -> bool {
///         true
///     }
///
///     fn read_sectors(&mut self, sector: u32, count: u32, buf: &mut [u8]) -> Result<()> {
///         // 实现扇区读取
///         Ok(())
///     }
///
///     fn write_sectors(&mut self, sector: u32, count: u32, buf: &[u8]) -> Result<()> {
///         // 实现扇区写入
///         Ok(())
///     }
/// }
/// ```
pub trait SectorDevice: Send {
    /// 启动设备
    ///
    /// 由门面层在首次 `initialize`/`status` 时调用，成功后不再调用。
    /// 启动失败时，之后每次 `initialize`/`status` 都会再次调用，
    /// 实现必须允许在失败后重复调用。
    fn startup(&mut self) -> Result<()>;

    /// 介质是否已插入
    fn is_inserted(&self) -> bool;

    /// 读取扇区
    ///
    /// # 参数
    ///
    /// * `sector` - 起始扇区地址（LBA）
    /// * `count` - 要读取的扇区数
    /// * `buf` - 目标缓冲区（大小至少为 count * 512）
    fn read_sectors(&mut self, sector: u32, count: u32, buf: &mut [u8]) -> Result<()>;

    /// 写入扇区
    ///
    /// # 参数
    ///
    /// * `sector` - 起始扇区地址（LBA）
    /// * `count` - 要写入的扇区数
    /// * `buf` - 源缓冲区（大小至少为 count * 512）
    fn write_sectors(&mut self, sector: u32, count: u32, buf: &[u8]) -> Result<()>;

    /// 清除设备的挂起状态与错误状态
    ///
    /// 对应 ioctl 同步命令。默认实现什么都不做。
    fn clear_status(&mut self) -> Result<()> {
        Ok(())
    }

    /// 是否只读
    fn is_read_only(&self) -> bool {
        false
    }
}

/// 驱动器选择器
///
/// 把逻辑驱动器号解析为一个 [`SectorDevice`]。
/// 门面层对每个驱动器最多调用一次 [`resolve`](DriveSelector::resolve)，
/// 之后一直持有返回的设备句柄。
pub trait DriveSelector {
    /// 驱动器数量，合法驱动器号为 `0..drive_count()`
    fn drive_count(&self) -> u8;

    /// 解析驱动器号
    ///
    /// 返回 `None` 表示该驱动器没有可用后端。
    fn resolve(&mut self, drive: u8) -> Option<Box<dyn SectorDevice>>;
}
