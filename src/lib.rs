//! diskio_cache: 写失效的扇区读缓存与磁盘 I/O 门面
//!
//! 位于文件系统层与一个或多个扇区寻址设备之间，提供：
//! - **固定容量**的全相联扇区缓存（默认 8 个 512 字节槽位，LRU 驱逐）
//! - **写穿**：写入与多扇区读取之前使相应范围失效，绝不返回过期数据
//! - **按需初始化**的多驱动器 status/read/write/ioctl 门面
//! - **可选的 C API 兼容层**（FatFs `diskio.h` 风格）
//!
//! # 示例
//!
//! ```rust,ignore
//! use diskio_cache::{DiskIo, DriveTable, RamDisk, Result, consts::DRIVE_FC};
//!
//! fn main() -> Result<()> {
//!     let drives = DriveTable::new()
//!         .with_drive(RamDisk::new(2048));
//!     let mut io = DiskIo::with_default_cache(drives);
//!
//!     if !io.initialize(DRIVE_FC).is_ready() {
//!         // 设备未就绪
//!     }
//!
//!     // 单扇区读取会经过缓存
//!     let mut buf = [0u8; 512];
//!     io.read(DRIVE_FC, &mut buf, 0, 1)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`consts`] - 常量定义
//! - [`device`] - 扇区设备抽象与驱动器选择
//! - [`cache`] - 扇区缓存
//! - [`disk`] - 磁盘 I/O 门面
//! - `c_api` - C API 兼容层（可选）

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 常量定义
pub mod consts;

/// 扇区设备抽象
pub mod device;

/// 扇区缓存
pub mod cache;

/// 磁盘 I/O 门面
pub mod disk;

// ===== C API 兼容层（可选）=====

/// C API 兼容层
///
/// 提供与 FatFs diskio 兼容的函数接口。
#[cfg(feature = "c-api")]
pub mod c_api;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 设备
pub use device::{DriveSelector, DriveTable, RamDisk, RamDiskState, SectorDevice};

// Cache
pub use cache::{CacheEntry, CacheStats, SectorCache};

// 门面
pub use disk::{DiskIo, DiskStatus, IoctlCommand};
#[cfg(feature = "std")]
pub use disk::SharedDiskIo;

// 常量
pub use consts::{CACHE_SIZE, SECTOR_SIZE};

// C API（当启用时）
#[cfg(feature = "c-api")]
pub use c_api::diskio::{
    disk_initialize, disk_ioctl, disk_read, disk_status, disk_write, DResult,
};
