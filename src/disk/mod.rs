//! 磁盘 I/O 门面
//!
//! 位于文件系统层与扇区设备之间，提供 status/read/write/ioctl 四个入口。
//!
//! disk/io.rs 是门面本体 [`DiskIo`]，围绕设备调用做缓存查找、填充与失效。
//! disk/types.rs 定义磁盘状态位 [`DiskStatus`] 与控制命令 [`IoctlCommand`]。
//! disk/shared.rs（`std` 特性）提供加锁的 [`SharedDiskIo`]，
//! 整个门面连同缓存放在同一把互斥锁之后。

mod io;
#[cfg(feature = "std")]
mod shared;
mod types;

pub use io::DiskIo;
#[cfg(feature = "std")]
pub use shared::SharedDiskIo;
pub use types::{DiskStatus, IoctlCommand};
