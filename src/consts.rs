//! 常量定义
//!
//! 这个模块包含磁盘 I/O 层的所有常量定义，包括：
//! - 扇区与缓存尺寸
//! - 物理驱动器编号
//! - 磁盘状态位与控制码（与 FatFs `diskio.h` 数值一致）

//=============================================================================
// 基础常量
//=============================================================================

/// 扇区大小（字节），固定值，不可配置
pub const SECTOR_SIZE: usize = 512;

/// 扇区缓存槽位数量
pub const CACHE_SIZE: usize = 8;

/// 单个扇区的数据
pub type SectorBuf = [u8; SECTOR_SIZE];

//=============================================================================
// 物理驱动器编号
//=============================================================================

/// 闪存卡驱动器（DLDI 接口）
pub const DRIVE_FC: u8 = 0;

/// SD 卡驱动器
pub const DRIVE_SD: u8 = 1;

/// 参考系统中的驱动器数量
pub const DRIVE_COUNT: u8 = 2;

//=============================================================================
// 磁盘状态位（DSTATUS）
//=============================================================================

/// 驱动器未初始化
pub const STA_NOINIT: u8 = 0x01;

/// 驱动器中没有介质
pub const STA_NODISK: u8 = 0x02;

/// 介质写保护
pub const STA_PROTECT: u8 = 0x04;

//=============================================================================
// ioctl 控制码
//=============================================================================

/// 同步：完成挂起的写操作并清除设备状态
pub const CTRL_SYNC: u8 = 0;

/// 获取介质扇区总数
pub const GET_SECTOR_COUNT: u8 = 1;

/// 获取扇区大小
pub const GET_SECTOR_SIZE: u8 = 2;

/// 获取擦除块大小
pub const GET_BLOCK_SIZE: u8 = 3;

/// 通知设备某扇区范围不再使用
pub const CTRL_TRIM: u8 = 4;
