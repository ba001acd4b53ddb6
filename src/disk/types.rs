//! 磁盘状态与控制码

use crate::consts::{
    CTRL_SYNC, CTRL_TRIM, GET_BLOCK_SIZE, GET_SECTOR_COUNT, GET_SECTOR_SIZE, STA_NODISK,
    STA_NOINIT, STA_PROTECT,
};
use crate::error::{Error, ErrorKind};
use bitflags::bitflags;

bitflags! {
    /// 磁盘状态标志
    ///
    /// 对应 FatFs 的 `DSTATUS`，位值与 `STA_*` 常量一致。
    /// 空集表示驱动器就绪且可写。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DiskStatus: u8 {
        /// 驱动器未初始化（启动失败、未插入或驱动器号无效）
        const NOINIT  = STA_NOINIT;
        /// 没有介质
        const NODISK  = STA_NODISK;
        /// 写保护
        const PROTECT = STA_PROTECT;
    }
}

impl DiskStatus {
    /// 驱动器是否可以读写
    ///
    /// 写保护不影响就绪状态。
    pub fn is_ready(&self) -> bool {
        !self.contains(DiskStatus::NOINIT)
    }
}

/// ioctl 控制命令
///
/// 枚举 FatFs 定义的通用控制码。目前只支持 [`IoctlCommand::Sync`]，
/// 其余命令会被门面层以参数错误拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IoctlCommand {
    /// 同步：清除设备挂起状态与错误状态
    Sync = CTRL_SYNC,
    /// 获取扇区总数
    GetSectorCount = GET_SECTOR_COUNT,
    /// 获取扇区大小
    GetSectorSize = GET_SECTOR_SIZE,
    /// 获取擦除块大小
    GetBlockSize = GET_BLOCK_SIZE,
    /// 通知不再使用的扇区范围
    Trim = CTRL_TRIM,
}

impl TryFrom<u8> for IoctlCommand {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            CTRL_SYNC => Ok(Self::Sync),
            GET_SECTOR_COUNT => Ok(Self::GetSectorCount),
            GET_SECTOR_SIZE => Ok(Self::GetSectorSize),
            GET_BLOCK_SIZE => Ok(Self::GetBlockSize),
            CTRL_TRIM => Ok(Self::Trim),
            _ => Err(Error::new(ErrorKind::InvalidInput, "Unknown control code")),
        }
    }
}
