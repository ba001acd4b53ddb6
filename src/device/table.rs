//! 驱动器表

use super::{DriveSelector, SectorDevice};
use crate::error::{Error, ErrorKind, Result};
use alloc::boxed::Box;
use alloc::vec::Vec;

/// 基于 `Vec` 的驱动器选择器
///
/// 驱动器号即设备在表中的下标。设备句柄在首次解析时被移交给门面层。
///
/// ```rust,ignore
/// let table = DriveTable::new()
///     .with_drive(flash_card)   // DRIVE_FC
///     .with_drive(sd_card);     // DRIVE_SD
/// let mut io = DiskIo::with_default_cache(table);
/// ```
#[derive(Default)]
pub struct DriveTable {
    devices: Vec<Option<Box<dyn SectorDevice>>>,
}

impl DriveTable {
    /// 创建空驱动器表
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个驱动器（builder 风格）
    ///
    /// 表已满时丢弃该设备并记录警告。
    pub fn with_drive<D: SectorDevice + 'static>(mut self, device: D) -> Self {
        if let Err(e) = self.push(Box::new(device)) {
            log::warn!("[DISKIO] Drive dropped: {}", e);
        }
        self
    }

    /// 追加一个驱动器，返回分配到的驱动器号
    ///
    /// # 返回
    ///
    /// 表中已有 `u8::MAX` 个驱动器时返回 `InvalidInput`
    pub fn push(&mut self, device: Box<dyn SectorDevice>) -> Result<u8> {
        self.push_slot(Some(device))
    }

    /// 预留一个没有后端的驱动器号
    pub fn push_empty(&mut self) -> Result<u8> {
        self.push_slot(None)
    }

    // 驱动器号必须落在 `0..drive_count()` 内，而 `drive_count` 是 u8
    fn push_slot(&mut self, slot: Option<Box<dyn SectorDevice>>) -> Result<u8> {
        let drive = self.devices.len();
        if drive >= u8::MAX as usize {
            return Err(Error::new(ErrorKind::InvalidInput, "Drive table full"));
        }
        self.devices.push(slot);
        Ok(drive as u8)
    }
}

impl DriveSelector for DriveTable {
    fn drive_count(&self) -> u8 {
        self.devices.len() as u8
    }

    fn resolve(&mut self, drive: u8) -> Option<Box<dyn SectorDevice>> {
        self.devices.get_mut(drive as usize)?.take()
    }
}

impl core::fmt::Debug for DriveTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DriveTable")
            .field("drives", &self.devices.len())
            .field(
                "unresolved",
                &self.devices.iter().filter(|d| d.is_some()).count(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RamDisk;

    #[test]
    fn test_resolve_once() {
        let mut table = DriveTable::new().with_drive(RamDisk::new(4));
        assert_eq!(table.drive_count(), 1);

        assert!(table.resolve(0).is_some());
        // 句柄已移交
        assert!(table.resolve(0).is_none());
        assert!(table.resolve(1).is_none());
    }

    #[test]
    fn test_empty_slot() {
        let mut table = DriveTable::new();
        assert_eq!(table.push_empty().unwrap(), 0);
        assert_eq!(table.push(Box::new(RamDisk::new(4))).unwrap(), 1);
        assert_eq!(table.drive_count(), 2);
        assert!(table.resolve(0).is_none());
        assert!(table.resolve(1).is_some());
    }

    #[test]
    fn test_full_table_rejects_push() {
        let mut table = DriveTable::new();
        for expected in 0..u8::MAX {
            assert_eq!(table.push_empty().unwrap(), expected);
        }
        assert_eq!(table.drive_count(), u8::MAX);

        let err = table.push(Box::new(RamDisk::new(1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(table.push_empty().is_err());

        let mut table = table.with_drive(RamDisk::new(1));
        assert_eq!(table.drive_count(), u8::MAX);
        assert!(table.resolve(u8::MAX - 1).is_none());
    }
}
