//! 扇区缓存模块
//!
//! 位于文件系统层与块设备之间的只读扇区缓存，写操作使其失效。
//!
//! # 主要组件
//!
//! - [`CacheEntry`] - 单个槽位，包含一个扇区的数据和元数据
//! - [`SectorCache`] - 缓存管理器，固定槽位 + 时间戳 LRU 驱逐
//! - [`CacheStats`] - 缓存统计信息
//!
//! # 设计原理
//!
//! 1. **容量固定**：槽位数是编译期常量（默认 [`CACHE_SIZE`] = 8），
//!    存储在创建时一次性分配，之后不再分配或释放
//! 2. **全相联**：查找、插入、失效都扫描全部槽位，不建索引
//! 3. **LRU**：每次访问（插入或命中）给槽位打上递增的时间戳，
//!    缓存满时驱逐最旧的槽位
//! 4. **只缓存干净数据**：没有脏块，没有写回；写入与多扇区读取之前
//!    由调用者使相应范围失效
//!
//! # 与 FatFs diskio 缓存的对应关系
//!
//! | diskio.c                | diskio_cache                      |
//! |-------------------------|-----------------------------------|
//! | `CACHE _cache[8]`       | `[CacheEntry; N]`                 |
//! | `accessCounter`         | `SectorCache::counter`（回绕安全）|
//! | `read_from_cache()`     | [`SectorCache::lookup()`]         |
//! | `add_to_cache()`        | [`SectorCache::insert()`]         |
//! | `invalidate_cache()`    | [`SectorCache::invalidate()`]     |
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use diskio_cache::cache::SectorCache;
//!
//! let mut cache: SectorCache = SectorCache::new();
//!
//! let mut buf = [0u8; 512];
//! if !cache.lookup(drive, sector, &mut buf) {
//!     device.read_sectors(sector, 1, &mut buf)?;
//!     cache.insert(drive, sector, &buf);
//! }
//!
//! let stats = cache.stats();
//! println!("Cache: {}/{} used, hit rate {:.2}",
//!          cache.len(), cache.capacity(), stats.hit_rate());
//! ```
//!
//! # 并发
//!
//! 缓存内部无锁。查找会修改时间戳，所以即便只是"读"也需要独占访问；
//! 多线程环境下应把缓存连同门面层放在同一把锁之后（见 `SharedDiskIo`）。
//!
//! [`CACHE_SIZE`]: crate::consts::CACHE_SIZE

mod entry;
mod sector_cache;

pub use entry::CacheEntry;
pub use sector_cache::{CacheStats, SectorCache};
