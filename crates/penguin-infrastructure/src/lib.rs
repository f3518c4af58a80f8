pub mod async_dir_share_repository;
pub mod config_service;
pub mod dto;
pub mod memory_share_repository;
pub mod paths;
pub mod storage;

pub use crate::async_dir_share_repository::AsyncDirShareRepository;
pub use crate::config_service::ConfigService;
pub use crate::memory_share_repository::MemoryShareRepository;
