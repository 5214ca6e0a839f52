mod file_storage;
mod user_service;

pub use file_storage::FileStorageService;
pub use user_service::UserService;

use crate::config::StorageConfig;
use crate::repositories::Repositories;

/// Aggregates all service instances for dependency injection into handlers.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub files: FileStorageService,
}

impl Services {
    pub fn new(repos: Repositories, storage: &StorageConfig) -> Self {
        Self {
            users: UserService::new(repos.users),
            files: FileStorageService::new(&storage.upload_dir, storage.max_upload_size),
        }
    }
}
