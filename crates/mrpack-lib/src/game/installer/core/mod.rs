pub mod batch;
pub mod downloader;
pub mod modpack_installer;
pub mod packager;
pub mod traits;
