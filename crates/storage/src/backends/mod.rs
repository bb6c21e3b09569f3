//! Storage backends for manuscript projects.

pub mod filesystem;

pub use filesystem::FilesystemStorage;
