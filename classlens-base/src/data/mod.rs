pub mod class_cache;
pub mod class_file_loader;
