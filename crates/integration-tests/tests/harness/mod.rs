#![allow(dead_code)]

pub mod config;
pub mod mock_upstream;
pub mod server;

use std::path::Path;

/// Names of the files currently in `dir`
pub fn files_in(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("readable temp dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect()
}
