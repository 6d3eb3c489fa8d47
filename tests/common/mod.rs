#![allow(dead_code, unused_imports)]

use std::path::Path;

pub use assetpipe_test_utils::builders::{
    recorded, ConfigFileBuilder, Recorder, RegistryBuilder,
};
pub use assetpipe_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
