//! Helpers for building small packages in tests.

use crate::package::Package;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Zip the given `(part name, content)` pairs into package bytes.
pub fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    for (name, content) in parts {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

/// Open an in-memory package made of the given parts.
pub fn package_with(parts: &[(&str, &str)]) -> Package {
    Package::from_bytes(zip_parts(parts)).expect("valid test package")
}
