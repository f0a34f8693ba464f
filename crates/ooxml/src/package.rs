//! OOXML package: the zip container holding a document's parts.

use crate::xml::XmlDocument;
use office_core::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One zip entry. Parts that were edited carry their parsed tree.
#[derive(Debug)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
    edited: Option<XmlDocument>,
}

/// An opened OOXML package.
///
/// Entries keep their original order and bytes; only parts handed back
/// through [`Package::store_xml`] are re-serialised on save.
#[derive(Debug)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Open a package from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read every entry of a zip archive.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", index, e)))?;

            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;

            entries.push(Entry {
                is_dir: file.is_dir(),
                name,
                data,
                edited: None,
            });
        }

        log::debug!("Opened package with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Names of all entries, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Parse a part for reading. Edits to the returned tree are not saved.
    pub fn read_xml(&self, name: &str) -> Result<XmlDocument> {
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;

        if let Some(doc) = &entry.edited {
            return Ok(doc.clone());
        }

        let content = std::str::from_utf8(&entry.data)
            .map_err(|e| Error::XmlError(format!("'{}' is not UTF-8: {}", name, e)))?;
        XmlDocument::parse(content)
            .map_err(|e| Error::XmlError(format!("Failed to parse '{}': {}", name, e)))
    }

    /// Raw text of a part, reflecting any stored edits.
    pub fn read_string(&self, name: &str) -> Result<String> {
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;

        let bytes = match &entry.edited {
            Some(doc) => doc.to_bytes()?,
            None => entry.data.clone(),
        };
        String::from_utf8(bytes)
            .map_err(|e| Error::XmlError(format!("'{}' is not UTF-8: {}", name, e)))
    }

    /// Take a part out for editing; hand it back with [`Package::store_xml`].
    ///
    /// The package keeps its current copy, so a part that is never stored
    /// back is saved unchanged.
    pub fn take_xml(&self, name: &str) -> Result<XmlDocument> {
        self.read_xml(name)
    }

    /// Store an edited part; it is serialised when the package is saved.
    pub fn store_xml(&mut self, name: &str, doc: XmlDocument) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.edited = Some(doc),
            None => self.entries.push(Entry {
                name: name.to_string(),
                data: Vec::new(),
                is_dir: false,
                edited: Some(doc),
            }),
        }
    }

    /// Serialise the package into zip bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let zip_err = |e: zip::result::ZipError| Error::ZipError(e.to_string());

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options).map_err(zip_err)?;
                continue;
            }

            zip.start_file(entry.name.as_str(), options).map_err(zip_err)?;
            match &entry.edited {
                Some(doc) => zip.write_all(&doc.to_bytes()?)?,
                None => zip.write_all(&entry.data)?,
            }
        }

        zip.finish().map_err(zip_err)?;
        Ok(())
    }
}
