//! Loading of program images, either raw from disk or out of a zip archive of roms.
use std::{
    fs,
    io::{self, prelude::*, Cursor},
    path::Path,
};
use zip::{read::ZipArchive, result::ZipResult};

/// Represents an archive of roms
/// it contains all kind of information about the information of the archives
pub struct RomArchives<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl RomArchives<Cursor<Vec<u8>>> {
    /// Will read the whole archive at the given path into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> ZipResult<Self> {
        let data = fs::read(path)?;
        Self::new(Cursor::new(data))
    }
}

impl<R: Read + Seek> RomArchives<R> {
    /// Will generate a new rom archive object based of the given reader
    pub fn new(reader: R) -> ZipResult<Self> {
        Ok(RomArchives {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Will return all the rom names available to be chosen
    pub fn file_names(&self) -> Vec<&'_ str> {
        let mut names: Vec<_> = self.archive.file_names().collect();
        names.sort_unstable();
        names
    }

    /// Will decompress the information from the zip archive
    pub fn get_file_data(&mut self, name: &str) -> ZipResult<Rom> {
        let mut file = self.archive.by_name(name)?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Rom::new(name, data))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program image, it is loaded verbatim
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Will read a raw image from disk, the file name is used as the rom name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let name = path
            .file_stem()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("loaded rom {} with {} bytes", name, data.len());
        Ok(Rom::new(&name, data))
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
