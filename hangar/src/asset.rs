use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::File,
    io::{Error as IoError, ErrorKind as IoErrorKind, Read},
    path::{Path, PathBuf},
};

use crate::Font;

pub type BufReader = std::io::BufReader<File>;
pub type BufWriter = std::io::BufWriter<File>;

pub const FONTS_DIR: &str = "assets/fonts";
pub const TEXTURES_DIR: &str = "assets/textures";
pub const DEFAULT_FONT: &str = "Pennsylvania.otf";
pub const DEFAULT_TEXTURE: &str = "Default_texture.png";

// Debug: expect working dir to be cargo project, so look for assets relative to that
#[cfg(debug_assertions)]
pub fn base_path() -> PathBuf {
    PathBuf::new()
}

// Release: always look for assets relative to the executable
#[cfg(not(debug_assertions))]
pub fn base_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_owned))
        .unwrap_or_default()
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Access {
    Read,
    Write,
}

#[derive(Debug)]
pub enum ErrorKind {
    Io(IoError),
    Format(String),
    Other(String),
}

#[derive(Debug)]
pub struct AssetError {
    path: PathBuf,
    access: Access,
    kind: ErrorKind,
}

impl AssetError {
    pub fn new(path: PathBuf, access: Access, kind: ErrorKind) -> Self {
        AssetError { path, access, kind }
    }
    fn io(path: &Path, access: Access, error: IoError) -> Self {
        Self::new(path.to_owned(), access, ErrorKind::Io(error))
    }
    fn yaml(path: &Path, access: Access, error: serde_yml::Error) -> Self {
        Self::new(path.to_owned(), access, ErrorKind::Format(error.to_string()))
    }
    fn png(path: &Path, error: png::DecodingError) -> Self {
        let kind = match error {
            png::DecodingError::IoError(error) => ErrorKind::Io(error),
            png::DecodingError::Format(error) => ErrorKind::Format(error.to_string()),
            error => ErrorKind::Other(error.to_string()),
        };
        Self::new(path.to_owned(), Access::Read, kind)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
    pub fn not_found(&self) -> bool {
        matches!(&self.kind, ErrorKind::Io(error) if error.kind() == IoErrorKind::NotFound)
    }
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let access = match self.access {
            Access::Read => "reading",
            Access::Write => "writing",
        };
        write!(f, "Error {} {}: ", access, self.path.to_string_lossy())?;
        match &self.kind {
            // NotFound while writing means a parent directory is missing
            ErrorKind::Io(error)
                if self.access == Access::Write && error.kind() == IoErrorKind::NotFound =>
            {
                write!(f, "The parent directory does not exist.")?;
                if let Some(code) = error.raw_os_error() {
                    write!(f, " (os error {code})")?;
                }
                Ok(())
            }
            ErrorKind::Io(error) => write!(f, "{error}"),
            ErrorKind::Format(info) | ErrorKind::Other(info) => write!(f, "{info}"),
        }
    }
}

impl std::error::Error for AssetError {}

pub type Result<T> = std::result::Result<T, AssetError>;

pub fn get_path(prefix: &str, asset_path: &str) -> PathBuf {
    let mut file_path = base_path();
    file_path.push(prefix);
    file_path.push(asset_path);
    file_path
}
pub fn open_reader(path: &Path) -> Result<BufReader> {
    log::debug!("Reading {}", path.to_string_lossy());
    let file = File::open(path).map_err(|e| AssetError::io(path, Access::Read, e))?;
    Ok(BufReader::new(file))
}
pub fn open_writer(path: &Path) -> Result<BufWriter> {
    log::debug!("Writing {}", path.to_string_lossy());
    let file = File::create(path).map_err(|e| AssetError::io(path, Access::Write, e))?;
    Ok(BufWriter::new(file))
}

pub fn create_dir(dir: &str) -> Result<()> {
    let mut dir_path = base_path();
    dir_path.push(dir);
    if !dir_path.exists() {
        log::info!("Creating directory {}", dir_path.to_string_lossy());
        std::fs::create_dir_all(&dir_path)
            .map_err(|e| AssetError::io(&dir_path, Access::Write, e))?;
    }
    Ok(())
}

pub fn load_yaml_file<T>(prefix: &str, file: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let path = get_path(prefix, file);
    let reader = open_reader(&path)?;
    serde_yml::from_reader(reader).map_err(|e| AssetError::yaml(&path, Access::Read, e))
}
pub fn load_yaml_file_or_default<T>(prefix: &str, file: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let path = get_path(prefix, file);
    if path.exists() {
        let reader = open_reader(&path)?;
        serde_yml::from_reader(reader).map_err(|e| AssetError::yaml(&path, Access::Read, e))
    } else {
        log::info!(
            "{} does not exist, using defaults instead",
            path.to_string_lossy()
        );
        Ok(Default::default())
    }
}
pub fn save_yaml_file<T>(prefix: &str, file: &str, value: &T) -> Result<()>
where
    T: Serialize,
{
    let path = get_path(prefix, file);
    let writer = open_writer(&path)?;
    serde_yml::to_writer(writer, value).map_err(|e| AssetError::yaml(&path, Access::Write, e))
}

/// Decoded image, 8 bits per channel RGBA.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Pixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Widens 8 bit png samples to RGBA. Indexed images must already be expanded.
fn to_rgba8(color_type: png::ColorType, samples: &[u8]) -> Option<Vec<u8>> {
    let rgba = match color_type {
        png::ColorType::Rgba => samples.to_vec(),
        png::ColorType::Rgb => samples
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => samples
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => samples.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => return None,
    };
    Some(rgba)
}

pub fn load_png_file(prefix: &str, file: &str) -> Result<Pixels> {
    let path = get_path(prefix, file);
    let reader = open_reader(&path)?;
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut image_reader = decoder
        .read_info()
        .map_err(|e| AssetError::png(&path, e))?;
    let mut buffer = vec![0; image_reader.output_buffer_size()];
    let info = image_reader
        .next_frame(&mut buffer)
        .map_err(|e| AssetError::png(&path, e))?;
    buffer.truncate(info.buffer_size());
    let rgba = to_rgba8(info.color_type, &buffer).ok_or_else(|| {
        AssetError::new(
            path.clone(),
            Access::Read,
            ErrorKind::Format(format!("unsupported color type {:?}", info.color_type)),
        )
    })?;
    Ok(Pixels {
        width: info.width,
        height: info.height,
        rgba,
    })
}

pub fn load_font_file(prefix: &str, file: &str) -> Result<Font> {
    let path = get_path(prefix, file);
    let mut reader = open_reader(&path)?;
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| AssetError::io(&path, Access::Read, e))?;
    Font::try_from_vec(buf).map_err(|_| {
        AssetError::new(path, Access::Read, ErrorKind::Format("Invalid font".to_string()))
    })
}
