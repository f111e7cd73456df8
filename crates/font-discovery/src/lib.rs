//! # font-discovery
//!
//! Find a usable TrueType/OpenType font on the local machine and measure text
//! with it, so a PDF writer can wrap lines to a page width without shipping
//! its own font.
//!
//! ## How it works
//!
//! [`FontSearch::resolve`] walks an ordered candidate list and adopts the
//! first file whose bytes parse as a font face:
//!
//! 1. `PDF2MD_FONT_PATH`: a single font file.
//! 2. `PDF2MD_FONT_DIR`: a directory scanned for font files.
//! 3. Base directories, each with a `fonts/` subdirectory scanned: the
//!    bundled resource directory, the executable directory, the project root
//!    and the current directory.
//! 4. The per-user font directory (`~/.local/share/fonts`, `~/Library/Fonts`, …).
//! 5. Well-known system font files for the current OS.
//!
//! Within a scanned directory, files ending in `.ttf`, `.otf` or `.ttc` are
//! tried in lexicographic order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use font_discovery::FontSearch;
//!
//! let font = FontSearch::from_env(None).resolve().expect("no usable font");
//! let metrics = font.metrics(12.0).expect("font parsed once already");
//! println!("{} → {:.1}pt", font.path().display(), metrics.text_width("Hello"));
//! ```
//!
//! ## Platform support
//!
//! | OS      | System fonts tried                                       |
//! |---------|----------------------------------------------------------|
//! | Windows | `msyh`, `simhei`, `arial`, `segoeui`, `simsun` in `%WINDIR%\Fonts` |
//! | Linux   | DejaVu, Liberation, Noto CJK, WenQuanYi                  |
//! | macOS   | Arial Unicode, Arial, PingFang, STHeiti, Helvetica       |
//!
//! Single-face `.ttf` files come before `.ttc` collections, which only
//! measure through their first face and may not embed.
//!
//! ## Environment variable overrides
//!
//! - `PDF2MD_FONT_PATH`: path to a font file; tried before anything else.
//! - `PDF2MD_FONT_DIR`: directory of font files; tried second.
//! - `PDF2MD_RESOURCE_DIR`: bundled resource directory (defaults to
//!   `<exe_dir>/../share/pdf2md`).

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use ttf_parser::{Face, GlyphId};

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable naming a single font file.
pub const FONT_PATH_ENV: &str = "PDF2MD_FONT_PATH";

/// Environment variable naming a directory of font files.
pub const FONT_DIR_ENV: &str = "PDF2MD_FONT_DIR";

/// Environment variable overriding the bundled resource directory.
pub const RESOURCE_DIR_ENV: &str = "PDF2MD_RESOURCE_DIR";

/// Extensions accepted when scanning a directory (compared case-insensitively).
pub const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by font-discovery operations.
#[derive(Error, Debug)]
pub enum FontDiscoveryError {
    /// No candidate could be loaded.
    #[error(
        "No usable font found ({} candidates tried).\n\
Set PDF2MD_FONT_PATH to a .ttf/.otf file or PDF2MD_FONT_DIR to a directory of fonts.",
        .tried.len()
    )]
    NotFound { tried: Vec<PathBuf> },

    /// The font file could not be read.
    #[error("Failed to read font '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a font `ttf-parser` understands.
    #[error("Failed to parse font '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },
}

// ── Internal: platform metadata ──────────────────────────────────────────────

/// Well-known system font files for the current OS, most preferred first.
pub fn system_font_paths() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "windows" => {
            let root = std::env::var("WINDIR")
                .or_else(|_| std::env::var("SystemRoot"))
                .unwrap_or_else(|_| r"C:\Windows".to_string());
            let fonts = PathBuf::from(root).join("Fonts");
            [
                "msyh.ttf",
                "simhei.ttf",
                "arial.ttf",
                "segoeui.ttf",
                "msyh.ttc",
                "simsun.ttc",
            ]
            .iter()
            .map(|name| fonts.join(name))
            .collect()
        }
        "linux" => [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
        ]
        .iter()
        .map(PathBuf::from)
        .collect(),
        "macos" => [
            "/Library/Fonts/Arial Unicode.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/PingFang.ttc",
            "/System/Library/Fonts/STHeiti Light.ttc",
            "/System/Library/Fonts/Helvetica.ttc",
        ]
        .iter()
        .map(PathBuf::from)
        .collect(),
        _ => Vec::new(),
    }
}

/// Base directories whose `fonts/` subdirectory is scanned, in search order.
///
/// `project_root` is supplied by the caller (usually its own
/// `CARGO_MANIFEST_DIR`) since this crate cannot know it.
pub fn default_base_dirs(project_root: Option<&Path>) -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let mut dirs = Vec::new();

    match std::env::var(RESOURCE_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => dirs.push(PathBuf::from(dir)),
        _ => {
            if let Some(exe_dir) = &exe_dir {
                dirs.push(exe_dir.join("..").join("share").join("pdf2md"));
            }
        }
    }
    if let Some(exe_dir) = exe_dir {
        dirs.push(exe_dir);
    }
    if let Some(root) = project_root {
        dirs.push(root.to_path_buf());
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs
}

/// Font files directly inside `dir`, sorted lexicographically.
///
/// A missing or unreadable directory yields an empty list.
pub fn scan_font_dir(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut fonts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_font_extension(path))
        .collect();
    fonts.sort();
    fonts
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FONT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

// ── Search policy ────────────────────────────────────────────────────────────

/// Ordered font search policy.
///
/// Build it with [`FontSearch::from_env`] for the platform defaults, or start
/// from [`FontSearch::empty`] and add only the locations you want.
#[derive(Debug, Clone, Default)]
pub struct FontSearch {
    font_file: Option<PathBuf>,
    font_dir: Option<PathBuf>,
    base_dirs: Vec<PathBuf>,
    user_font_dir: Option<PathBuf>,
    system_fonts: Vec<PathBuf>,
}

impl FontSearch {
    /// A policy with no locations at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Platform defaults plus the `PDF2MD_FONT_PATH` / `PDF2MD_FONT_DIR` overrides.
    pub fn from_env(project_root: Option<&Path>) -> Self {
        let from_var = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };

        Self {
            font_file: from_var(FONT_PATH_ENV),
            font_dir: from_var(FONT_DIR_ENV),
            base_dirs: default_base_dirs(project_root),
            user_font_dir: dirs::font_dir(),
            system_fonts: system_font_paths(),
        }
    }

    /// Try this file before anything else.
    pub fn with_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_file = Some(path.into());
        self
    }

    /// Scan this directory right after the explicit file.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dir = Some(dir.into());
        self
    }

    /// Replace the base directories (each is searched under `fonts/`).
    pub fn with_base_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.base_dirs = dirs;
        self
    }

    /// Replace the fixed system font list.
    pub fn with_system_fonts(mut self, fonts: Vec<PathBuf>) -> Self {
        self.system_fonts = fonts;
        self
    }

    /// The explicit font file, if any.
    pub fn font_file(&self) -> Option<&Path> {
        self.font_file.as_deref()
    }

    /// The explicit font directory, if any.
    pub fn font_dir(&self) -> Option<&Path> {
        self.font_dir.as_deref()
    }

    /// Every candidate path in the order it will be tried, duplicates removed.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        let mut push = |path: PathBuf| {
            if !out.contains(&path) {
                out.push(path);
            }
        };

        if let Some(file) = &self.font_file {
            push(file.clone());
        }
        if let Some(dir) = &self.font_dir {
            scan_font_dir(dir).into_iter().for_each(&mut push);
        }
        for base in &self.base_dirs {
            scan_font_dir(&base.join("fonts"))
                .into_iter()
                .for_each(&mut push);
        }
        if let Some(dir) = &self.user_font_dir {
            scan_font_dir(dir).into_iter().for_each(&mut push);
        }
        for font in &self.system_fonts {
            push(font.clone());
        }
        out
    }

    /// Load the first candidate that parses as a font.
    pub fn resolve(&self) -> Result<FontHandle, FontDiscoveryError> {
        let candidates = self.candidates();

        for path in &candidates {
            if !path.is_file() {
                debug!("Font candidate missing: {}", path.display());
                continue;
            }
            match FontHandle::load(path) {
                Ok(handle) => {
                    debug!("Using font {}", path.display());
                    return Ok(handle);
                }
                Err(e) => warn!("Skipping font candidate: {e}"),
            }
        }

        Err(FontDiscoveryError::NotFound { tried: candidates })
    }
}

// ── Loaded font ──────────────────────────────────────────────────────────────

/// A font file that has been read and verified to parse.
///
/// Owns the raw bytes so the same data can be handed to a PDF writer for
/// embedding and to [`GlyphMetrics`] for measurement.
#[derive(Clone)]
pub struct FontHandle {
    path: PathBuf,
    data: Vec<u8>,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle")
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontHandle {
    /// Read and parse a font file.
    pub fn load(path: &Path) -> Result<Self, FontDiscoveryError> {
        let data = std::fs::read(path).map_err(|source| FontDiscoveryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, data)
    }

    /// Parse font bytes that were obtained elsewhere. `path` is only used for
    /// identification and error messages.
    pub fn from_bytes(path: &Path, data: Vec<u8>) -> Result<Self, FontDiscoveryError> {
        Face::parse(&data, 0).map_err(|e| FontDiscoveryError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// Where the font was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw font file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Width measurement at `font_size` points.
    pub fn metrics(&self, font_size: f32) -> Result<GlyphMetrics<'_>, FontDiscoveryError> {
        let face = Face::parse(&self.data, 0).map_err(|e| FontDiscoveryError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(GlyphMetrics::new(face, font_size))
    }
}

// ── Measurement ──────────────────────────────────────────────────────────────

/// Horizontal advance widths of one face at one font size, in points.
///
/// Kerning is ignored, so the width of a string is the sum of its
/// characters' advances.
pub struct GlyphMetrics<'a> {
    face: Face<'a>,
    scale: f32,
    fallback_advance: f32,
}

impl<'a> GlyphMetrics<'a> {
    fn new(face: Face<'a>, font_size: f32) -> Self {
        let upem = face.units_per_em().max(1) as f32;
        let scale = font_size / upem;
        // Missing glyphs render as .notdef; use its advance, or half an em.
        let fallback_advance = face
            .glyph_hor_advance(GlyphId(0))
            .map(|adv| adv as f32 * scale)
            .unwrap_or(font_size / 2.0);

        Self {
            face,
            scale,
            fallback_advance,
        }
    }

    /// Advance width of a single character.
    pub fn char_width(&self, c: char) -> f32 {
        self.face
            .glyph_index(c)
            .and_then(|gid| self.face.glyph_hor_advance(gid))
            .map(|adv| adv as f32 * self.scale)
            .unwrap_or(self.fallback_advance)
    }

    /// Advance width of a whole string.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
