//! Font registration for chart text.
//!
//! plotters draws text through `ab_glyph`, which only knows fonts that were
//! registered at runtime. The first readable font from the configured path
//! or a list of common system locations is registered as `sans-serif`.
//! When none is found, charts are drawn without text.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{register_font, FontStyle};
use tracing::{debug, info, warn};

pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register a font once per process. Returns whether chart text is
/// available. Only the first call's `configured` path is considered.
pub fn ensure_font(configured: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| {
            let candidates = configured
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

            for path in candidates {
                let Ok(bytes) = std::fs::read(&path) else {
                    debug!(path = %path.display(), "Font not readable");
                    continue;
                };
                // plotters keeps a 'static reference to registered font data
                let data: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                match register_font(FONT_FAMILY, FontStyle::Normal, data) {
                    Ok(()) => {
                        info!(path = %path.display(), "Chart font registered");
                        return Some(path);
                    }
                    Err(_) => warn!(path = %path.display(), "Font file could not be parsed"),
                }
            }
            warn!("No usable font found; charts will be drawn without text");
            None
        })
        .is_some()
}

/// Path of the registered font, if any.
pub fn registered_font() -> Option<&'static Path> {
    REGISTERED.get().and_then(|p| p.as_deref())
}
