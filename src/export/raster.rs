use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{WeightError, WeightResult};
use crate::weights::grid::WeightMap;
use crate::weights::stage::Exportable;

/// Raster formats able to store 8-bit single-channel intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Bmp,
    Tiff,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }
}

/// Map a weight in `[0, 1]` to an 8-bit intensity. Out-of-range values saturate.
pub fn weight_to_intensity(weight: f64) -> u8 {
    (255.0 * weight).round().clamp(0.0, 255.0) as u8
}

/// `<base>_<bone>.<ext>`, next to `base`.
pub fn export_file_name(base: &Path, bone: &str, format: ExportFormat) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!("_{bone}.{}", format.extension()));
    PathBuf::from(name)
}

/// Grayscale image of one bone channel. Pixel `(i, j)` is cell `(i, j)`; cells without an entry are black.
pub fn channel_image<S: Exportable>(
    map: &WeightMap<S>,
    bone: &str,
) -> WeightResult<image::GrayImage> {
    let k = map.bones().index_of(bone).ok_or_else(|| {
        WeightError::validation(format!("bone '{bone}' is not part of this weight map"))
    })?;
    Ok(image::GrayImage::from_fn(map.width(), map.height(), |i, j| {
        let w = map.cell_slice(i, j)[k].unwrap_or(0.0);
        image::Luma([weight_to_intensity(w)])
    }))
}

/// Write one image per bone of `map`, in declaration order. Returns the written paths.
#[tracing::instrument(skip(map), fields(stage = map.stage_name()))]
pub fn export_channels<S: Exportable>(
    map: &WeightMap<S>,
    base: &Path,
    format: ExportFormat,
) -> WeightResult<Vec<PathBuf>> {
    if let Some(parent) = base.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let mut written = Vec::with_capacity(map.bones().len());
    for name in map.bones().names() {
        let img = channel_image(map, name)?;
        let path = export_file_name(base, name, format);
        img.save_with_format(&path, format.image_format())
            .with_context(|| format!("write {} '{}'", format.extension(), path.display()))?;
        tracing::debug!(path = %path.display(), "wrote channel image");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/export/raster.rs"]
mod tests;
