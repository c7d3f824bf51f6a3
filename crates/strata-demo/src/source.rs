use std::path::{Path, PathBuf};
use std::thread;

use anyhow::Context;
use strata_engine::assets::{AssetSender, DecodedImage, ImageSource, Ticket};

/// Loads image files relative to a root directory on a worker thread.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&self, key: &str, ticket: Ticket, sender: AssetSender) {
        let path = self.root.join(key);
        let spawned = thread::Builder::new()
            .name(format!("load {key}"))
            .spawn(move || {
                let result = decode_file(&path).map_err(|e| format!("{e:#}"));
                if !sender.send(ticket, result) {
                    log::debug!("inbox closed before `{}` finished loading", path.display());
                }
            });
        if let Err(e) = spawned {
            log::warn!("could not start loader thread for `{key}`: {e}");
        }
    }
}

/// Reads and decodes one image file into straight-alpha RGBA8.
pub fn decode_file(path: &Path) -> anyhow::Result<DecodedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let rgba = image::load_from_memory(&bytes)
        .with_context(|| format!("decode '{}'", path.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage { width, height, rgba: rgba.into_raw() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_engine::core::{Platform, PlatformConfig};
    use std::time::{Duration, Instant};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("strata-demo-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn decodes_png_from_disk() {
        let dir = temp_dir("decode");
        let path = dir.join("dot.png");
        image::RgbaImage::from_raw(1, 1, vec![10, 20, 30, 40]).unwrap().save(&path).unwrap();

        let decoded = decode_file(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (1, 1));
        assert_eq!(decoded.rgba, vec![10, 20, 30, 40]);
    }

    #[test]
    fn missing_files_fail_the_image() {
        let dir = temp_dir("missing");
        let mut platform = Platform::new(PlatformConfig::default()).with_image_source(FsImageSource::new(&dir));
        let image = platform.load_image("nope.png");

        let deadline = Instant::now() + Duration::from_secs(5);
        while platform.pending_assets() > 0 && Instant::now() < deadline {
            platform.drain_assets();
            std::thread::sleep(Duration::from_millis(1));
        }
        let err = image.error().unwrap();
        assert!(err.message.contains("nope.png"));
    }
}
