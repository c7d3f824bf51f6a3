use std::fmt;
use std::rc::Rc;

use crate::assets::{AssetInbox, ImageCache, ImageSource};
use crate::canvas::Canvas;
use crate::image::{Image, LoadError};
use crate::raster::RasterBackend;
use crate::text::FontSystem;

/// Host-level configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Display size in pixels.
    pub width: u32,
    pub height: u32,

    /// Maximum number of images kept by the image cache.
    pub image_cache_capacity: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            image_cache_capacity: 64,
        }
    }
}

/// Services the host provides to a game: image loading, fonts and the display size.
///
/// Created by the host and passed to [`Game::init`](super::Game::init); the
/// loop drains its asset inbox at the start of every tick.
pub struct Platform {
    config: PlatformConfig,
    images: ImageCache,
    inbox: AssetInbox,
    fonts: Rc<FontSystem>,
    source: Option<Box<dyn ImageSource>>,
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("config", &self.config)
            .field("cached_images", &self.images.len())
            .field("pending_images", &self.inbox.pending())
            .field("fonts", &self.fonts.len())
            .field("has_image_source", &self.source.is_some())
            .finish()
    }
}

impl Platform {
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            images: ImageCache::new(config.image_cache_capacity),
            inbox: AssetInbox::new(),
            fonts: Rc::new(FontSystem::new()),
            source: None,
            config,
        }
    }

    /// Installs the collaborator that fetches images by key.
    pub fn with_image_source(mut self, source: impl ImageSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn set_image_source(&mut self, source: Box<dyn ImageSource>) {
        self.source = Some(source);
    }

    #[inline]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.config.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Replaces the font set shared by canvases created afterwards.
    pub fn set_fonts(&mut self, fonts: FontSystem) {
        self.fonts = Rc::new(fonts);
    }

    #[inline]
    pub fn fonts(&self) -> &Rc<FontSystem> {
        &self.fonts
    }

    /// A raster canvas that draws text with the platform's fonts.
    pub fn create_canvas(&self, width: u32, height: u32) -> Canvas<RasterBackend> {
        Canvas::new(RasterBackend::new(width, height).with_fonts(Rc::clone(&self.fonts)))
    }

    /// Display-sized raster canvas.
    pub fn create_display(&self) -> Canvas<RasterBackend> {
        self.create_canvas(self.config.width, self.config.height)
    }

    /// Returns the image for `key`, starting a load if it is not cached.
    ///
    /// The returned image is usually pending; it settles on the render thread
    /// during a later [`drain_assets`](Self::drain_assets). Without an image
    /// source the image fails immediately and is not cached.
    pub fn load_image(&mut self, key: &str) -> Image {
        if let Some(image) = self.images.get(key) {
            return image;
        }

        let (image, loader) = Image::pending();
        let Some(source) = self.source.as_ref() else {
            loader.fail(LoadError::new(key, "no image source installed"));
            return image;
        };

        let ticket = self.inbox.register(key, loader);
        log::debug!("loading image `{key}` (ticket {ticket})");
        source.fetch(key, ticket, self.inbox.sender());
        self.images.insert(key, image.clone());
        image
    }

    /// Makes an already-built image available under `key`.
    pub fn insert_image(&mut self, key: &str, image: Image) {
        self.images.insert(key, image);
    }

    /// Drops `key` from the cache; live handles keep their pixels.
    pub fn evict_image(&mut self, key: &str) -> Option<Image> {
        self.images.remove(key)
    }

    /// Settles images whose results have arrived. Returns how many settled.
    pub fn drain_assets(&mut self) -> usize {
        self.inbox.drain()
    }

    /// Number of image loads still in flight.
    #[inline]
    pub fn pending_assets(&self) -> usize {
        self.inbox.pending()
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetSender, DecodedImage, Ticket};
    use std::cell::RefCell;

    /// Answers synchronously with a 2×1 opaque image, or an error for keys starting with `bad`.
    struct Immediate {
        fetched: Rc<RefCell<Vec<String>>>,
    }

    impl ImageSource for Immediate {
        fn fetch(&self, key: &str, ticket: Ticket, sender: AssetSender) {
            self.fetched.borrow_mut().push(key.to_owned());
            let result = if key.starts_with("bad") {
                Err("corrupt".to_owned())
            } else {
                Ok(DecodedImage { width: 2, height: 1, rgba: vec![255; 8] })
            };
            sender.send(ticket, result);
        }
    }

    fn platform() -> (Platform, Rc<RefCell<Vec<String>>>) {
        let fetched = Rc::new(RefCell::new(Vec::new()));
        let source = Immediate { fetched: Rc::clone(&fetched) };
        (Platform::default().with_image_source(source), fetched)
    }

    #[test]
    fn loads_settle_on_drain() {
        let (mut platform, _) = platform();
        let image = platform.load_image("hero.png");
        assert!(image.is_pending());
        assert_eq!(platform.pending_assets(), 1);

        assert_eq!(platform.drain_assets(), 1);
        assert!(image.is_ready());
        assert_eq!((image.width(), image.height()), (2.0, 1.0));
        assert_eq!(platform.pending_assets(), 0);
    }

    #[test]
    fn cached_images_are_fetched_once() {
        let (mut platform, fetched) = platform();
        let a = platform.load_image("tile.png");
        let b = platform.load_image("tile.png");
        assert!(a.ptr_eq(&b));
        assert_eq!(fetched.borrow().len(), 1);

        platform.evict_image("tile.png");
        let c = platform.load_image("tile.png");
        assert!(!a.ptr_eq(&c));
        assert_eq!(fetched.borrow().len(), 2);
    }

    #[test]
    fn failed_loads_report_the_key() {
        let (mut platform, _) = platform();
        let image = platform.load_image("bad.png");
        platform.drain_assets();
        let err = image.error().unwrap();
        assert!(err.to_string().contains("bad.png"));
    }

    #[test]
    fn missing_source_fails_immediately() {
        let mut platform = Platform::default();
        let image = platform.load_image("x.png");
        assert!(image.error().is_some());
        // Failures are not cached, so a later source can still succeed.
        let again = platform.load_image("x.png");
        assert!(!image.ptr_eq(&again));
    }

    #[test]
    fn display_matches_config() {
        let platform = Platform::new(PlatformConfig { width: 32, height: 16, ..PlatformConfig::default() });
        let display = platform.create_display();
        assert_eq!((display.width(), display.height()), (32.0, 16.0));
    }
}
