use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::coords::Vec2;
use crate::paint::Pattern;

use super::Pixmap;

/// Error reported when an asynchronous image load fails.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadError {
    /// Asset key the loader was asked for (a path, URL, or caller-defined id).
    pub key: String,
    pub message: String,
}

impl LoadError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self { key: key.into(), message: message.into() }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load image `{}`: {}", self.key, self.message)
    }
}

impl std::error::Error for LoadError {}

type ReadyCallback = Box<dyn FnOnce(Result<&Image, &LoadError>)>;

enum ImageState {
    Pending,
    Ready(Rc<Pixmap>),
    Failed(LoadError),
}

struct ImageInner {
    state: ImageState,
    callbacks: Vec<ReadyCallback>,
}

/// Shared handle to an image resource that may still be loading.
///
/// Handles are cheap to clone and confined to the render thread. Asynchronous
/// readiness is a normal state: drawing a pending or failed image is a no-op.
#[derive(Clone)]
pub struct Image(Rc<RefCell<ImageInner>>);

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        match &inner.state {
            ImageState::Pending => f.write_str("Image(pending)"),
            ImageState::Ready(p) => write!(f, "Image({}x{})", p.width(), p.height()),
            ImageState::Failed(e) => write!(f, "Image(failed: {e})"),
        }
    }
}

impl Image {
    fn with_state(state: ImageState) -> Self {
        Self(Rc::new(RefCell::new(ImageInner { state, callbacks: Vec::new() })))
    }

    /// An image whose pixels are already available.
    pub fn ready(pixmap: Pixmap) -> Self {
        Self::from_shared(Rc::new(pixmap))
    }

    pub fn from_shared(pixmap: Rc<Pixmap>) -> Self {
        Self::with_state(ImageState::Ready(pixmap))
    }

    /// A pending image plus the single-use loader that settles it.
    pub fn pending() -> (Image, ImageLoader) {
        let image = Self::with_state(ImageState::Pending);
        let loader = ImageLoader { image: Some(image.clone()) };
        (image, loader)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self.0.borrow().state, ImageState::Ready(_))
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.0.borrow().state, ImageState::Pending)
    }

    /// The load error, if loading failed.
    pub fn error(&self) -> Option<LoadError> {
        match &self.0.borrow().state {
            ImageState::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Pixel data, once ready.
    pub fn pixmap(&self) -> Option<Rc<Pixmap>> {
        match &self.0.borrow().state {
            ImageState::Ready(p) => Some(Rc::clone(p)),
            _ => None,
        }
    }

    /// Natural size in pixels, once ready.
    pub fn size(&self) -> Option<Vec2> {
        self.pixmap().map(|p| Vec2::new(p.width() as f32, p.height() as f32))
    }

    /// Natural width, or 0 while not ready.
    pub fn width(&self) -> f32 {
        self.size().map_or(0.0, |s| s.x)
    }

    /// Natural height, or 0 while not ready.
    pub fn height(&self) -> f32 {
        self.size().map_or(0.0, |s| s.y)
    }

    /// Builds a fill pattern from this image, once ready.
    pub fn to_pattern(&self, repeat_x: bool, repeat_y: bool) -> Option<Pattern> {
        self.pixmap().map(|p| Pattern::new(p, repeat_x, repeat_y))
    }

    /// Returns true when both handles refer to the same resource.
    #[inline]
    pub fn ptr_eq(&self, other: &Image) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Registers a completion callback.
    ///
    /// The callback runs exactly once: immediately when the image is already
    /// settled, otherwise when its loader completes or fails.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(Result<&Image, &LoadError>) + 'static,
    {
        let failure = {
            let mut inner = self.0.borrow_mut();
            let failure = match &inner.state {
                ImageState::Pending => None,
                ImageState::Ready(_) => Some(None),
                ImageState::Failed(e) => Some(Some(e.clone())),
            };
            if failure.is_none() {
                inner.callbacks.push(Box::new(callback));
                return;
            }
            failure
        };
        match failure {
            Some(Some(err)) => callback(Err(&err)),
            _ => callback(Ok(self)),
        }
    }

    fn settle(&self, state: ImageState) {
        let (callbacks, err) = {
            let mut inner = self.0.borrow_mut();
            debug_assert!(matches!(inner.state, ImageState::Pending), "image settled twice");
            let err = match &state {
                ImageState::Failed(e) => Some(e.clone()),
                _ => None,
            };
            inner.state = state;
            (std::mem::take(&mut inner.callbacks), err)
        };
        // Callbacks run without the borrow held so they may query the image.
        for cb in callbacks {
            match &err {
                None => cb(Ok(self)),
                Some(e) => cb(Err(e)),
            }
        }
    }
}

/// Single-use completion handle for a pending [`Image`].
///
/// Both [`complete`](Self::complete) and [`fail`](Self::fail) consume the loader,
/// so an image is settled at most once. Dropping an unsettled loader fails the
/// image, so callbacks still fire exactly once.
pub struct ImageLoader {
    image: Option<Image>,
}

impl ImageLoader {
    /// The image this loader settles.
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn complete(mut self, pixmap: Pixmap) {
        if let Some(image) = self.image.take() {
            image.settle(ImageState::Ready(Rc::new(pixmap)));
        }
    }

    pub fn fail(mut self, error: LoadError) {
        if let Some(image) = self.image.take() {
            log::warn!("{error}");
            image.settle(ImageState::Failed(error));
        }
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        if let Some(image) = self.image.take() {
            image.settle(ImageState::Failed(LoadError::new("<unknown>", "loader dropped before completion")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn pending_image_has_no_size() {
        let (image, _loader) = Image::pending();
        assert!(image.is_pending());
        assert_eq!(image.width(), 0.0);
        assert!(image.pixmap().is_none());
    }

    #[test]
    fn callbacks_fire_once_on_completion() {
        let (image, loader) = Image::pending();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        image.on_ready(move |res| {
            assert_eq!(res.unwrap().width(), 3.0);
            h.set(h.get() + 1);
        });

        loader.complete(Pixmap::new(3, 2));
        assert_eq!(hits.get(), 1);
        assert!(image.is_ready());

        // Late registration runs immediately, still exactly once.
        let h = Rc::clone(&hits);
        image.on_ready(move |_| h.set(h.get() + 1));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn failure_reaches_error_path() {
        let (image, loader) = Image::pending();
        let seen = Rc::new(RefCell::new(None));

        let s = Rc::clone(&seen);
        image.on_ready(move |res| *s.borrow_mut() = res.err().cloned());
        loader.fail(LoadError::new("hero.png", "not found"));

        assert_eq!(seen.borrow().as_ref().unwrap().key, "hero.png");
        assert!(!image.is_ready());
        assert!(image.error().is_some());
    }

    #[test]
    fn dropped_loader_fails_image() {
        let (image, loader) = Image::pending();
        drop(loader);
        assert!(image.error().is_some());
    }
}
