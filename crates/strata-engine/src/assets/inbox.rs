use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::image::{ImageLoader, LoadError, Pixmap};

/// Identifies one outstanding load request.
pub type Ticket = u64;

/// Decoded image pixels, straight-alpha RGBA8, row-major.
///
/// This is what an off-thread decoder produces; it is `Send`, unlike the
/// render-thread `Image` it eventually settles.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// A finished load, as delivered to the render thread.
#[derive(Debug)]
pub struct AssetMessage {
    pub ticket: Ticket,
    pub result: Result<DecodedImage, String>,
}

/// Cloneable, `Send` handle a collaborator uses to report finished loads.
#[derive(Debug, Clone)]
pub struct AssetSender {
    tx: Sender<AssetMessage>,
}

impl AssetSender {
    /// Delivers a result. Returns false when the inbox no longer exists.
    pub fn send(&self, ticket: Ticket, result: Result<DecodedImage, String>) -> bool {
        self.tx.send(AssetMessage { ticket, result }).is_ok()
    }
}

/// Collaborator that fetches and decodes images.
///
/// `fetch` may do its work on any thread; it must eventually call
/// [`AssetSender::send`] exactly once with the given ticket. Nothing it does
/// may touch render-thread state directly.
pub trait ImageSource {
    fn fetch(&self, key: &str, ticket: Ticket, sender: AssetSender);
}

struct PendingLoad {
    key: String,
    loader: ImageLoader,
}

/// Render-thread end of the asset channel.
///
/// Off-thread results queue up in the channel and only touch images when the
/// owner calls [`drain`](Self::drain), so every image callback runs on the
/// render thread between frames.
pub struct AssetInbox {
    tx: Sender<AssetMessage>,
    rx: Receiver<AssetMessage>,
    pending: HashMap<Ticket, PendingLoad>,
    next_ticket: Ticket,
}

impl Default for AssetInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetInbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: HashMap::new(), next_ticket: 0 }
    }

    pub fn sender(&self) -> AssetSender {
        AssetSender { tx: self.tx.clone() }
    }

    /// Parks `loader` until a result for the returned ticket arrives.
    pub fn register(&mut self, key: impl Into<String>, loader: ImageLoader) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.insert(ticket, PendingLoad { key: key.into(), loader });
        ticket
    }

    /// Number of loads still waiting for a result.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Settles every image whose result has arrived. Returns how many were settled.
    pub fn drain(&mut self) -> usize {
        let mut settled = 0;
        while let Ok(msg) = self.rx.try_recv() {
            let Some(PendingLoad { key, loader }) = self.pending.remove(&msg.ticket) else {
                log::debug!("dropping result for unknown ticket {}", msg.ticket);
                continue;
            };
            match msg.result {
                Ok(decoded) => {
                    match Pixmap::from_straight_rgba8(decoded.width, decoded.height, &decoded.rgba) {
                        Some(pixmap) => {
                            log::trace!("image `{key}` ready ({}x{})", decoded.width, decoded.height);
                            loader.complete(pixmap);
                        }
                        None => loader.fail(LoadError::new(key, "pixel buffer does not match dimensions")),
                    }
                }
                Err(message) => loader.fail(LoadError::new(key, message)),
            }
            settled += 1;
        }
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use std::thread;

    #[test]
    fn results_settle_only_when_drained() {
        let mut inbox = AssetInbox::new();
        let (image, loader) = Image::pending();
        let ticket = inbox.register("a.png", loader);

        let sender = inbox.sender();
        thread::spawn(move || {
            sender.send(ticket, Ok(DecodedImage { width: 1, height: 1, rgba: vec![255, 0, 0, 255] }));
        })
        .join()
        .unwrap();

        assert!(image.is_pending());
        assert_eq!(inbox.drain(), 1);
        assert!(image.is_ready());
        assert_eq!(inbox.pending(), 0);
    }

    #[test]
    fn errors_and_bad_buffers_fail_the_image() {
        let mut inbox = AssetInbox::new();
        let (missing, l1) = Image::pending();
        let (short, l2) = Image::pending();
        let t1 = inbox.register("missing.png", l1);
        let t2 = inbox.register("short.png", l2);

        let sender = inbox.sender();
        sender.send(t1, Err("not found".into()));
        sender.send(t2, Ok(DecodedImage { width: 2, height: 2, rgba: vec![0; 3] }));
        inbox.drain();

        assert_eq!(missing.error().unwrap().key, "missing.png");
        assert!(short.error().is_some());
    }

    #[test]
    fn unknown_tickets_are_ignored() {
        let mut inbox = AssetInbox::new();
        inbox.sender().send(42, Err("late".into()));
        assert_eq!(inbox.drain(), 0);
    }
}
