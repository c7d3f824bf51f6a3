//! Asset plumbing between off-thread loaders and the render thread.
//!
//! - `ImageCache`: bounded LRU of image handles by key
//! - `AssetInbox`: channel that settles pending images when drained
//! - `ImageSource`: the collaborator contract for fetching and decoding

mod cache;
mod inbox;

pub use cache::ImageCache;
pub use inbox::{AssetInbox, AssetMessage, AssetSender, DecodedImage, ImageSource, Ticket};
