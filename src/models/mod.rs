//! Data models for BookX

pub mod book;
pub mod enums;
pub mod google;
pub mod order;
pub mod playlist;
pub mod review;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookListing, BookPage};
pub use enums::{BookStatus, BookType, ItemType, OrderStatus, PaymentMethod, TransactionStatus};
pub use order::{Order, OrderDetails, OrderItemDetails};
pub use playlist::{Playlist, PlaylistDetails};
pub use review::Review;
pub use transaction::{Transaction, TransactionDetails};
pub use user::{Principal, UserClaims};
