//! Client-side state for the Savor storefront.
//!
//! State lives behind explicit handles that callers construct and pass down:
//! [`AuthStore`] for credentials, [`Cart`] and [`LocalCartFile`] for the guest
//! cart, and [`CartCoordinator`] for routing cart changes between the guest cart
//! and the remote one.

pub mod auth;
pub mod cart;
pub mod local_cart;
pub mod sync;

pub use auth::{AuthStore, InMemoryAuthStore};
pub use cart::{Cart, CartError};
pub use local_cart::{CART_PATH_ENV, LocalCartFile};
pub use sync::{CartBackend, CartCoordinator, CartLocation, merge_carts};
