//! JSON-backed persistence for the guest cart.

use std::fs;
use std::path::{Path, PathBuf};

use savor_types::CartItem;
use savor_util::config_file_path;
use tracing::warn;

use crate::cart::{Cart, CartError};

/// Environment variable controlling the guest cart file location.
pub const CART_PATH_ENV: &str = "SAVOR_CART_PATH";
pub const CART_FILE_NAME: &str = "cart.json";

/// Guest cart file holding the serialized cart lines.
#[derive(Debug, Clone)]
pub struct LocalCartFile {
    path: PathBuf,
}

impl LocalCartFile {
    /// File at the default location (see [`CART_PATH_ENV`]).
    pub fn from_env() -> Self {
        Self::new(config_file_path(CART_PATH_ENV, CART_FILE_NAME))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cart. A missing file is an empty cart; an unreadable payload is
    /// logged and treated as empty.
    pub fn load(&self) -> Result<Cart, CartError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Cart::new()),
            Err(error) => return Err(CartError::Io(error)),
        };
        match serde_json::from_str::<Vec<CartItem>>(&data) {
            Ok(items) => Ok(Cart::from_items(items)),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "Failed to parse cart file; starting with an empty cart"
                );
                Ok(Cart::new())
            }
        }
    }

    /// Writes the cart, removing the file when the cart is empty.
    pub fn save(&self, cart: &Cart) -> Result<(), CartError> {
        if cart.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(error) if error.kind() != std::io::ErrorKind::NotFound => Err(CartError::Io(error)),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&cart.to_items())?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
