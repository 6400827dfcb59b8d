// rentcart/src/store/file.rs
use crate::error::StoreResult;
use crate::model::{CartItem, CartToken};
use crate::store::CartRepository;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TOKEN_FILE: &str = "cart_token";

/// Stores the cart as files under one directory:
///
/// ```text
/// <dir>/cart_token                 the current token, as plain text
/// <dir>/cart_items_<token>.json    the item list for that token
/// ```
///
/// Each write goes to a sibling `.tmp` file that is then renamed over the
/// target, so readers see either the old or the new list.
#[derive(Debug, Clone)]
pub struct FileCartRepository {
  dir: PathBuf,
}

impl FileCartRepository {
  /// Uses `dir`, creating it if needed.
  pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir)?;
    debug!(dir = %dir.display(), "Cart storage directory ready.");
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn items_path(&self, token: &CartToken) -> io::Result<PathBuf> {
    let raw = token.as_str();
    let safe = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !safe {
      return Err(io::Error::new(
        ErrorKind::InvalidData,
        format!("cart token {raw:?} is not usable as a file name"),
      ));
    }
    Ok(self.dir.join(format!("cart_items_{raw}.json")))
  }

  fn write_atomic(&self, target: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp = target.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, target)
  }

  fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }
}

impl CartRepository for FileCartRepository {
  fn load_token(&self) -> StoreResult<Option<CartToken>> {
    match fs::read_to_string(self.dir.join(TOKEN_FILE)) {
      Ok(raw) => {
        let raw = raw.trim();
        Ok((!raw.is_empty()).then(|| CartToken::new(raw)))
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn load_items(&self, token: &CartToken) -> StoreResult<Vec<CartItem>> {
    let path = self.items_path(token)?;
    match fs::read(&path) {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        warn!(%token, "Cart token has no stored items.");
        Ok(Vec::new())
      }
      Err(e) => Err(e.into()),
    }
  }

  fn save_token(&self, token: &CartToken) -> StoreResult<()> {
    self.write_atomic(&self.dir.join(TOKEN_FILE), token.as_str().as_bytes())?;
    Ok(())
  }

  fn save_items(&self, token: &CartToken, items: &[CartItem]) -> StoreResult<()> {
    let path = self.items_path(token)?;
    let json = serde_json::to_vec_pretty(items)?;
    self.write_atomic(&path, &json)?;
    Ok(())
  }

  fn clear(&self, token: &CartToken) -> StoreResult<()> {
    Self::remove_if_present(&self.items_path(token)?)?;
    Self::remove_if_present(&self.dir.join(TOKEN_FILE))?;
    Ok(())
  }
}
