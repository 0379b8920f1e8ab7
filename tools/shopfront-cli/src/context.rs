//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shopfront_cache::Cache;
use shopfront_commerce::auth::AuthState;
use shopfront_commerce::cart::CartStore;
use shopfront_commerce::catalog::{ProductCatalog, ProductRef, StaticCatalog};
use shopfront_commerce::checkout::LocalOrderGateway;
use shopfront_commerce::exchange::CurrencyService;
use shopfront_commerce::wishlist::WishlistStore;
use shopfront_commerce::{Currency, ProductId};

use crate::config::{ShopConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Cache key holding the shopper's chosen display currency.
pub const DISPLAY_CURRENCY_KEY: &str = "currency";

const SAMPLE_CATALOG: &str = include_str!("../data/catalog.json");

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: ShopConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Config file in use, if any.
    pub config_path: Option<PathBuf>,
    currency_override: Option<String>,
}

impl Context {
    /// Load context from config file.
    pub fn load(
        config_path: Option<&str>,
        currency_override: Option<String>,
        output: Output,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = resolve(&cwd, path);
                (ShopConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some((path, config)) => (config, Some(path)),
                None => (ShopConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
            currency_override,
        })
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(self.cwd.as_path())
    }

    /// Directory backing the local store.
    pub fn storage_dir(&self) -> PathBuf {
        resolve(self.base_dir(), &self.config.storage.dir)
    }

    /// Resolve a path relative to the config file's directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(self.base_dir(), path)
    }

    pub fn base_currency(&self) -> Result<Currency> {
        self.config.currency.base_currency()
    }

    pub fn auth(&self) -> AuthState {
        self.config.auth.auth_state()
    }

    /// Open the local store and everything that lives in it.
    pub fn open_shop(&self) -> Result<Shop> {
        let dir = self.storage_dir();
        let cache = Cache::open_dir(&dir)
            .with_context(|| format!("Failed to open local store: {}", dir.display()))?;
        self.output.debug(&format!("Local store: {}", dir.display()));

        let base = self.base_currency()?;
        let currency = CurrencyService::new(self.config.currency.exchange_rates()?);

        let stored = cache.get::<String>(DISPLAY_CURRENCY_KEY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable display currency");
            None
        });
        let display = self
            .currency_override
            .clone()
            .or(stored)
            .or_else(|| self.config.currency.display.clone());
        if let Some(code) = display {
            let active = currency.set_currency(&code);
            if active.code() != code.trim().to_uppercase() {
                self.output.warn(&format!(
                    "Currency {} is not available, showing prices in {}",
                    code,
                    active.code()
                ));
            }
        }

        Ok(Shop {
            cart: CartStore::open(cache.clone(), base),
            wishlist: WishlistStore::open(cache.clone()),
            gateway: Arc::new(
                LocalOrderGateway::new(cache.clone())
                    .with_latency(self.config.checkout.simulated_latency()),
            ),
            currency,
            base,
            cache,
        })
    }

    /// The product catalog: the configured JSON file or the bundled sample.
    pub fn catalog(&self) -> Result<StaticCatalog> {
        match self.config.catalog.path {
            Some(ref path) => {
                let path = self.resolve_path(path);
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
                StaticCatalog::from_json_slice(&bytes)
                    .with_context(|| format!("Failed to parse catalog: {}", path.display()))
            }
            None => StaticCatalog::from_json_slice(SAMPLE_CATALOG.as_bytes())
                .context("Failed to parse bundled catalog"),
        }
    }
}

/// Open storefront state for one command.
pub struct Shop {
    pub cache: Cache,
    pub base: Currency,
    pub currency: CurrencyService,
    pub cart: CartStore,
    pub wishlist: WishlistStore,
    pub gateway: Arc<LocalOrderGateway>,
}

impl Shop {
    /// Look a product up in the catalog and turn it into a cart-ready reference.
    pub async fn product(&self, catalog: &impl ProductCatalog, id: &str) -> Result<ProductRef> {
        let record = catalog
            .get_product(&ProductId::new(id.trim()))
            .await
            .with_context(|| format!("No product with id '{}'", id.trim()))?;
        ProductRef::from_record(&record, self.base)
            .with_context(|| format!("Product '{}' cannot be sold", record.id))
    }

    /// Remember the display currency for later invocations.
    pub fn save_display_currency(&self) -> Result<()> {
        self.cache
            .set(DISPLAY_CURRENCY_KEY, self.currency.active_currency().code())
            .context("Failed to save display currency")
    }
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    }
}

/// Find config file in directory tree.
fn find_config(start: &Path) -> Option<(PathBuf, ShopConfig)> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                match ShopConfig::load(&config_path) {
                    Ok(config) => return Some((config_path, config)),
                    Err(e) => tracing::warn!(
                        path = %config_path.display(),
                        error = %e,
                        "skipping unreadable config file"
                    ),
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shop.toml"), "[storage]\ndir = \"data\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (path, config) = find_config(&nested).unwrap();
        assert_eq!(path, dir.path().join("shop.toml"));
        assert_eq!(config.storage.dir, "data");
    }

    #[test]
    fn test_resolve() {
        let base = Path::new("/srv/shop");
        assert_eq!(resolve(base, "data"), PathBuf::from("/srv/shop/data"));
        assert_eq!(resolve(base, "/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = StaticCatalog::from_json_slice(SAMPLE_CATALOG.as_bytes()).unwrap();
        assert!(!catalog.is_empty());
    }
}
