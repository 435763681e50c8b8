/// Console settings loaded from `shop-console.toml` and environment overrides
pub mod settings;

pub use settings::{Settings, load_settings_from};
