use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm};
use eyre::{eyre, Context, Result};

/// Asks whether the existing file at `path` may be replaced. Defaults to no.
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("'{}' already exists - overwrite it?", path.display()))
        .default(false)
        .interact()
        .wrap_err_with(|| eyre!("User confirmation cancelled"))
}
