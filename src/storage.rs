use crate::errors::AppError;
use crate::models::SheetConfig;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_settings(path: &Path) -> SheetConfig {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(settings) => settings,
            Err(err) => {
                error!("failed to parse settings file: {err}");
                SheetConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SheetConfig::default(),
        Err(err) => {
            error!("failed to read settings file: {err}");
            SheetConfig::default()
        }
    }
}

pub async fn persist_settings(path: &Path, settings: &SheetConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(settings).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
