use std::path::{Path, PathBuf};

use seo_engine::{AtomicFileWriter, AuthSession, User};
use seo_logging::{seo_error, seo_info, seo_warn};
use serde::{Deserialize, Serialize};

const SESSION_FILENAME: &str = "session.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedUser {
    id: Option<String>,
    email: String,
    name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSession {
    token: Option<String>,
    user: Option<PersistedUser>,
}

/// Default location: `<config dir>/seo-client`.
pub(crate) fn default_state_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seo-client")
}

/// Returns the saved session only when both token and user are present.
pub(crate) fn load_session(state_dir: &Path) -> Option<AuthSession> {
    let writer = AtomicFileWriter::new(state_dir.to_path_buf());
    let content = match writer.read_to_string(SESSION_FILENAME) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            seo_warn!("Failed to read saved session from {:?}: {}", state_dir, err);
            return None;
        }
    };

    let persisted: PersistedSession = match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            seo_warn!("Failed to parse saved session in {:?}: {}", state_dir, err);
            return None;
        }
    };

    let token = persisted.token.filter(|token| !token.is_empty())?;
    let user = persisted.user?;
    Some(AuthSession {
        token,
        user: User {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    })
}

pub(crate) fn save_session(state_dir: &Path, session: &AuthSession) -> bool {
    let persisted = PersistedSession {
        token: Some(session.token.clone()),
        user: Some(PersistedUser {
            id: session.user.id.clone(),
            email: session.user.email.clone(),
            name: session.user.name.clone(),
        }),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            seo_error!("Failed to serialize session: {}", err);
            return false;
        }
    };

    let writer = AtomicFileWriter::new(state_dir.to_path_buf());
    match writer.write(SESSION_FILENAME, content.as_bytes()) {
        Ok(path) => {
            seo_info!("Saved session to {:?}", path);
            true
        }
        Err(err) => {
            seo_error!("Failed to write session to {:?}: {}", state_dir, err);
            false
        }
    }
}

pub(crate) fn clear_session(state_dir: &Path) -> bool {
    let writer = AtomicFileWriter::new(state_dir.to_path_buf());
    match writer.remove(SESSION_FILENAME) {
        Ok(existed) => existed,
        Err(err) => {
            seo_error!("Failed to remove session in {:?}: {}", state_dir, err);
            false
        }
    }
}
