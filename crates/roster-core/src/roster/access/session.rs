use super::{available_units, filter, AccessPolicy, UnitScope, UnitScoped};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

/// Persists the role resolved at sign-in, keyed by the signed-in identity.
pub trait SessionStore: Send + Sync {
    fn store(&self, identity: &str, role: &str) -> Result<(), SessionError>;
    fn load(&self, identity: &str) -> Result<Option<String>, SessionError>;
    fn clear(&self, identity: &str) -> Result<(), SessionError>;
}

/// Caller context threaded into every scoped operation. The effective scope
/// is resolved once when the context is built and shared thereafter.
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: String,
    role: Option<String>,
    scope: Arc<UnitScope>,
}

impl SessionContext {
    pub fn resolve(identity: impl Into<String>, role: Option<&str>, policy: &AccessPolicy) -> Self {
        let scope = match role {
            Some(role) => policy.scope_for(role),
            None => UnitScope::none(),
        };

        Self {
            identity: identity.into(),
            role: role.map(str::to_string),
            scope: Arc::new(scope),
        }
    }

    pub fn from_store(
        identity: &str,
        store: &dyn SessionStore,
        policy: &AccessPolicy,
    ) -> Result<Self, SessionError> {
        let role = store.load(identity)?;
        debug!(identity, has_role = role.is_some(), "session resumed");
        Ok(Self::resolve(identity, role.as_deref(), policy))
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn scope(&self) -> &UnitScope {
        &self.scope
    }

    pub fn filter<T: UnitScoped>(&self, records: Vec<T>) -> Vec<T> {
        filter(records, &self.scope)
    }

    pub fn available_units<I, S>(&self, all_units: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        available_units(all_units, &self.scope)
    }
}

/// Process-local store. Each write swaps in a new role value whole, so
/// concurrent readers see the old or the new role, never a partial one.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    roles: RwLock<HashMap<String, Arc<str>>>,
}

impl SessionStore for InMemorySessionStore {
    fn store(&self, identity: &str, role: &str) -> Result<(), SessionError> {
        let mut roles = self.roles.write().map_err(|_| SessionError::Poisoned)?;
        roles.insert(identity.to_string(), Arc::from(role));
        Ok(())
    }

    fn load(&self, identity: &str) -> Result<Option<String>, SessionError> {
        let roles = self.roles.read().map_err(|_| SessionError::Poisoned)?;
        Ok(roles.get(identity).map(|role| role.to_string()))
    }

    fn clear(&self, identity: &str) -> Result<(), SessionError> {
        let mut roles = self.roles.write().map_err(|_| SessionError::Poisoned)?;
        roles.remove(identity);
        Ok(())
    }
}

static STAGING_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// JSON file of identity -> role, rewritten through a temp file and rename.
///
/// Updates through one store (and its clones) are serialized. Separate
/// processes each stage into their own temp file, so the file is never torn,
/// but concurrent sign-ins from different processes are last-writer-wins.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    update: Arc<Mutex<()>>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            update: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        let sequence = STAGING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        staging.push(format!(".{}.{sequence}.tmp", std::process::id()));
        PathBuf::from(staging)
    }

    fn write_all(&self, sessions: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let staging = self.staging_path();
        let written = std::fs::write(&staging, serde_json::to_vec_pretty(sessions)?)
            .and_then(|()| std::fs::rename(&staging, &self.path));
        if written.is_err() {
            let _ = std::fs::remove_file(&staging);
        }
        Ok(written?)
    }

    fn update<F>(&self, apply: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.update.lock().map_err(|_| SessionError::Poisoned)?;
        let mut sessions = self.read_all()?;
        if apply(&mut sessions) {
            self.write_all(&sessions)?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn store(&self, identity: &str, role: &str) -> Result<(), SessionError> {
        self.update(|sessions| {
            sessions.insert(identity.to_string(), role.to_string());
            true
        })
    }

    fn load(&self, identity: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_all()?.remove(identity))
    }

    fn clear(&self, identity: &str) -> Result<(), SessionError> {
        self.update(|sessions| sessions.remove(identity).is_some())
    }
}
