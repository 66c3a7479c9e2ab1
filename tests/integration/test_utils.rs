//! Shared test utilities for integration tests
//!
//! Settings loading reads HOME, XDG_CONFIG_HOME and CLUSTERCONF_* variables from the
//! process environment. Tests touching them go through `with_isolated_env`.

use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(String, Option<String>)>,
}

impl EnvState {
    fn capture() -> Self {
        let mut names: Vec<String> = vec![
            "HOME".to_string(),
            "XDG_CONFIG_HOME".to_string(),
            "CLUSTERCONF_ENV".to_string(),
        ];
        names.extend(
            std::env::vars()
                .map(|(k, _)| k)
                .filter(|k| k.starts_with("CLUSTERCONF__")),
        );
        let vars = names
            .into_iter()
            .map(|name| {
                let value = std::env::var(&name).ok();
                (name, value)
            })
            .collect();
        Self { vars }
    }

    fn restore(self) {
        let leaked: Vec<String> = std::env::vars()
            .map(|(k, _)| k)
            .filter(|k| k.starts_with("CLUSTERCONF__"))
            .collect();
        for name in leaked {
            std::env::remove_var(name);
        }
        for (name, value) in self.vars {
            match value {
                Some(v) => std::env::set_var(&name, v),
                None => std::env::remove_var(&name),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir` and every
/// CLUSTERCONF_* variable cleared. The original environment is restored afterwards.
///
/// Layout: `<test_dir>/xdg` is the config home, `<test_dir>/home` is HOME.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let config_home = test_dir.path().join("xdg");
    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&config_home).unwrap();
    std::fs::create_dir_all(&home).unwrap();

    for (name, _) in &env_state.vars {
        if name.starts_with("CLUSTERCONF") {
            std::env::remove_var(name);
        }
    }
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    env_state.restore();

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
