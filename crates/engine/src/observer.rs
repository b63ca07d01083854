use abacus_common::CalculatorConfig;
use abacus_history::{Calculation, CalculatorMemento, HistoryStore, StoreError};

/// Errors an observer may report. The engine logs them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Other(String),
}

/// Identifies a registered observer for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(pub(crate) u64);

/// Notified synchronously after each successful operation.
pub trait HistoryObserver {
    fn name(&self) -> &str;

    /// `calculation` is the newest entry; `history` is the full live history
    /// including it.
    fn notify(
        &mut self,
        calculation: &Calculation,
        history: &[Calculation],
    ) -> Result<(), ObserverError>;
}

/// Emits one structured log event per calculation.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl HistoryObserver for LoggingObserver {
    fn name(&self) -> &str {
        "logging"
    }

    fn notify(
        &mut self,
        calculation: &Calculation,
        _history: &[Calculation],
    ) -> Result<(), ObserverError> {
        tracing::info!(
            operation = calculation.operation(),
            operand1 = %calculation.operand1(),
            operand2 = %calculation.operand2(),
            result = %calculation.result(),
            "calculation performed"
        );
        Ok(())
    }
}

/// Writes the whole history to its store after every operation.
#[derive(Debug)]
pub struct AutoSaveObserver {
    store: HistoryStore,
    enabled: bool,
}

impl AutoSaveObserver {
    /// Always-on autosave into `store`, independent of any configuration.
    pub fn new(store: HistoryStore) -> Self {
        Self {
            store,
            enabled: true,
        }
    }

    /// Save to the configured history file, honoring `auto_save`.
    pub fn from_config(config: &CalculatorConfig) -> Self {
        Self {
            store: HistoryStore::new(config.history_file()),
            enabled: config.auto_save,
        }
    }

    /// Whether notifications write to the store.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl HistoryObserver for AutoSaveObserver {
    fn name(&self) -> &str {
        "autosave"
    }

    fn notify(
        &mut self,
        _calculation: &Calculation,
        history: &[Calculation],
    ) -> Result<(), ObserverError> {
        if !self.enabled {
            return Ok(());
        }
        self.store.save(&CalculatorMemento::capture(history))?;
        tracing::debug!(path = %self.store.path().display(), "history auto-saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abacus_ops::OperationRegistry;
    use rust_decimal::Decimal;

    fn one_calculation() -> Vec<Calculation> {
        let registry = OperationRegistry::with_builtins();
        vec![Calculation::new(&registry, "add", Decimal::from(2), Decimal::from(3)).unwrap()]
    }

    #[test]
    fn logging_observer_never_fails() {
        let history = one_calculation();
        let mut observer = LoggingObserver;
        assert!(observer.notify(&history[0], &history).is_ok());
    }

    #[test]
    fn autosave_writes_history() {
        let tmp = tempfile::tempdir().unwrap();
        let config = CalculatorConfig::with_history_dir(tmp.path());
        let mut observer = AutoSaveObserver::from_config(&config);
        let history = one_calculation();

        observer.notify(&history[0], &history).unwrap();

        let loaded = HistoryStore::new(config.history_file())
            .load(&OperationRegistry::with_builtins())
            .unwrap();
        assert_eq!(loaded.history(), history.as_slice());
    }

    #[test]
    fn autosave_disabled_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let config = CalculatorConfig {
            auto_save: false,
            ..CalculatorConfig::with_history_dir(tmp.path())
        };
        let mut observer = AutoSaveObserver::from_config(&config);
        assert!(!observer.is_enabled());
        let history = one_calculation();

        observer.notify(&history[0], &history).unwrap();
        assert!(!config.history_file().exists());
    }

    #[test]
    fn autosave_into_explicit_store() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("elsewhere").join("saved.csv");
        let mut observer = AutoSaveObserver::new(HistoryStore::new(&path));
        assert!(observer.is_enabled());
        let history = one_calculation();

        observer.notify(&history[0], &history).unwrap();

        let loaded = HistoryStore::new(&path)
            .load(&OperationRegistry::with_builtins())
            .unwrap();
        assert_eq!(loaded.history(), history.as_slice());
    }
}
