use abacus_common::{CalculatorConfig, parse_operand};
use abacus_history::{Calculation, CalculatorMemento, HistoryStore};
use abacus_ops::{Operation, OperationRegistry};
use rust_decimal::Decimal;

use crate::error::CalculatorError;
use crate::observer::{HistoryObserver, ObserverHandle};

/// Calculator with undo/redo over history snapshots.
///
/// Every successful operation pushes a memento of the history as it was
/// before the operation, so `undo()` restores it and `redo()` re-applies the
/// undone state.
pub struct Calculator {
    config: CalculatorConfig,
    registry: OperationRegistry,
    store: HistoryStore,
    history: Vec<Calculation>,
    undo_stack: Vec<CalculatorMemento>,
    redo_stack: Vec<CalculatorMemento>,
    observers: Vec<(ObserverHandle, Box<dyn HistoryObserver>)>,
    next_observer: u64,
}

impl Calculator {
    /// Create a calculator with the built-in operations.
    pub fn new(config: CalculatorConfig) -> Result<Self, CalculatorError> {
        Self::with_registry(config, OperationRegistry::with_builtins())
    }

    /// Create a calculator resolving operations through `registry`.
    pub fn with_registry(
        config: CalculatorConfig,
        registry: OperationRegistry,
    ) -> Result<Self, CalculatorError> {
        config.validate()?;
        let store = HistoryStore::new(config.history_file());
        Ok(Self {
            config,
            registry,
            store,
            history: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            observers: Vec::new(),
            next_observer: 0,
        })
    }

    /// Parse the operands, run the named operation and record it.
    ///
    /// Returns the result. On any error the calculator state is unchanged.
    pub fn perform_operation(
        &mut self,
        operation: &str,
        operand1: &str,
        operand2: &str,
    ) -> Result<Decimal, CalculatorError> {
        let limit = self.config.max_input_value;
        let a = parse_operand(operand1, limit)?;
        let b = parse_operand(operand2, limit)?;
        let calculation = Calculation::new(&self.registry, operation, a, b)?;
        let result = calculation.result();

        self.undo_stack.push(CalculatorMemento::capture(&self.history));
        if self.undo_stack.len() > self.config.max_history_size {
            let excess = self.undo_stack.len() - self.config.max_history_size;
            self.undo_stack.drain(..excess);
        }
        self.history.push(calculation);
        if self.history.len() > self.config.max_history_size {
            let excess = self.history.len() - self.config.max_history_size;
            self.history.drain(..excess);
        }
        self.redo_stack.clear();

        tracing::debug!(
            operation,
            %result,
            history = self.history.len(),
            undo = self.undo_stack.len(),
            "operation performed"
        );
        self.notify_observers();
        Ok(result)
    }

    /// Restore the history as it was before the last operation.
    pub fn undo(&mut self) -> Result<(), CalculatorError> {
        let memento = self.undo_stack.pop().ok_or(CalculatorError::NothingToUndo)?;
        let current = std::mem::replace(&mut self.history, memento.into_history());
        self.redo_stack.push(CalculatorMemento::from_history(current));
        tracing::debug!(history = self.history.len(), "undo");
        Ok(())
    }

    /// Re-apply the last undone state.
    pub fn redo(&mut self) -> Result<(), CalculatorError> {
        let memento = self.redo_stack.pop().ok_or(CalculatorError::NothingToRedo)?;
        let current = std::mem::replace(&mut self.history, memento.into_history());
        self.undo_stack.push(CalculatorMemento::from_history(current));
        tracing::debug!(history = self.history.len(), "redo");
        Ok(())
    }

    /// Drop the history and both undo/redo stacks.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        tracing::info!("history cleared");
    }

    /// Numbered, human-readable history entries in chronological order.
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted.
    pub fn show_history(&self) -> impl Iterator<Item = String> + Clone + '_ {
        self.history
            .iter()
            .enumerate()
            .map(|(index, calculation)| format!("{}. {calculation}", index + 1))
    }

    /// Write the current history to the configured history file.
    pub fn save_history(&self) -> Result<(), CalculatorError> {
        self.store.save(&self.snapshot())?;
        tracing::info!(path = %self.store.path().display(), "history saved");
        Ok(())
    }

    /// Replace the history with the contents of the history file.
    ///
    /// A missing file loads as an empty history. Both undo/redo stacks are
    /// reset. On error the in-memory state is unchanged.
    pub fn load_history(&mut self) -> Result<(), CalculatorError> {
        let mut history = self.store.load(&self.registry)?.into_history();
        if history.len() > self.config.max_history_size {
            let excess = history.len() - self.config.max_history_size;
            history.drain(..excess);
        }
        self.history = history;
        self.undo_stack.clear();
        self.redo_stack.clear();
        tracing::info!(
            path = %self.store.path().display(),
            entries = self.history.len(),
            "history loaded"
        );
        Ok(())
    }

    /// Register an observer; it is notified after observers added earlier.
    pub fn add_observer(&mut self, observer: impl HistoryObserver + 'static) -> ObserverHandle {
        let handle = ObserverHandle(self.next_observer);
        self.next_observer += 1;
        tracing::debug!(observer = observer.name(), "observer added");
        self.observers.push((handle, Box::new(observer)));
        handle
    }

    /// Unregister an observer. Returns false if the handle was unknown.
    pub fn remove_observer(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(h, _)| *h != handle);
        self.observers.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Register a new operation kind at runtime.
    pub fn register_operation(
        &mut self,
        name: &str,
        operation: impl Operation + 'static,
    ) -> Result<(), CalculatorError> {
        self.registry.register(name, operation)?;
        Ok(())
    }

    /// A memento of the current history.
    pub fn snapshot(&self) -> CalculatorMemento {
        CalculatorMemento::capture(&self.history)
    }

    /// The live history, oldest first.
    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    /// The configuration this calculator was built with.
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Operations available to `perform_operation`.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Number of states on the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of states on the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether there is a state to undo to.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is a state to redo to.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn notify_observers(&mut self) {
        let Some(calculation) = self.history.last() else {
            return;
        };
        for (_, observer) in &mut self.observers {
            if let Err(e) = observer.notify(calculation, &self.history) {
                tracing::warn!(observer = observer.name(), error = %e, "observer failed");
            }
        }
    }
}
