use std::cell::RefCell;

/// A reset callback. Each one owns whatever handles it needs; the
/// registry just replays them in registration order.
pub type ResetFn = Box<dyn Fn()>;

/// Machine-wide reset sequencing.
///
/// Subsystems that must reprogram guest state on every reset (power-on
/// included) register a callback here once, at machine construction.
/// `reset_all` is driven by the machine whenever the guest or the host
/// asks for a reset.
#[derive(Default)]
pub struct ResetRegistry {
    handlers: RefCell<Vec<ResetFn>>,
}

impl ResetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, f: ResetFn) {
        self.handlers.borrow_mut().push(f);
    }

    /// Invoke every registered callback, oldest first.
    pub fn reset_all(&self) {
        for f in self.handlers.borrow().iter() {
            f();
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}
