use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, Thread},
    time::{Duration, Instant},
};

/// a latched request to stop, raised by the operator.
///
/// this must be created on the thread that will [`wait`](Interrupt::wait) on it.
pub struct Interrupt {
    trigger: Trigger,
}

/// raises an [`Interrupt`], waking its thread.
#[derive(Clone)]
pub struct Trigger {
    requested: Arc<AtomicBool>,
    waiter: Thread,
}

// === impl Interrupt ===

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    pub fn new() -> Self {
        Self {
            trigger: Trigger {
                requested: Arc::new(AtomicBool::new(false)),
                waiter: thread::current(),
            },
        }
    }

    /// raises this interrupt on SIGINT, SIGTERM, or SIGHUP.
    ///
    /// only one handler may be installed per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let trigger = self.trigger();
        ctrlc::set_handler(move || trigger.fire())
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger.clone()
    }

    pub fn requested(&self) -> bool {
        self.trigger.requested.load(Ordering::SeqCst)
    }

    /// sleeps for up to `timeout`, returning early if the interrupt is raised.
    ///
    /// returns `true` if the interrupt has been raised.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.requested() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            // parking may wake spuriously, so the deadline is checked again.
            thread::park_timeout(deadline - now);
        }
    }
}

// === impl Trigger ===

impl Trigger {
    pub fn fire(&self) {
        let Self { requested, waiter } = self;
        requested.store(true, Ordering::SeqCst);
        waiter.unpark();
    }
}
