//! Admission Controller
//!
//! Caps how many connections are served at once.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Counting semaphore over connection slots
///
/// `acquire` blocks while every slot is taken. Slots come back when the
/// returned [`Permit`] is dropped, which also happens while a panicking
/// worker unwinds.
#[derive(Debug)]
pub struct AdmissionController {
    /// Slots currently free
    available: Mutex<usize>,

    /// Signalled on every release
    released: Condvar,

    capacity: usize,
}

impl AdmissionController {
    /// Create a controller with `capacity` slots
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            available: Mutex::new(capacity),
            released: Condvar::new(),
            capacity,
        })
    }

    /// Take a slot, blocking until one is free
    pub fn acquire(self: &Arc<Self>) -> Permit {
        let mut available = self.available.lock();
        while *available == 0 {
            self.released.wait(&mut available);
        }
        *available -= 1;
        Permit {
            controller: Arc::clone(self),
        }
    }

    /// Take a slot if one is free right now
    pub fn try_acquire(self: &Arc<Self>) -> Option<Permit> {
        let mut available = self.available.lock();
        if *available == 0 {
            return None;
        }
        *available -= 1;
        Some(Permit {
            controller: Arc::clone(self),
        })
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        *self.available.lock()
    }

    /// Slots currently held
    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn release(&self) {
        let mut available = self.available.lock();
        debug_assert!(*available < self.capacity, "released more slots than acquired");
        *available += 1;
        drop(available);
        self.released.notify_one();
    }
}

/// One held slot; released on drop
#[derive(Debug)]
pub struct Permit {
    controller: Arc<AdmissionController>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.controller.release();
    }
}
