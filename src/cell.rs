//! Reactive value slot.
//!
//! `Cell<T>` is a mutable container that remembers its current value and
//! pushes every replacement to its subscribers synchronously. A new
//! subscriber is called immediately with the current value, then on every
//! subsequent `set`. Cloning a `Cell` produces another handle to the same
//! slot, which is how column and configuration fields can be shared
//! ("aliased") across several owners.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

struct CellInner<T> {
    value: T,
    observers: Vec<(u64, Rc<dyn Fn(&T)>)>,
    next_observer_id: u64,
    /// True while a notification pass is running. A `set` arriving during
    /// the pass is queued instead of recursing.
    notifying: bool,
    deferred: VecDeque<T>,
}

/// Observable value slot with replay-on-subscribe semantics.
pub struct Cell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Cell {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Cell<T> {
    pub fn new(value: T) -> Self {
        Cell {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                observers: Vec::new(),
                next_observer_id: 0,
                notifying: false,
                deferred: VecDeque::new(),
            })),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replaces the value and synchronously notifies all subscribers in
    /// subscription order. A re-entrant `set` issued from inside a
    /// subscriber of this same cell is deferred until the in-progress
    /// notification pass has finished.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.notifying {
                inner.deferred.push_back(value);
                return;
            }
            inner.value = value;
            inner.notifying = true;
        }
        self.run_notifications();
    }

    /// `set` that skips notification when the new value equals the current
    /// one. Used for derived numeric cells to avoid redundant downstream
    /// recomputation.
    pub fn set_if_changed(&self, value: T)
    where
        T: PartialEq,
    {
        if self.inner.borrow().value == value {
            return;
        }
        self.set(value);
    }

    /// Registers an observer. It is invoked immediately with the current
    /// value, then on every subsequent `set`. Dropping the returned
    /// `Subscription` stops further notifications.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let observer: Rc<dyn Fn(&T)> = Rc::new(observer);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_observer_id;
            inner.next_observer_id += 1;
            inner.observers.push((id, Rc::clone(&observer)));
            id
        };

        // Replay the current value without holding the borrow, so the
        // observer is free to call back into this cell.
        let current = self.inner.borrow().value.clone();
        observer(&current);

        let weak: Weak<RefCell<CellInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().observers.retain(|(oid, _)| *oid != id);
                }
            })),
        }
    }

    /// Number of live subscribers.
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Returns true if both handles point at the same underlying slot.
    pub fn same_slot(&self, other: &Cell<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn run_notifications(&self) {
        loop {
            let (value, observers) = {
                let inner = self.inner.borrow();
                let observers: Vec<Rc<dyn Fn(&T)>> =
                    inner.observers.iter().map(|(_, o)| Rc::clone(o)).collect();
                (inner.value.clone(), observers)
            };
            for observer in observers {
                observer(&value);
            }

            let mut inner = self.inner.borrow_mut();
            match inner.deferred.pop_front() {
                Some(next) => inner.value = next,
                None => {
                    inner.notifying = false;
                    return;
                }
            }
        }
    }
}

/// Handle to an active observer registration. Unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
