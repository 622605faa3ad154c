//! Promise: single-threaded deferred results
//!
//! A promise settles at most once, to either a fulfilment value or a
//! rejection reason. It can be awaited from any number of places; every
//! waiter observes the same outcome. Waking happens on the executor's next
//! turn, never inline with the settling call.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::value::Value;

/// Outcome of a settled promise: `Ok(value)` or `Err(reason)`
pub type Settlement = Result<Value, Value>;

struct PromiseState {
    outcome: Option<Settlement>,
    waiters: Vec<Waker>,
}

/// Shared handle to a deferred result. Cloning shares the promise.
#[derive(Clone)]
pub struct Promise(Rc<RefCell<PromiseState>>);

/// Capability to settle a [`Promise`]. Only the first settle call wins.
#[derive(Clone)]
pub struct Resolver(Promise);

impl Promise {
    /// Create a pending promise and its resolver.
    pub fn pending() -> (Promise, Resolver) {
        let promise = Promise(Rc::new(RefCell::new(PromiseState {
            outcome: None,
            waiters: Vec::new(),
        })));
        let resolver = Resolver(promise.clone());
        (promise, resolver)
    }

    /// Already fulfilled promise
    pub fn resolved(value: Value) -> Promise {
        let (promise, resolver) = Promise::pending();
        resolver.resolve(value);
        promise
    }

    /// Already rejected promise
    pub fn rejected(reason: Value) -> Promise {
        let (promise, resolver) = Promise::pending();
        resolver.reject(reason);
        promise
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Still waiting for an outcome
    pub fn is_pending(&self) -> bool {
        self.0.borrow().outcome.is_none()
    }

    /// Outcome, if settled
    pub fn outcome(&self) -> Option<Settlement> {
        self.0.borrow().outcome.clone()
    }

    fn settle(&self, outcome: Settlement) -> bool {
        let waiters = {
            let mut state = self.0.borrow_mut();
            if state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(outcome);
            std::mem::take(&mut state.waiters)
        };
        for waker in waiters {
            waker.wake();
        }
        true
    }
}

impl Resolver {
    /// Fulfil the promise. Returns `false` if it was already settled.
    pub fn resolve(&self, value: Value) -> bool {
        self.0.settle(Ok(value))
    }

    /// Reject the promise. Returns `false` if it was already settled.
    pub fn reject(&self, reason: Value) -> bool {
        self.0.settle(Err(reason))
    }

    /// The promise this resolver settles
    pub fn promise(&self) -> &Promise {
        &self.0
    }
}

impl Future for Promise {
    type Output = Settlement;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.0.borrow_mut();
        match &state.outcome {
            Some(outcome) => Poll::Ready(outcome.clone()),
            None => {
                if !state.waiters.iter().any(|w| w.will_wake(cx.waker())) {
                    state.waiters.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().outcome {
            None => write!(f, "Promise {{ <pending> }}"),
            Some(Ok(v)) => write!(f, "Promise {{ {:?} }}", v),
            Some(Err(e)) => write!(f, "Promise {{ <rejected> {:?} }}", e),
        }
    }
}
