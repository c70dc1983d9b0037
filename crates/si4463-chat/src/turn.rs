//! Alternating ownership of the radio between a sender and a receiver.
//!
//! The receiver owns the link by default and keeps it listening. When the
//! sender has something to transmit it raises a flag and waits; the
//! receiver notices the flag between status reads, hands the link over and
//! waits in turn until the sender gives it back. At most one role drives the
//! chip at any time and handoffs strictly alternate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{Role, TurnError};

/// Configuration for turn handoffs.
#[derive(Debug, Clone, Default)]
pub struct TurnConfig {
    /// Longest a role waits for the other to hand the link over.
    /// `None` waits forever.
    pub handoff_timeout: Option<Duration>,
}

#[derive(Debug)]
struct TurnState {
    holder: Role,
    cycles: u64,
    sender_closed: bool,
    receiver_closed: bool,
}

impl TurnState {
    fn closed(&self, role: Role) -> bool {
        match role {
            Role::Sender => self.sender_closed,
            Role::Receiver => self.receiver_closed,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<TurnState>,
    changed: Condvar,
    give_up: AtomicBool,
    config: TurnConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TurnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until `holder == want`, the peer closes, or the timeout expires.
    ///
    /// The lock is handed back either way so the caller can settle the
    /// outcome before anyone else sees the state.
    fn wait_for<'a>(
        &'a self,
        mut state: MutexGuard<'a, TurnState>,
        want: Role,
        peer: Role,
    ) -> (MutexGuard<'a, TurnState>, Result<(), TurnError>) {
        let deadline = self.config.handoff_timeout.map(|t| (t, Instant::now() + t));
        loop {
            if state.holder == want {
                return (state, Ok(()));
            }
            if state.closed(peer) {
                return (state, Err(TurnError::PeerGone(peer)));
            }
            state = match deadline {
                None => self
                    .changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some((timeout, deadline)) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return (state, Err(TurnError::CoordinationTimeout(timeout)));
                    }
                    self.changed
                        .wait_timeout(state, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    fn close(&self, role: Role) {
        let mut state = self.lock();
        match role {
            Role::Sender => state.sender_closed = true,
            Role::Receiver => state.receiver_closed = true,
        }
        if role == Role::Sender {
            self.give_up.store(false, Ordering::SeqCst);
        }
        debug!(%role, "turn handle closed");
        self.changed.notify_all();
    }
}

/// Shared turn state for one sender/receiver pair.
#[derive(Debug)]
pub struct TurnCoordinator {
    shared: Arc<Shared>,
}

impl TurnCoordinator {
    /// Create a coordinator with the receiver holding the link.
    pub fn new(config: TurnConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(TurnState {
                    holder: Role::Receiver,
                    cycles: 0,
                    sender_closed: false,
                    receiver_closed: false,
                }),
                changed: Condvar::new(),
                give_up: AtomicBool::new(false),
                config,
            }),
        }
    }

    /// Hand out the two role handles.
    pub fn split(self) -> (SenderTurn, ReceiverTurn) {
        (
            SenderTurn {
                shared: Arc::clone(&self.shared),
            },
            ReceiverTurn {
                shared: self.shared,
            },
        )
    }
}

impl Default for TurnCoordinator {
    fn default() -> Self {
        Self::new(TurnConfig::default())
    }
}

/// The sender's side of the link.
#[derive(Debug)]
pub struct SenderTurn {
    shared: Arc<Shared>,
}

impl SenderTurn {
    /// Ask the receiver for the link and wait until it yields.
    ///
    /// The returned guard hands the link back when released or dropped.
    pub fn claim(&mut self) -> Result<TurnGuard<'_>, TurnError> {
        self.shared.give_up.store(true, Ordering::SeqCst);
        trace!("sender requested the link");

        let outcome = {
            let state = self.shared.lock();
            let (state, outcome) = self.shared.wait_for(state, Role::Sender, Role::Receiver);
            if outcome.is_err() {
                // The receiver never yielded, so it still holds the link.
                self.shared.give_up.store(false, Ordering::SeqCst);
            }
            outcome.map(|()| state.cycles)
        };
        let cycle = outcome?;
        debug!(cycle, "sender holds the link");
        Ok(TurnGuard { turn: self })
    }

    /// Completed send cycles so far.
    pub fn cycles(&self) -> u64 {
        self.shared.lock().cycles
    }
}

impl Drop for SenderTurn {
    fn drop(&mut self) {
        self.shared.close(Role::Sender);
    }
}

/// Proof that the sender holds the link.
#[derive(Debug)]
pub struct TurnGuard<'a> {
    turn: &'a mut SenderTurn,
}

impl TurnGuard<'_> {
    /// Hand the link back to the receiver.
    pub fn release(self) {}
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        let shared = &self.turn.shared;
        let mut state = shared.lock();
        shared.give_up.store(false, Ordering::SeqCst);
        state.holder = Role::Receiver;
        state.cycles += 1;
        debug!(cycle = state.cycles, "sender released the link");
        shared.changed.notify_all();
    }
}

/// The receiver's side of the link.
#[derive(Debug)]
pub struct ReceiverTurn {
    shared: Arc<Shared>,
}

impl ReceiverTurn {
    /// True when the sender is waiting for the link.
    pub fn should_yield(&self) -> bool {
        self.shared.give_up.load(Ordering::SeqCst)
    }

    /// Hand the link to the sender and wait until it comes back.
    pub fn yield_turn(&mut self) -> Result<(), TurnError> {
        let mut state = self.shared.lock();
        if state.sender_closed {
            return Err(TurnError::PeerGone(Role::Sender));
        }
        if !self.should_yield() {
            // Nobody asked, or the sender gave up waiting.
            return Ok(());
        }
        state.holder = Role::Sender;
        trace!("receiver yielded the link");
        self.shared.changed.notify_all();

        let (state, outcome) = self.shared.wait_for(state, Role::Receiver, Role::Sender);
        outcome?;
        trace!(cycle = state.cycles, "receiver holds the link");
        Ok(())
    }

    /// Completed send cycles so far.
    pub fn cycles(&self) -> u64 {
        self.shared.lock().cycles
    }
}

impl Drop for ReceiverTurn {
    fn drop(&mut self) {
        self.shared.close(Role::Receiver);
    }
}
