//! Single-owner dispatcher task and the periodic driver.
//!
//! The [`TurnQueue`] is owned by one tokio task. Every caller talks to it through a
//! [`DispatcherHandle`], which sends a command over a bounded channel and waits for the
//! reply, so admissions from any number of producers and advances from the driver are
//! applied one at a time, in arrival order.
//!
//! After each admission or advance the task publishes a fresh [`Board`] on a watch
//! channel; displays can [`subscribe`](DispatcherHandle::subscribe) instead of polling.
//!
//! The task stops once every handle has been dropped. The periodic driver only holds a
//! weak reference, so it never keeps the dispatcher alive on its own.

use crate::queue::{Board, Ticket, TurnQueue};
use crate::{DispatchConfig, Patient, TriageError, TriageResult};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Requests served by the dispatcher task.
#[derive(Debug)]
enum Command {
    Admit {
        patient: Patient,
        reply: oneshot::Sender<Ticket>,
    },
    Advance {
        reply: oneshot::Sender<Option<Ticket>>,
    },
    PeekNext {
        reply: oneshot::Sender<Option<Ticket>>,
    },
    PendingCount {
        reply: oneshot::Sender<usize>,
    },
    CurrentTurn {
        reply: oneshot::Sender<Option<Ticket>>,
    },
    Board {
        reply: oneshot::Sender<Board>,
    },
}

/// Owner of the turn queue for one dispatch point.
pub struct Dispatcher {
    queue: TurnQueue,
    commands: mpsc::Receiver<Command>,
    board: watch::Sender<Board>,
}

impl Dispatcher {
    /// Spawns the dispatcher task on the current tokio runtime.
    ///
    /// Returns a handle for callers and the task's join handle. The task finishes after
    /// the last [`DispatcherHandle`] is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(config: &DispatchConfig) -> (DispatcherHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer());
        let (board_tx, board_rx) = watch::channel(Board::default());

        let dispatcher = Self {
            queue: TurnQueue::new(),
            commands: command_rx,
            board: board_tx,
        };
        let task = tokio::spawn(dispatcher.run());

        let handle = DispatcherHandle {
            commands: command_tx,
            board: board_rx,
        };
        (handle, task)
    }

    /// Spawns the dispatcher together with a periodic driver advancing it every
    /// `config.advance_interval()`.
    ///
    /// The driver exits on its own once the dispatcher has stopped.
    pub fn spawn_with_driver(config: &DispatchConfig) -> (DispatcherHandle, JoinHandle<()>) {
        let (handle, task) = Self::spawn(config);
        spawn_periodic_advance(&handle, config);
        (handle, task)
    }

    async fn run(mut self) {
        info!("turn dispatcher started");

        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }

        info!(
            pending = self.queue.pending_count(),
            "turn dispatcher stopped"
        );
    }

    fn handle(&mut self, command: Command) {
        // A dropped reply receiver means the caller gave up waiting; the command still
        // took effect.
        match command {
            Command::Admit { patient, reply } => {
                let ticket = self.queue.admit(patient);
                self.publish();
                let _ = reply.send(ticket);
            }
            Command::Advance { reply } => {
                let current = self.queue.advance();
                self.publish();
                let _ = reply.send(current);
            }
            Command::PeekNext { reply } => {
                let _ = reply.send(self.queue.peek_next());
            }
            Command::PendingCount { reply } => {
                let _ = reply.send(self.queue.pending_count());
            }
            Command::CurrentTurn { reply } => {
                let _ = reply.send(self.queue.current_turn());
            }
            Command::Board { reply } => {
                let _ = reply.send(self.queue.board());
            }
        }
    }

    fn publish(&self) {
        self.board.send_replace(self.queue.board());
    }
}

/// Cloneable client for a running [`Dispatcher`].
#[derive(Clone, Debug)]
pub struct DispatcherHandle {
    commands: mpsc::Sender<Command>,
    board: watch::Receiver<Board>,
}

impl DispatcherHandle {
    /// Admits a scored patient and returns their ticket.
    pub async fn admit(&self, patient: Patient) -> TriageResult<Ticket> {
        request(&self.commands, |reply| Command::Admit { patient, reply }).await
    }

    /// Promotes the next patient. `Ok(None)` means nobody was waiting.
    pub async fn advance(&self) -> TriageResult<Option<Ticket>> {
        request(&self.commands, |reply| Command::Advance { reply }).await
    }

    pub async fn peek_next(&self) -> TriageResult<Option<Ticket>> {
        request(&self.commands, |reply| Command::PeekNext { reply }).await
    }

    pub async fn pending_count(&self) -> TriageResult<usize> {
        request(&self.commands, |reply| Command::PendingCount { reply }).await
    }

    pub async fn current_turn(&self) -> TriageResult<Option<Ticket>> {
        request(&self.commands, |reply| Command::CurrentTurn { reply }).await
    }

    /// Current turn, next turn and pending count read in one step.
    pub async fn board(&self) -> TriageResult<Board> {
        request(&self.commands, |reply| Command::Board { reply }).await
    }

    /// Receiver that is notified after every admission and advance.
    pub fn subscribe(&self) -> watch::Receiver<Board> {
        self.board.clone()
    }
}

async fn request<T>(
    commands: &mpsc::Sender<Command>,
    command: impl FnOnce(oneshot::Sender<T>) -> Command,
) -> TriageResult<T> {
    let (reply, response) = oneshot::channel();
    commands
        .send(command(reply))
        .await
        .map_err(|_| TriageError::DispatcherClosed)?;
    response.await.map_err(|_| TriageError::DispatcherClosed)
}

/// Spawns a task that advances the dispatcher every `config.advance_interval()`.
///
/// The first advance happens one full interval after spawning. Ticks that fall behind
/// are delayed rather than bursted. An empty line is not an error; the loop keeps going
/// until the dispatcher has stopped.
pub fn spawn_periodic_advance(
    handle: &DispatcherHandle,
    config: &DispatchConfig,
) -> JoinHandle<()> {
    let commands = handle.commands.downgrade();
    let every = config.advance_interval();

    tokio::spawn(async move {
        let now = Instant::now();
        let start = now.checked_add(every).unwrap_or_else(|| {
            warn!(?every, "advance interval overflows the clock; ticking from now");
            now
        });
        let mut ticker = time::interval_at(start, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(sender) = commands.upgrade() else {
                break;
            };

            match request(&sender, |reply| Command::Advance { reply }).await {
                Ok(Some(ticket)) => info!(
                    ticket = ticket.number(),
                    patient = %ticket.patient().name(),
                    priority = ticket.patient().priority(),
                    "now serving"
                ),
                Ok(None) => debug!("no patients waiting"),
                Err(_) => break,
            }
        }

        debug!("periodic driver stopped");
    })
}
