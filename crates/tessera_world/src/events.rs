//! # World Events
//!
//! Notifications the world emits toward its collaborators.
//!
//! - **Chunk changed**: a query window tore down and the chunk was modified
//!   (or force-notified). Renderers and persistence react to this.
//! - **Active cell changed**: a cell write touched a type flagged `active`.
//!   The payload is whatever the integration layer attached to the write.
//!
//! Delivery is up to the [`WorldObserver`] implementation. The core never
//! waits for, or reads anything back from, an observer.

use crossbeam_channel::{Receiver, Sender};

use crate::coord::{CellPos, ChunkCoord};

/// Receives world notifications.
pub trait WorldObserver {
    /// Opaque value passed through with active-cell notifications.
    type Payload;

    /// A chunk's contents changed.
    fn on_chunk_changed(&mut self, coord: ChunkCoord);

    /// A cell of an active type was written at a world position.
    fn on_active_cell_changed(&mut self, pos: CellPos, new_type: u16, payload: Option<&Self::Payload>);
}

/// Observer that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl WorldObserver for NullObserver {
    type Payload = ();

    fn on_chunk_changed(&mut self, _coord: ChunkCoord) {}

    fn on_active_cell_changed(&mut self, _pos: CellPos, _new_type: u16, _payload: Option<&()>) {}
}

/// A recorded notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent<P = ()> {
    /// See [`WorldObserver::on_chunk_changed`].
    ChunkChanged(ChunkCoord),
    /// See [`WorldObserver::on_active_cell_changed`].
    ActiveCellChanged {
        /// World position.
        pos: CellPos,
        /// Type after the write.
        new_type: u16,
        /// Payload attached to the write.
        payload: Option<P>,
    },
}

/// Observer that records every notification in order.
#[derive(Clone, Debug)]
pub struct EventLog<P = ()> {
    /// Events in emission order.
    pub events: Vec<WorldEvent<P>>,
}

impl<P> EventLog<P> {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Coordinates of every chunk-changed event, in order.
    #[must_use]
    pub fn changed_chunks(&self) -> Vec<ChunkCoord> {
        self.events
            .iter()
            .filter_map(|event| match event {
                WorldEvent::ChunkChanged(coord) => Some(*coord),
                WorldEvent::ActiveCellChanged { .. } => None,
            })
            .collect()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&mut self) -> Vec<WorldEvent<P>> {
        std::mem::take(&mut self.events)
    }
}

impl<P> Default for EventLog<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> WorldObserver for EventLog<P> {
    type Payload = P;

    fn on_chunk_changed(&mut self, coord: ChunkCoord) {
        self.events.push(WorldEvent::ChunkChanged(coord));
    }

    fn on_active_cell_changed(&mut self, pos: CellPos, new_type: u16, payload: Option<&P>) {
        self.events.push(WorldEvent::ActiveCellChanged {
            pos,
            new_type,
            payload: payload.cloned(),
        });
    }
}

/// Observer that forwards notifications over a channel.
///
/// Sends never block the world. If the receiving side is gone the event is
/// dropped with a trace message.
#[derive(Clone, Debug)]
pub struct ChannelObserver<P = ()> {
    sender: Sender<WorldEvent<P>>,
}

impl<P> ChannelObserver<P> {
    /// Creates an observer plus the receiver its events arrive on.
    #[must_use]
    pub fn unbounded() -> (Self, Receiver<WorldEvent<P>>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Wraps an existing sender.
    #[must_use]
    pub fn new(sender: Sender<WorldEvent<P>>) -> Self {
        Self { sender }
    }

    fn send(&self, event: WorldEvent<P>) {
        if self.sender.try_send(event).is_err() {
            tracing::trace!("world event dropped, receiver gone or full");
        }
    }
}

impl<P: Clone> WorldObserver for ChannelObserver<P> {
    type Payload = P;

    fn on_chunk_changed(&mut self, coord: ChunkCoord) {
        self.send(WorldEvent::ChunkChanged(coord));
    }

    fn on_active_cell_changed(&mut self, pos: CellPos, new_type: u16, payload: Option<&P>) {
        self.send(WorldEvent::ActiveCellChanged {
            pos,
            new_type,
            payload: payload.cloned(),
        });
    }
}
