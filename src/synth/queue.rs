use std::collections::VecDeque;

use crate::{
    error::{Result, SamplerError},
    io::midi::MidiMessage,
};

/*
Block-Scoped MIDI Queue
=======================

Events arrive tagged with a frame offset relative to the start of the block
that is about to be rendered. The render loop walks the block one frame at a
time and, at frame `s`, consumes every queued event with `offset <= s`.

    offsets   2   2   5        8
    frames  ──┼───┼───┼────────┼──────────  block of N
              └ FIFO among equal offsets

After the block, flush(N) drops what was consumed (offset < N) and moves the
remaining events N frames earlier, so an event scheduled at frame N + 3 of
this block becomes frame 3 of the next one.

Capacity is fixed at resize() time (the block size) and add() never grows
it, so the audio thread never allocates. Inserting into a full queue is an
error and the event is lost.
*/

#[derive(Debug)]
pub struct MidiQueue {
    events: VecDeque<MidiMessage>,
    capacity: usize,
}

impl MidiQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert keeping offsets ascending; equal offsets stay in arrival order.
    pub fn add(&mut self, msg: MidiMessage) -> Result<()> {
        if self.events.len() >= self.capacity {
            return Err(SamplerError::MidiQueueFull {
                capacity: self.capacity,
            });
        }

        let index = self.events.partition_point(|queued| queued.offset <= msg.offset);
        self.events.insert(index, msg);
        Ok(())
    }

    /// Earliest event, if any.
    #[inline]
    pub fn peek(&self) -> Option<&MidiMessage> {
        self.events.front()
    }

    /// Drop the earliest event.
    #[inline]
    pub fn remove(&mut self) -> Option<MidiMessage> {
        self.events.pop_front()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Set the capacity to `capacity` events. Allocates; never call this
    /// from the render callback.
    ///
    /// Shrinking below the current length keeps the earliest events.
    pub fn resize(&mut self, capacity: usize) {
        self.events.truncate(capacity);
        if capacity > self.events.capacity() {
            self.events.reserve_exact(capacity - self.events.len());
        } else {
            self.events.shrink_to(capacity);
        }
        self.capacity = capacity;
    }

    /// Discard events before frame `frames` and renormalize the rest to the
    /// next block.
    pub fn flush(&mut self, frames: u32) {
        if frames == 0 {
            return;
        }

        while self.events.front().is_some_and(|msg| msg.offset < frames) {
            self.events.pop_front();
        }

        for msg in self.events.iter_mut() {
            msg.offset -= frames;
        }
    }
}
