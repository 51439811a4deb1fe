use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::network::Packet;
use crate::time::Time;

/// A packet that will be put on the network once `due` has passed
#[derive(Debug, Clone)]
pub struct ScheduledPacket {
    packet: Packet,
    due: Time,
    sequence: u64,
}

impl ScheduledPacket {
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn due(&self) -> Time {
        self.due
    }
}

// Ordered by due time, then by the order they were scheduled in
impl PartialEq for ScheduledPacket {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.sequence) == (other.due, other.sequence)
    }
}

impl Eq for ScheduledPacket {}

impl PartialOrd for ScheduledPacket {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledPacket {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.sequence).cmp(&(other.due, other.sequence))
    }
}

/// Holds delayed responses until they are due
#[derive(Debug, Default)]
pub struct ResponseScheduler {
    pending: BinaryHeap<Reverse<ScheduledPacket>>,
    next_sequence: u64,
}

impl ResponseScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, packet: Packet, due: Time) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        log::trace!("Scheduling {} for {due}", packet.id());
        self.pending.push(Reverse(ScheduledPacket {
            packet,
            due,
            sequence,
        }));
    }

    /// Remove and return every packet that is due at `now`
    ///
    /// Packets come out ordered by due time; ties keep scheduling order.
    pub fn collect_due(&mut self, now: Time) -> Vec<Packet> {
        let mut due = vec![];

        while let Some(Reverse(next)) = self.pending.peek() {
            if next.due > now {
                break;
            }

            if let Some(Reverse(scheduled)) = self.pending.pop() {
                due.push(scheduled.packet);
            }
        }

        due
    }

    /// When the next packet becomes due (if any)
    pub fn next_due(&self) -> Option<Time> {
        self.pending.peek().map(|Reverse(next)| next.due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
