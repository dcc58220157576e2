use worldsync_common::{EventId, ID_COUNTER_MAX, ObjectId, ProcessId};

/// Hands out object and event ids for one process.
///
/// Objects and events draw from the same counter. The counter starts at 1 so
/// that a raw `0` on the wire can mean "no object", and stops at
/// [`ID_COUNTER_MAX`]: once exhausted every allocation returns `None`
/// instead of reusing an id.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    process: ProcessId,
    next: u32,
}

impl IdAllocator {
    pub fn new(process: ProcessId) -> Self {
        Self { process, next: 1 }
    }

    fn bump(&mut self) -> Option<u32> {
        if self.next > ID_COUNTER_MAX {
            return None;
        }
        let counter = self.next;
        self.next += 1;
        Some(counter)
    }

    pub fn object(&mut self) -> Option<ObjectId> {
        self.bump().map(|c| ObjectId::compose(self.process, c))
    }

    pub fn event(&mut self) -> Option<EventId> {
        self.bump().map(|c| EventId::compose(self.process, c))
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }

    pub fn is_exhausted(&self) -> bool {
        self.next > ID_COUNTER_MAX
    }
}
