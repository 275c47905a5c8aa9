//! The physical frame table and the clock (second-chance) replacement
//! algorithm (spec.md §4.4).

use crate::common::Pid;
use crate::process::ProcessPool;

/// How a reference was placed into a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The frame was unoccupied.
    Free,
    /// An unmodified resident page was evicted.
    Clean,
    /// A modified resident page was evicted.
    Dirty,
}

/// A non-owning handle to the page table entry currently occupying a
/// frame: the owning process and that process's entry index.
///
/// Mirrors the teacher's preference for index-based handles over raw
/// pointers (`FrameOccupant` replaces the original tool's
/// `PageTableEntry*` stored directly in the frame table).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameOccupant {
    /// Process that owns the entry resident in this frame.
    pub pid: Pid,
    /// Index of the entry within that process's page table.
    pub entry_index: usize,
}

/// The physical frame table shared by every process in memory-management
/// mode, with a circular clock hand driving second-chance replacement.
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<Option<FrameOccupant>>,
    next: usize,
}

impl FrameTable {
    /// Creates an empty frame table with `num_frames` slots and the clock
    /// hand at frame 0.
    #[must_use]
    pub fn new(num_frames: usize) -> Self {
        Self {
            frames: vec![None; num_frames],
            next: 0,
        }
    }

    /// Number of physical frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the frame table has zero frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the occupant of a frame, if any.
    #[must_use]
    pub fn occupant_at(&self, frame: usize) -> Option<FrameOccupant> {
        self.frames[frame]
    }

    /// Whether a reference claiming residency in `request_frame` under
    /// `request_pid` still holds that frame.
    ///
    /// Spec.md §4.4: a fault occurs unless the frame is currently
    /// occupied by an entry belonging to the same process. This checks
    /// pid only, matching the original tool's `checkPageFault` exactly —
    /// it does not also verify the occupant names the same page, so a
    /// frame recycled to a different page of the same process reads back
    /// as a hit rather than a fault.
    #[must_use]
    pub fn check_fault(&self, request_pid: Pid, request_frame: usize) -> bool {
        !matches!(self.frames[request_frame], Some(occupant) if occupant.pid == request_pid)
    }

    /// Runs the clock algorithm to find a frame for `pid`'s entry at
    /// `entry_index`, classifying the placement and advancing the clock
    /// hand past the chosen frame.
    ///
    /// # Panics
    ///
    /// Panics if the frame table has zero frames, or if an occupant names
    /// a process or entry index that is not present in `pool` — both are
    /// invariant violations rather than recoverable conditions.
    pub fn find_open(&mut self, pool: &mut ProcessPool, pid: Pid, entry_index: usize) -> (usize, Placement) {
        assert!(!self.frames.is_empty(), "invariant violation: frame table has no frames");

        let (frame, placement) = loop {
            match self.frames[self.next] {
                None => break (self.next, Placement::Free),
                Some(occupant) => {
                    let occupant_entry = pool
                        .get(occupant.pid)
                        .page_table
                        .as_ref()
                        .unwrap_or_else(|| panic!("invariant violation: pid {} has no page table", occupant.pid))
                        .get(occupant.entry_index);

                    if occupant_entry.ref_bit {
                        pool.get_mut(occupant.pid)
                            .page_table
                            .as_mut()
                            .unwrap_or_else(|| panic!("invariant violation: pid {} has no page table", occupant.pid))
                            .get_mut(occupant.entry_index)
                            .ref_bit = false;
                        self.next = (self.next + 1) % self.frames.len();
                    } else {
                        let placement = if occupant_entry.dirty_bit {
                            Placement::Dirty
                        } else {
                            Placement::Clean
                        };
                        break (self.next, placement);
                    }
                }
            }
        };

        self.frames[frame] = Some(FrameOccupant { pid, entry_index });
        self.next = (frame + 1) % self.frames.len();
        (frame, placement)
    }

    /// Evicts every frame occupied by `pid`, returning the freed frame
    /// indices in ascending order (for trace output matching the
    /// original tool's "Freeing frames: ..." line).
    pub fn clear_pid(&mut self, pid: Pid) -> Vec<usize> {
        let mut freed = Vec::new();
        for (index, slot) in self.frames.iter_mut().enumerate() {
            if slot.is_some_and(|occupant| occupant.pid == pid) {
                *slot = None;
                freed.push(index);
            }
        }
        freed
    }
}
