use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, unbounded};
use spades_map::{MapDims, VoxelGrid};

use crate::decode::decode_with_progress;
use crate::error::VxlError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub rows_done: usize,
    pub rows_total: usize,
}

impl LoadProgress {
    pub fn fraction(&self) -> f32 {
        if self.rows_total == 0 {
            1.0
        } else {
            self.rows_done as f32 / self.rows_total as f32
        }
    }
}

/// A decode running on its own thread.
pub struct MapLoadJob {
    handle: JoinHandle<Result<VoxelGrid, VxlError>>,
    progress: Receiver<LoadProgress>,
}

impl MapLoadJob {
    /// Per-row progress; the sender closes when the worker exits.
    pub fn progress(&self) -> &Receiver<LoadProgress> {
        &self.progress
    }

    /// Drains pending progress messages and returns the newest one.
    pub fn latest_progress(&self) -> Option<LoadProgress> {
        self.progress.try_iter().last()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<VoxelGrid, VxlError> {
        match self.handle.join() {
            Ok(res) => res,
            Err(_) => Err(VxlError::WorkerPanicked),
        }
    }
}

/// Decodes `bytes` in the background. Decoding is a pure function of the
/// input, so a failed or abandoned job can simply be spawned again.
pub fn spawn_decode(bytes: Vec<u8>, dims: MapDims) -> MapLoadJob {
    let (tx, rx) = unbounded();
    let width = dims.width.max(1) as usize;
    let rows_total = dims.height as usize;
    let handle = thread::spawn(move || {
        let result = decode_with_progress(&bytes, dims, |done, _| {
            if done % width == 0 {
                // receiver may be gone; that is fine
                let _ = tx.send(LoadProgress {
                    rows_done: done / width,
                    rows_total,
                });
            }
        });
        if let Err(e) = &result {
            log::warn!("background map decode failed: {e}");
        }
        result
    });
    MapLoadJob {
        handle,
        progress: rx,
    }
}
