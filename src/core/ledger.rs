use std::fs;
use std::path::Path;

use md5::{Digest, Md5};
use serde::Serialize;

use crate::capture::FrameHandle;
use crate::error::RecorderError;
use crate::shared::constants;
use crate::utils::logger;

/// One retained sample: stable id, owned pixels, run-relative timestamp.
///
/// The payload is `Some` from retention until export (or `clear`), then
/// `None`; it is taken exactly once.
#[derive(Debug)]
pub struct RetainedFrame {
    id: usize,
    frame: Option<FrameHandle>,
    timestamp_ms: f64,
}

impl RetainedFrame {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    pub fn frame(&self) -> Option<&FrameHandle> {
        self.frame.as_ref()
    }
}

/// Manifest entry serialized into `data.json`.
#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub id: usize,
    pub md5: String,
    pub t: f64,
}

/// Outcome of exporting a ledger.
#[derive(Debug)]
pub struct ExportSummary {
    pub saved: usize,
    pub failed: usize,
    pub manifest: Vec<ManifestEntry>,
}

/// Ordered record of every retained frame for one run.
///
/// Ids are contiguous from zero and equal the index, so range selection is
/// O(1) random access.
#[derive(Debug, Default)]
pub struct Ledger {
    frames: Vec<RetainedFrame>,
}

impl Ledger {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Appends a frame, assigning the next sequential id.
    pub fn append(&mut self, frame: FrameHandle, timestamp_ms: f64) -> usize {
        let id = self.frames.len();
        self.frames.push(RetainedFrame {
            id,
            frame: Some(frame),
            timestamp_ms,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RetainedFrame> {
        self.frames.get(index)
    }

    pub fn timestamp_at(&self, index: usize) -> Option<f64> {
        self.frames.get(index).map(|f| f.timestamp_ms)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetainedFrame> {
        self.frames.iter()
    }

    /// Runs every frame through `persist` in id order, exactly once each,
    /// describing it for the manifest and releasing its pixels immediately
    /// after. A persist failure is logged and counted; the export continues
    /// with the remaining frames.
    pub fn export_with<P>(&mut self, mut persist: P) -> ExportSummary
    where
        P: FnMut(usize, &FrameHandle) -> Result<(), RecorderError>,
    {
        let mut summary = ExportSummary {
            saved: 0,
            failed: 0,
            manifest: Vec::with_capacity(self.frames.len()),
        };

        for entry in &mut self.frames {
            let Some(frame) = entry.frame.take() else {
                // payload already released by an earlier export
                continue;
            };

            summary.manifest.push(ManifestEntry {
                id: entry.id,
                md5: hex::encode(Md5::digest(frame.bytes())),
                t: entry.timestamp_ms,
            });

            match persist(entry.id, &frame) {
                Ok(()) => summary.saved += 1,
                Err(e) => {
                    summary.failed += 1;
                    logger::warn(&format!("export: {}", e));
                }
            }
            // frame dropped here: the payload is released right after it was
            // persisted and described, whatever the persist outcome
        }

        summary
    }

    /// Exports to `dir`: one PNG per frame plus the manifest file.
    pub fn export_to_dir(&mut self, dir: &Path) -> Result<ExportSummary, RecorderError> {
        let summary = self.export_with(|id, frame| persist_png(dir, id, frame));

        let manifest_path = dir.join(constants::MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&summary.manifest)
            .map_err(|e| RecorderError::Persist(format!("manifest encode failed: {}", e)))?;
        fs::write(&manifest_path, json).map_err(|e| {
            RecorderError::Persist(format!("manifest write to {:?} failed: {}", manifest_path, e))
        })?;

        Ok(summary)
    }

    /// Releases every payload and empties the ledger. Idempotent.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Zero-padded image filename for a frame id, e.g. `shot0042.png`.
pub fn frame_filename(id: usize) -> String {
    format!(
        "{}{:04}.{}",
        constants::FRAME_FILE_PREFIX,
        id,
        constants::FRAME_FILE_EXT
    )
}

fn persist_png(dir: &Path, id: usize, frame: &FrameHandle) -> Result<(), RecorderError> {
    let path = dir.join(frame_filename(id));
    let image = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.bytes().to_vec())
        .ok_or_else(|| {
            RecorderError::Persist(format!(
                "frame {}: pixel buffer does not match its dimensions",
                id
            ))
        })?;
    image
        .save(&path)
        .map_err(|e| RecorderError::Persist(format!("frame {}: {}", id, e)))
}
