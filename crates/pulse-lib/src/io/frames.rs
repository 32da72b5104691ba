use crate::frame::FrameSample;
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::path::Path;

/// Writes a frame recording as CSV: one row per frame, RGB bytes packed
/// row-major and base64-encoded.
pub fn write_recording(path: &Path, frames: &[FrameSample]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(file);
    writer.write_record(["timestamp_ms", "width", "height", "rgb"])?;
    for frame in frames {
        let mut bytes = Vec::with_capacity(frame.pixels.len() * 3);
        for [r, g, b] in &frame.pixels {
            bytes.extend_from_slice(&[*r, *g, *b]);
        }
        writer.write_record(&[
            frame.timestamp_ms.to_string(),
            frame.width.to_string(),
            frame.height.to_string(),
            STANDARD.encode(&bytes),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a frame recording written by [`write_recording`].
pub fn read_recording(path: &Path) -> Result<Vec<FrameSample>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut frames = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let record = row.with_context(|| format!("reading frame row {}", idx + 1))?;
        if record.len() < 4 {
            bail!("frame row {} has {} columns, expected 4", idx + 1, record.len());
        }
        let timestamp_ms: u64 = record[0]
            .parse()
            .with_context(|| format!("parsing timestamp in frame row {}", idx + 1))?;
        let width: usize = record[1]
            .parse()
            .with_context(|| format!("parsing width in frame row {}", idx + 1))?;
        let height: usize = record[2]
            .parse()
            .with_context(|| format!("parsing height in frame row {}", idx + 1))?;
        let bytes = STANDARD
            .decode(&record[3])
            .with_context(|| format!("decoding pixels in frame row {}", idx + 1))?;
        if bytes.len() != width * height * 3 {
            bail!(
                "frame row {} carries {} pixel bytes, expected {}",
                idx + 1,
                bytes.len(),
                width * height * 3
            );
        }
        let pixels = bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        frames.push(FrameSample {
            width,
            height,
            pixels,
            timestamp_ms,
        });
    }
    if frames.is_empty() {
        bail!("no frames found in {}", path.display());
    }
    Ok(frames)
}
