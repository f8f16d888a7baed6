use anyhow::{Result, bail};
use base64::Engine;
use clap::Args;
use fdmx_mp4::{Demuxer, DemuxerConfig, DemuxerResult, Mp4Demuxer, TrackKind};
use log::{debug, info};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::PathBuf,
};

/// Run a file through the demuxer and print its metadata events.
#[derive(Debug, Clone, Args)]
pub struct Demux {
    /// Path of fragmented mp4 file or segment.
    #[arg(required = true)]
    input: PathBuf,

    /// Feed the file in chunks which are not aligned to fragments.
    #[arg(long)]
    progressive: bool,

    /// Size of each chunk in bytes.
    #[arg(long, default_value_t = 64 * 1024)]
    chunk_size: u64,

    /// Start time of the segment in seconds.
    #[arg(short, long, default_value_t = 0.0)]
    time_offset: f64,

    /// Write passthrough video bytes to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print events as json lines, payloads are base64 encoded.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Event {
    kind: TrackKind,
    pts: f64,
    dts: f64,
    len: usize,
    data: String,
}

impl Demux {
    pub fn execute(self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("Chunk size must be greater than zero.");
        }

        let mut demuxer = Mp4Demuxer::new(DemuxerConfig {
            progressive: self.progressive,
        });
        let mut reader = BufReader::new(File::open(&self.input)?);
        let mut output = match &self.output {
            Some(output) => Some(BufWriter::new(File::create(output)?)),
            None => None,
        };

        let mut chunks = 0;
        let mut video_bytes = 0;
        let mut events = 0;

        loop {
            let mut buf = vec![];
            reader
                .by_ref()
                .take(self.chunk_size)
                .read_to_end(&mut buf)?;

            if buf.is_empty() {
                break;
            }

            chunks += 1;
            let result = demuxer.demux(&buf, self.time_offset);
            debug!(
                "Chunk {} ({} bytes) emitted {} bytes",
                chunks,
                buf.len(),
                result.video_track.samples.len()
            );
            video_bytes += result.video_track.samples.len();
            events += self.emit(result, output.as_mut())?;
        }

        let result = demuxer.flush();
        video_bytes += result.video_track.samples.len();
        events += self.emit(result, output.as_mut())?;

        if let Some(mut output) = output {
            output.flush()?;
        }

        info!(
            "Demuxed {} chunks, {} video bytes and {} metadata events",
            chunks, video_bytes, events
        );
        Ok(())
    }

    fn emit(&self, result: DemuxerResult, output: Option<&mut BufWriter<File>>) -> Result<usize> {
        if let Some(output) = output {
            output.write_all(&result.video_track.samples)?;
        }

        let kind = result.id3_track.kind;
        let samples = result.id3_track.samples;

        for sample in &samples {
            if self.json {
                let event = Event {
                    kind,
                    pts: sample.pts,
                    dts: sample.dts,
                    len: sample.len,
                    data: base64::engine::general_purpose::STANDARD.encode(&sample.data),
                };
                println!("{}", serde_json::to_string(&event)?);
            } else {
                println!(
                    "pts={:.3} dts={:.3} len={} data={}",
                    sample.pts,
                    sample.dts,
                    sample.len,
                    hex::encode(&sample.data)
                );
            }
        }

        Ok(samples.len())
    }
}
