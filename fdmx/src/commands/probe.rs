use anyhow::Result;
use clap::Args;
use fdmx_mp4::Mp4Demuxer;
use log::{debug, warn};
use std::{fs::File, io::Read, path::PathBuf};

/// Check whether a file is a fragmented mp4 segment.
#[derive(Debug, Clone, Args)]
pub struct Probe {
    /// Path of mp4 file or segment.
    #[arg(required = true)]
    input: PathBuf,
}

impl Probe {
    pub fn execute(self) -> Result<()> {
        let mut data = Vec::new();
        File::open(&self.input)?
            .take(Mp4Demuxer::PROBE_WINDOW as u64 + 16)
            .read_to_end(&mut data)?;

        if data.len() < Mp4Demuxer::MIN_PROBE_BYTE_LENGTH {
            warn!(
                "Only {} bytes available, probing may be unreliable",
                data.len()
            );
        }

        let verdict = if Mp4Demuxer::probe(&data) {
            "is"
        } else {
            "is not"
        };

        debug!("Probed {} bytes", data.len());
        println!(
            "{} {} a fragmented mp4",
            self.input.to_string_lossy(),
            verdict
        );

        Ok(())
    }
}
