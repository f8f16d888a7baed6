use anyhow::{Result, bail};
use clap::Args;
use fdmx_mp4::{BoxIter, ByteRange, find_box};
use std::path::PathBuf;

/// List boxes of a mp4 file.
#[derive(Debug, Clone, Args)]
pub struct Boxes {
    /// Path of mp4 file or segment.
    #[arg(required = true)]
    input: PathBuf,

    /// Only list boxes matching this type path e.g. moof/traf/tfdt.
    #[arg(short, long)]
    path: Option<String>,
}

impl Boxes {
    pub fn execute(self) -> Result<()> {
        let data = std::fs::read(&self.input)?;
        let range = ByteRange::of(&data);

        let boxes = match &self.path {
            Some(path) => {
                let path = path.split('/').collect::<Vec<_>>();

                if let Some(name) = path.iter().find(|x| x.len() != 4) {
                    bail!("Box type '{}' is not 4 characters long.", name);
                }

                find_box(&data, range, &path)
            }
            None => BoxIter::new(&data, range).collect(),
        };

        for box_ in boxes {
            let state = if box_.is_complete_within(data.len()) {
                ""
            } else {
                " (truncated)"
            };

            println!(
                "{} offset={} size={}{}",
                box_.name(),
                box_.start,
                box_.size(),
                state
            );
        }

        Ok(())
    }
}
