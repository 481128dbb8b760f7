use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::format_description;

/// Plain-text match recording: one rendered arena per tick.
pub struct ReplayFile {
    path: PathBuf,
    file: File,
}

impl ReplayFile {
    pub fn new(replays_folder: &Path) -> io::Result<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let format = format_description::parse("[year][month][day]-[hour][minute][second]")
            .map_err(io::Error::other)?;
        let stamp = now.format(&format).map_err(io::Error::other)?;

        if !replays_folder.exists() {
            fs::create_dir_all(replays_folder)?;
        }

        let path = replays_folder.join(format!("flagbot-{stamp}.txt"));
        let file = File::create(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, tick: u32, frame: &str) -> io::Result<()> {
        writeln!(self.file, "tick {tick}")?;
        self.file.write_all(frame.as_bytes())?;
        if !frame.ends_with('\n') {
            writeln!(self.file)?;
        }
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn test_replay_records_frames() {
        let folder = env::temp_dir().join(format!("flagbot-replay-{}", std::process::id()));
        let mut replay = ReplayFile::new(&folder).unwrap();
        let name = replay.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("flagbot-"));
        assert!(name.ends_with(".txt"));

        replay.append(1, "B.b\n").unwrap();
        replay.append(2, "Bb.").unwrap();

        let text = fs::read_to_string(replay.path()).unwrap();
        assert_eq!(text, "tick 1\nB.b\ntick 2\nBb.\n");
        fs::remove_dir_all(&folder).unwrap();
    }
}
