use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread::spawn,
};

use tracing::{debug, info, warn};

use crate::Result;

/// Pattern ffmpeg's image2 demuxer reads frames with.
pub const FRAME_PATTERN: &str = "frame_%06d.png";

pub fn frame_file_name(index: u64) -> String {
    format!("frame_{index:06}.png")
}

/// One finished episode waiting to be turned into a video.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    pub frames_dir: PathBuf,
    pub video_path: PathBuf,
    pub fps: u32,
}

impl EncodeJob {
    /// Shell line: encode the numbered frames, then drop the frame directory
    /// only when ffmpeg succeeded.
    pub fn command_line(&self, program: &str) -> String {
        let input = self.frames_dir.join(FRAME_PATTERN);
        format!(
            "{program} -r {fps} -f image2 -loglevel error -i {input} -vcodec libx264 -g 2 -pix_fmt yuv444p {output} && rm -r {dir}",
            fps = self.fps,
            input = shell_quote(&input),
            output = shell_quote(&self.video_path),
            dir = shell_quote(&self.frames_dir),
        )
    }
}

fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Turns a directory of frames into a video without blocking the caller.
pub trait Encoder {
    fn launch(&mut self, job: EncodeJob) -> Result<()>;
}

/// Runs `ffmpeg` through `sh` in its own process group so the encode outlives
/// the node. The caller never waits; a detached thread reaps the child and
/// logs how it ended.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for FfmpegEncoder {
    fn launch(&mut self, job: EncodeJob) -> Result<()> {
        let line = job.command_line(&self.program);
        info!("{line}");

        let mut command = Command::new("sh");
        command.arg("-c").arg(&line).stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        match command.spawn() {
            Ok(mut child) => {
                let video = job.video_path;
                spawn(move || match child.wait() {
                    Ok(status) if status.success() => debug!("encoded {}", video.display()),
                    Ok(status) => warn!("encoding {} failed: {status}", video.display()),
                    Err(e) => warn!("encoding {}: {e}", video.display()),
                });
            }
            Err(e) => warn!("could not launch encoder: {e}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{thread::sleep, time::Duration};

    use super::*;

    fn job(root: &Path) -> EncodeJob {
        EncodeJob {
            frames_dir: root.join("camera_episode_5"),
            video_path: root.join("camera_episode_5.mp4"),
            fps: 30,
        }
    }

    fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if done() {
                return true;
            }
            sleep(Duration::from_millis(50));
        }
        done()
    }

    #[test]
    fn command_line_matches_encoder_settings() {
        let job = job(Path::new("out/run/videos"));
        assert_eq!(
            job.command_line("ffmpeg"),
            "ffmpeg -r 30 -f image2 -loglevel error \
             -i 'out/run/videos/camera_episode_5/frame_%06d.png' \
             -vcodec libx264 -g 2 -pix_fmt yuv444p \
             'out/run/videos/camera_episode_5.mp4' \
             && rm -r 'out/run/videos/camera_episode_5'"
        );
    }

    #[test]
    fn quotes_survive_in_paths() {
        let job = EncodeJob {
            frames_dir: PathBuf::from("it's"),
            video_path: PathBuf::from("it's.mp4"),
            fps: 15,
        };
        assert!(job.command_line("ffmpeg").ends_with(r"&& rm -r 'it'\''s'"));
    }

    #[test]
    fn frame_names_are_zero_padded() {
        assert_eq!(frame_file_name(0), "frame_000000.png");
        assert_eq!(frame_file_name(1234), "frame_001234.png");
    }

    #[cfg(unix)]
    #[test]
    fn frames_are_removed_after_successful_encode() {
        let root = tempfile::tempdir().unwrap();
        let job = job(root.path());
        std::fs::create_dir_all(&job.frames_dir).unwrap();
        std::fs::write(job.frames_dir.join(frame_file_name(0)), b"png").unwrap();

        FfmpegEncoder::with_program("true").launch(job.clone()).unwrap();
        assert!(wait_until(|| !job.frames_dir.exists()));
    }

    #[cfg(unix)]
    #[test]
    fn frames_are_kept_when_encode_fails() {
        let root = tempfile::tempdir().unwrap();
        let job = job(root.path());
        std::fs::create_dir_all(&job.frames_dir).unwrap();

        let marker = root.path().join("ran");
        let program = format!("touch '{}' && false", marker.display());
        FfmpegEncoder::with_program(program).launch(job.clone()).unwrap();
        assert!(wait_until(|| marker.exists()));
        sleep(Duration::from_millis(200));
        assert!(job.frames_dir.exists());
    }
}
