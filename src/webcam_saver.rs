//! Saves webcam frames per recording episode and hands finished episodes to
//! the video encoder.
//!
//! Layout under `<out_dir>/<run_id>/videos`:
//! - `<camera>_episode_<n>/frame_NNNNNN.png` while episode `n` records,
//! - `<camera>_episode_<n>.mp4` once the encoder is done with it.

use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    encoder::{frame_file_name, EncodeJob, Encoder},
    episode::{EpisodeId, EpisodeTracker, Transition},
    errors::Error,
    frame::{write_png, FrameFormat, ImageEncoding},
    message::Message,
    node::{Event, Outputs},
    Result,
};

pub const RECORD_EPISODE: &str = "record_episode";
pub const IMAGE: &str = "image";
pub const SAVED_IMAGE: &str = "saved_image";

#[derive(Debug, Clone)]
pub struct SaverConfig {
    pub camera_name: String,
    pub frame: FrameFormat,
    pub fps: u32,
    pub out_dir: PathBuf,
    pub run_id: String,
}

impl Default for SaverConfig {
    fn default() -> Self {
        Self {
            camera_name: "camera".into(),
            frame: FrameFormat {
                width: 640,
                height: 480,
                encoding: ImageEncoding::Bgr8,
            },
            fps: 30,
            out_dir: PathBuf::from("out"),
            run_id: String::new(),
        }
    }
}

impl SaverConfig {
    pub fn videos_dir(&self) -> PathBuf {
        self.out_dir.join(&self.run_id).join("videos")
    }

    pub fn episode_dir(&self, episode: EpisodeId) -> PathBuf {
        self.videos_dir().join(format!("{}_episode_{episode}", self.camera_name))
    }

    pub fn video_path(&self, episode: EpisodeId) -> PathBuf {
        self.videos_dir().join(self.video_file_name(episode))
    }

    /// Video path as announced in `saved_image`, relative to the run directory.
    pub fn video_record_path(&self, episode: EpisodeId) -> String {
        format!("videos/{}", self.video_file_name(episode))
    }

    fn video_file_name(&self, episode: EpisodeId) -> String {
        format!("{}_episode_{episode}.mp4", self.camera_name)
    }
}

/// Announces a frame as a position in the episode video, which may not exist
/// yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedImage {
    pub path: String,
    pub timestamp: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpisodeValue {
    One(EpisodeId),
    Many(Vec<EpisodeId>),
}

/// Reads the episode id from a `record_episode` payload: a JSON integer or
/// an integer array whose first element counts.
pub fn parse_episode(message: &Message) -> Result<EpisodeId> {
    match message.parse::<EpisodeValue>()? {
        EpisodeValue::One(episode) => Ok(episode),
        EpisodeValue::Many(values) => values
            .first()
            .copied()
            .ok_or_else(|| Error::EmptyInput(RECORD_EPISODE.into())),
    }
}

pub struct WebcamSaver<E> {
    config: SaverConfig,
    tracker: EpisodeTracker,
    frame_index: u64,
    encoder: E,
}

impl<E: Encoder> WebcamSaver<E> {
    pub fn new(config: SaverConfig, encoder: E) -> Self {
        Self {
            config,
            tracker: EpisodeTracker::new(),
            frame_index: 0,
            encoder,
        }
    }

    pub fn config(&self) -> &SaverConfig {
        &self.config
    }

    pub fn current_episode(&self) -> EpisodeId {
        self.tracker.current()
    }

    /// Index the next saved frame gets.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn handle(&mut self, event: &Event, outputs: &mut impl Outputs) -> Result<()> {
        match event.id.as_str() {
            RECORD_EPISODE => self.on_record_episode(parse_episode(&event.message)?),
            IMAGE => self.on_image(&event.message, outputs),
            other => {
                debug!("ignoring input `{other}`");
                Ok(())
            }
        }
    }

    pub fn on_record_episode(&mut self, episode: EpisodeId) -> Result<()> {
        info!("Recording episode {episode}");
        match self.tracker.observe(episode) {
            Transition::Start(episode) => {
                let dir = self.config.episode_dir(episode);
                fs::create_dir_all(&dir)?;
                self.frame_index = 0;
                info!("saving frames to {}", dir.display());
            }
            Transition::Stop(episode) => {
                self.encoder.launch(EncodeJob {
                    frames_dir: self.config.episode_dir(episode),
                    video_path: self.config.video_path(episode),
                    fps: self.config.fps,
                })?;
            }
            Transition::Ignored => {}
        }
        Ok(())
    }

    /// Saves one frame of the current episode; a no-op while idle.
    pub fn on_image(&mut self, message: &Message, outputs: &mut impl Outputs) -> Result<()> {
        if !self.tracker.is_recording() {
            return Ok(());
        }
        let episode = self.tracker.current();

        let saved = SavedImage {
            path: self.config.video_record_path(episode),
            timestamp: self.frame_index as f64 / self.config.fps as f64,
        };
        outputs.send_output(
            SAVED_IMAGE,
            Message::json(message.metadata.clone(), &[saved])?,
        )?;

        let frame = self.config.frame;
        let rgb = frame.to_rgb(&message.data)?;
        let path = self
            .config
            .episode_dir(episode)
            .join(frame_file_name(self.frame_index));
        write_png(&path, &rgb, frame.width, frame.height)?;
        self.frame_index += 1;
        Ok(())
    }
}
