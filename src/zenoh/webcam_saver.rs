use std::path::PathBuf;

use clap::Parser;
use episode_nodes::{
    encoder::FfmpegEncoder,
    frame::{FrameFormat, ImageEncoding},
    node::{Node, NodeKeys},
    webcam_saver::{SaverConfig, WebcamSaver, IMAGE, RECORD_EPISODE, SAVED_IMAGE},
    Result,
};
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "CAMERA_NAME", default_value = "camera")]
    camera_name: String,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    #[arg(long, value_enum, default_value_t = ImageEncoding::Bgr8)]
    encoding: ImageEncoding,

    /// Defaults to a fresh uuid.
    #[arg(long, env = "DATAFLOW_ID")]
    run_id: Option<String>,

    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    #[arg(long, default_value = "cmd/record_episode")]
    record_episode_key: String,

    #[arg(long, default_value = "camera")]
    image_key: String,

    #[arg(long, default_value = "camera/saved_image")]
    saved_image_key: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "episode_nodes=info,zenoh_webcam_saver=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = SaverConfig {
        camera_name: args.camera_name,
        frame: FrameFormat {
            width: args.width,
            height: args.height,
            encoding: args.encoding,
        },
        fps: args.fps,
        out_dir: args.out_dir,
        run_id: args
            .run_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    };
    info!("saving episodes under {}", config.videos_dir().display());

    let keys = NodeKeys::default()
        .input(RECORD_EPISODE, &args.record_episode_key)
        .input(IMAGE, &args.image_key)
        .output(SAVED_IMAGE, &args.saved_image_key);
    let mut node = Node::init(&keys)?;
    let mut saver = WebcamSaver::new(config, FfmpegEncoder::new());

    while let Some(event) = node.recv() {
        saver.handle(&event, &mut node)?;
    }
    Ok(())
}
