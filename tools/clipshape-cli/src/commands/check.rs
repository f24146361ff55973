//! Check tool availability.

use clipshape_common::config::{config_file_path, AppConfig};
use clipshape_render_engine::Toolchain;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("clipshape System Check");
    println!("{}", "=".repeat(50));

    let toolchain = Toolchain::discover(&config.tools);
    for (name, path) in [("ffmpeg", toolchain.ffmpeg()), ("ffprobe", toolchain.ffprobe())] {
        match path {
            Some(p) => println!("[OK] {name}: {}", p.display()),
            None => println!("[MISSING] {name}: not found"),
        }
    }

    println!();
    println!("Config file: {}", config_file_path().display());
    println!(
        "Export: {:?}, x264 preset {}, crf {}, audio {} kbps",
        config.export.container,
        config.export.x264_preset,
        config.export.crf,
        config.export.audio_bitrate_kbps
    );

    println!();
    if toolchain.is_complete() {
        println!("All required tools are available. clipshape is ready.");
    } else {
        println!("Some required tools are missing. Install FFmpeg or set tool paths in the config.");
    }

    Ok(())
}
