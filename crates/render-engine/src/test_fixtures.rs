//! Probe outputs shared by unit tests.

use std::path::Path;

use crate::asset::Asset;

pub(crate) const LANDSCAPE_PROBE: &str = r#"{
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080,
         "avg_frame_rate": "30000/1001", "r_frame_rate": "30000/1001", "duration": "10.010000"},
        {"index": 1, "codec_type": "audio", "codec_name": "aac", "duration": "10.005333"}
    ],
    "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "10.010000"}
}"#;

pub(crate) const PORTRAIT_PROBE: &str = r#"{
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "hevc", "width": 1920, "height": 1080,
         "avg_frame_rate": "30/1", "duration": "4.000000",
         "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]},
        {"index": 1, "codec_type": "audio", "codec_name": "aac", "duration": "4.000000"}
    ],
    "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "4.000000"}
}"#;

pub(crate) const VIDEO_ONLY_PROBE: &str = r#"{
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720}
    ],
    "format": {"duration": "3.0"}
}"#;

pub(crate) const AUDIO_ONLY_PROBE: &str = r#"{
    "streams": [
        {"index": 0, "codec_type": "audio", "codec_name": "aac"}
    ],
    "format": {"duration": "3.0"}
}"#;

pub(crate) fn asset(json: &str) -> Asset {
    Asset::from_probe_json(Path::new("/media/source.mp4"), json).expect("fixture should parse")
}
