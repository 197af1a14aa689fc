use super::scale_dimensions;
use crate::format::{VideoCodec, WebmSettings};

/// libvpx speed/quality trade-off chosen from the CRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderEffort {
    pub deadline: &'static str,
    pub cpu_used: u8,
    pub threads: u8,
}

/// CRF <= 15 encodes slowest with more threads; CRF <= 25 is balanced;
/// anything above uses the realtime tier.
pub fn encoder_effort(crf: u8) -> EncoderEffort {
    match crf {
        0..=15 => EncoderEffort {
            deadline: "best",
            cpu_used: 0,
            threads: 8,
        },
        16..=25 => EncoderEffort {
            deadline: "good",
            cpu_used: 2,
            threads: 4,
        },
        _ => EncoderEffort {
            deadline: "realtime",
            cpu_used: 5,
            threads: 2,
        },
    }
}

/// Build the single ffmpeg invocation for a WebM conversion.
pub fn build_webm_args(input: &str, output: &str, settings: &WebmSettings) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-i", input].map(String::from).to_vec();

    match settings.codec {
        VideoCodec::Vp9 => {
            // Zero bitrate puts libvpx-vp9 in constant-quality mode.
            args.extend(["-c:v", "libvpx-vp9", "-crf"].map(String::from));
            args.push(settings.crf.to_string());
            args.extend(["-b:v", "0"].map(String::from));
        }
        VideoCodec::Vp8 => {
            args.extend(["-c:v", "libvpx"].map(String::from));
            match &settings.bitrate {
                Some(bitrate) => {
                    args.push("-b:v".to_string());
                    args.push(bitrate.clone());
                }
                None => {
                    args.push("-crf".to_string());
                    args.push(settings.crf.to_string());
                }
            }
        }
    }

    let effort = encoder_effort(settings.crf);
    args.push("-deadline".to_string());
    args.push(effort.deadline.to_string());
    args.push("-cpu-used".to_string());
    args.push(effort.cpu_used.to_string());
    args.push("-threads".to_string());
    args.push(effort.threads.to_string());

    args.push("-an".to_string());

    let mut filters = Vec::new();
    if let Some(dims) = scale_dimensions(settings.width, settings.height) {
        filters.push(format!("scale={}", dims));
    }
    if let Some(fps) = settings.fps {
        filters.push(format!("fps={}", fps));
    }
    if !filters.is_empty() {
        args.push("-vf".to_string());
        args.push(filters.join(","));
    }

    args.push(output.to_string());
    args
}
