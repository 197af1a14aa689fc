use super::scale_dimensions;
use crate::format::{GifQuality, GifSettings};

/// One or two ffmpeg invocations producing a GIF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GifPlan {
    /// Direct encode with ffmpeg's default palette.
    SinglePass(Vec<String>),
    /// Palette generation, then a render that maps onto that palette.
    TwoPass {
        palette: Vec<String>,
        render: Vec<String>,
        /// Intermediate artifact written by `palette` and read by `render`.
        palette_file: String,
    },
}

impl GifPlan {
    /// Argument vectors in execution order.
    pub fn invocations(&self) -> Vec<&[String]> {
        match self {
            GifPlan::SinglePass(args) => vec![args.as_slice()],
            GifPlan::TwoPass {
                palette, render, ..
            } => vec![palette.as_slice(), render.as_slice()],
        }
    }

    /// Intermediate artifacts the plan creates besides the output.
    pub fn intermediates(&self) -> Vec<&str> {
        match self {
            GifPlan::SinglePass(_) => Vec::new(),
            GifPlan::TwoPass { palette_file, .. } => vec![palette_file.as_str()],
        }
    }

    pub fn is_two_pass(&self) -> bool {
        matches!(self, GifPlan::TwoPass { .. })
    }
}

/// `fps=N[,scale=W:H:flags=lanczos]`
pub fn gif_filter_chain(settings: &GifSettings) -> String {
    let mut chain = format!("fps={}", settings.fps);
    if let Some(dims) = scale_dimensions(settings.width, settings.height) {
        chain.push_str(&format!(",scale={}:flags=lanczos", dims));
    }
    chain
}

fn palettegen(quality: GifQuality) -> String {
    match quality {
        GifQuality::Low => format!("palettegen=max_colors={}", quality.max_colors()),
        GifQuality::Medium | GifQuality::High => "palettegen".to_string(),
    }
}

/// Build the invocation plan for a GIF conversion.
///
/// `optimize` selects the two-pass palette pipeline; `palette_file` names
/// the intermediate palette image in the transcoder namespace.
pub fn build_gif_plan(
    input: &str,
    output: &str,
    palette_file: &str,
    settings: &GifSettings,
) -> GifPlan {
    let chain = gif_filter_chain(settings);

    if !settings.optimize {
        return GifPlan::SinglePass(args(["-y", "-i", input, "-vf", chain.as_str(), output]));
    }

    let palette_chain = format!("{},{}", chain, palettegen(settings.quality));
    let render_graph = format!("{}[x];[x][1:v]paletteuse", chain);

    let palette = args([
        "-y",
        "-i",
        input,
        "-vf",
        palette_chain.as_str(),
        palette_file,
    ]);
    let render = args([
        "-y",
        "-i",
        input,
        "-i",
        palette_file,
        "-lavfi",
        render_graph.as_str(),
        output,
    ]);

    GifPlan::TwoPass {
        palette,
        render,
        palette_file: palette_file.to_string(),
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(args: &[String]) -> Vec<&str> {
        args.windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| w[1].as_str())
            .collect()
    }

    #[test]
    fn test_single_pass() {
        let settings = GifSettings::default().with_optimize(false).with_fps(12);
        let plan = build_gif_plan("input.mp4", "output.gif", "palette.png", &settings);

        assert!(!plan.is_two_pass());
        assert_eq!(plan.invocations().len(), 1);
        assert!(plan.intermediates().is_empty());

        let args = plan.invocations()[0];
        assert_eq!(inputs(args), vec!["input.mp4"]);
        assert!(args.contains(&"fps=12".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("output.gif"));
        assert!(!args.iter().any(|a| a.contains("palette")));
    }

    #[test]
    fn test_single_pass_with_scale() {
        let settings = GifSettings::default()
            .with_optimize(false)
            .with_fps(15)
            .with_size(400, 300);
        let plan = build_gif_plan("in.mov", "out.gif", "palette.png", &settings);
        let args = plan.invocations()[0];
        assert!(args.contains(&"fps=15,scale=400:300:flags=lanczos".to_string()));
    }

    #[test]
    fn test_two_pass_structure() {
        let settings = GifSettings::default().with_size(540, 405);
        let plan = build_gif_plan("input.mp4", "output.gif", "palette.png", &settings);

        let invocations = plan.invocations();
        assert_eq!(invocations.len(), 2);
        assert_eq!(plan.intermediates(), vec!["palette.png"]);

        let pass1 = invocations[0];
        assert_eq!(inputs(pass1), vec!["input.mp4"]);
        assert!(pass1.contains(&"fps=15,scale=540:405:flags=lanczos,palettegen".to_string()));
        assert_eq!(pass1.last().map(String::as_str), Some("palette.png"));

        let pass2 = invocations[1];
        assert_eq!(inputs(pass2), vec!["input.mp4", "palette.png"]);
        assert!(pass2
            .iter()
            .any(|a| a == "fps=15,scale=540:405:flags=lanczos[x];[x][1:v]paletteuse"));
        assert_eq!(pass2.last().map(String::as_str), Some("output.gif"));
    }

    #[test]
    fn test_two_pass_low_quality_limits_palette() {
        let settings = GifSettings::default().with_quality(GifQuality::Low);
        let plan = build_gif_plan("i.mp4", "o.gif", "p.png", &settings);
        let pass1 = plan.invocations()[0];
        assert!(pass1.contains(&"fps=15,palettegen=max_colors=128".to_string()));
    }

    #[test]
    fn test_no_scale_preserves_source_resolution() {
        let plan = build_gif_plan("i.mp4", "o.gif", "p.png", &GifSettings::default());
        for args in plan.invocations() {
            assert!(!args.iter().any(|a| a.contains("scale=")));
        }
    }
}
