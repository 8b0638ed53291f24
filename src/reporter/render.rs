use console::style;
use crate::core::FileResultRecord;

const BAR_WIDTH: usize = 10;

/// Formats a byte count with two decimals in B, KB or MB.
pub fn pretty_size(size: u64) -> String {
    const UNITS: [&str; 3] = ["B", "KB", "MB"];
    let base = if size == 0 {
        0
    } else {
        ((size as f64).log2() / 10.0).floor().clamp(0.0, (UNITS.len() - 1) as f64) as usize
    };
    let scaled = size as f64 / 1024f64.powi(base as i32);
    format!("{scaled:.2}{}", UNITS[base])
}

/// `▐` + one `▨` per tenth + `╌` padding + `▌`.
pub fn glyph_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).floor() as usize).min(BAR_WIDTH);
    format!("▐{}{}▌", "▨".repeat(filled), "╌".repeat(BAR_WIDTH - filled))
}

/// Output size as a percentage of the original with three significant digits.
pub fn percent_of(output: u64, original: u64) -> String {
    if original == 0 {
        return "n/a".to_string();
    }
    let percent = output as f64 / original as f64 * 100.0;
    if percent == 0.0 {
        return "0.00".to_string();
    }
    let digits = percent.abs().log10().floor() as i32 + 1;
    let mut decimals = (3 - digits).max(0);
    // Rounding can carry into the next decade (99.96 -> 100.0)
    let scale = 10f64.powi(decimals);
    if (percent * scale).round() / scale >= 10f64.powi(digits) {
        decimals = (decimals - 1).max(0);
    }
    let decimals = decimals as usize;
    format!("{percent:.decimals$}")
}

/// Renders the per-file block printed under the interactive summary line.
pub fn render_results(results: &[FileResultRecord]) -> String {
    let mut text = String::new();
    for record in results {
        text.push_str(&format!(
            "\n {}: {}",
            style(&record.file).cyan(),
            pretty_size(record.size)
        ));
        for output in &record.outputs {
            let name = output
                .output_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| output.output_file.display().to_string());
            let percent = format!("{}%", percent_of(output.size, record.size));
            let percent = if output.size <= record.size {
                style(percent).green()
            } else {
                style(percent).red()
            };
            text.push_str(&format!(
                "\n  └ {:<5} → {} ({}){}",
                style(name).cyan(),
                pretty_size(output.size),
                percent,
                style(output.info_text.as_deref().unwrap_or("")).yellow()
            ));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InputFile, OutputArtifact};
    use crate::utils::EncoderKind;

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(pretty_size(0), "0.00B");
        assert_eq!(pretty_size(512), "512.00B");
        assert_eq!(pretty_size(1536), "1.50KB");
        assert_eq!(pretty_size(5 * 1024 * 1024), "5.00MB");
        // Larger values stay in MB
        assert_eq!(pretty_size(3 * 1024 * 1024 * 1024), "3072.00MB");
    }

    #[test]
    fn bar_fills_in_tenths() {
        assert_eq!(glyph_bar(0.0), "▐╌╌╌╌╌╌╌╌╌╌▌");
        assert_eq!(glyph_bar(0.55), "▐▨▨▨▨▨╌╌╌╌╌▌");
        assert_eq!(glyph_bar(1.0), "▐▨▨▨▨▨▨▨▨▨▨▌");
        assert_eq!(glyph_bar(7.0), glyph_bar(1.0));
    }

    #[test]
    fn percentages_keep_three_significant_digits() {
        assert_eq!(percent_of(457, 1000), "45.7");
        assert_eq!(percent_of(51, 1000), "5.10");
        assert_eq!(percent_of(1234, 1000), "123");
        assert_eq!(percent_of(1, 0), "n/a");
        // Rounding up into the next decade keeps three digits
        assert_eq!(percent_of(9996, 10000), "100");
        assert_eq!(percent_of(9996, 100000), "10.0");
    }

    #[test]
    fn results_list_every_output() {
        console::set_colors_enabled(false);
        let mut record = FileResultRecord::new(InputFile::new("photos/cat.png"), 2048);
        record.outputs.push(OutputArtifact {
            encoder: EncoderKind::WebP,
            extension: "webp".into(),
            size: 1024,
            info_text: Some(" (auto)".into()),
            output_file: "out/cat.webp".into(),
        });

        let text = render_results(&[record]);
        assert!(text.contains("photos/cat.png: 2.00KB"));
        assert!(text.contains("└ cat.webp → 1.00KB (50.0%) (auto)"));
    }
}
