use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anstyle::{AnsiColor, Effects, Style};
use anyhow::{Context, Result};
use clap::ValueEnum;
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use tierkit_core::Catalog;
use tierkit_resolver::Tier;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn resolve_output_style(color: ColorChoice, stdout_is_tty: bool) -> OutputStyle {
    match color {
        ColorChoice::Always => OutputStyle::Rich,
        ColorChoice::Never => OutputStyle::Plain,
        ColorChoice::Auto if stdout_is_tty => OutputStyle::Rich,
        ColorChoice::Auto => OutputStyle::Plain,
    }
}

pub(crate) fn current_output_style(color: ColorChoice) -> OutputStyle {
    resolve_output_style(color, std::io::stdout().is_terminal())
}

/// Human status line. Plain output is left unadorned so it can be parsed.
pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let (badge, badge_style) = match status {
                "ok" => ("[OK]", ok_style()),
                "warn" => ("[WARN]", warn_style()),
                "err" => ("[ERR]", err_style()),
                "dry" => ("[DRY]", info_style()),
                _ => ("[..]", info_style()),
            };
            format!("{} {message}", colorize(badge_style, badge))
        }
    }
}

fn ok_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightGreen.into()))
        .effects(Effects::BOLD)
}

fn warn_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightYellow.into()))
        .effects(Effects::BOLD)
}

fn err_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightRed.into()))
        .effects(Effects::BOLD)
}

fn info_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::BrightBlue.into()))
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

fn tier_references(tiers: &[Tier], index: usize) -> Vec<String> {
    tiers
        .get(index)
        .map(|tier| tier.references().iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// `packages_<i>=<ref> <ref> ...` for every configured tier index.
pub(crate) fn format_tier_lines(tiers: &[Tier], max_tier: usize) -> Vec<String> {
    (0..=max_tier)
        .map(|index| format!("packages_{index}={}", tier_references(tiers, index).join(" ")))
        .collect()
}

/// Output sink form of the tiers: JSON arrays plus the tier count.
pub(crate) fn format_tier_output(tiers: &[Tier], max_tier: usize) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(max_tier.saturating_add(2));
    for index in 0..=max_tier {
        let references = tier_references(tiers, index);
        lines.push(format!(
            "packages_{index}={}",
            serde_json::to_string(&references).context("failed to encode tier")?
        ));
    }
    lines.push(format!("tier_count={}", tiers.len()));
    Ok(lines)
}

/// `name: v1, v2` per package, oldest version first.
pub(crate) fn format_version_lines(catalog: &Catalog) -> Vec<String> {
    catalog
        .package_names()
        .map(|name| {
            let versions = catalog
                .versions(name)
                .iter()
                .rev()
                .map(|info| info.version.to_string())
                .collect::<Vec<_>>();
            format!("{name}: {}", versions.join(", "))
        })
        .collect()
}

/// Appends `key=value` lines to an output sink such as `$GITHUB_OUTPUT`.
pub(crate) fn append_output_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open output file: {}", path.display()))?;
    for line in lines {
        writeln!(file, "{line}")
            .with_context(|| format!("failed writing output file: {}", path.display()))?;
    }
    Ok(())
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Progress over a batch of external tool runs. Only drawn for rich output.
pub(crate) struct TerminalProgress {
    style: OutputStyle,
    label: String,
    total: u64,
    current: u64,
    progress_bar: Option<ProgressBar>,
    started_at: Instant,
}

impl TerminalProgress {
    pub(crate) fn start(style: OutputStyle, label: &str, total: u64) -> Self {
        let progress_bar = if style == OutputStyle::Rich {
            let progress_bar = ProgressBar::new(total.max(1));
            if let Ok(progress_style) = ProgressStyle::with_template(
                "{spinner:.cyan.bold} {msg:<8} [{bar:20.cyan/blue}] {pos:>3}/{len:3} {elapsed_precise}",
            ) {
                progress_bar.set_style(progress_style.progress_chars("=>-"));
            }
            progress_bar.set_message(label.to_string());
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            Some(progress_bar)
        } else {
            None
        };

        Self {
            style,
            label: label.to_string(),
            total,
            current: 0,
            progress_bar,
            started_at: Instant::now(),
        }
    }

    /// Prints above the bar so status lines are not overdrawn.
    pub(crate) fn println(&self, line: &str) {
        match &self.progress_bar {
            Some(progress_bar) => progress_bar.println(line),
            None => println!("{line}"),
        }
    }

    pub(crate) fn advance(&mut self) {
        self.current = (self.current + 1).min(self.total);
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_position(self.current);
        }
    }

    pub(crate) fn finish(mut self) {
        let Some(progress_bar) = self.progress_bar.take() else {
            return;
        };
        progress_bar.finish_and_clear();
        println!(
            "{}",
            render_summary_line(
                self.style,
                &self.label,
                self.current,
                self.total,
                self.started_at.elapsed()
            )
        );
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    format!("{secs}.{millis:03}s")
}

pub(crate) fn render_summary_line(
    style: OutputStyle,
    label: &str,
    current: u64,
    total: u64,
    elapsed: Duration,
) -> String {
    let message = format!(
        "{label} {}/{} complete in {}",
        HumanCount(current),
        HumanCount(total),
        format_elapsed(elapsed)
    );
    render_status_line(style, "ok", &message)
}
