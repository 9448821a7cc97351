//! # Compression Driver Module
//!
//! Questo modulo produce la copia compressa di una singola immagine
//! delegando a tool esterni specializzati, senza processing in-memory.
//!
//! ## Architettura Zero-Dependency
//!
//! Nessuna libreria di imaging Rust per la compressione vera e propria:
//! il modulo orchestra solo tool esterni, che sono altamente ottimizzati
//! per ogni formato. Il crate `image` è usato esclusivamente per il
//! riconoscimento del formato dall'estensione.
//!
//! ## Formati Supportati
//!
//! | Formato | Tool (priorità decrescente)      |
//! |---------|----------------------------------|
//! | JPEG    | jpegoptim, mozjpeg, jpegtran     |
//! | PNG     | oxipng, optipng, pngcrush        |
//!
//! ## Pipeline per file
//!
//! 1. Rilevamento formato dall'estensione (case-insensitive)
//! 2. Output nella directory temporanea fornita, stesso base filename
//! 3. Tool selection a priorità decrescente per il formato
//! 4. Timeout per invocazione (3 minuti) per tool bloccati
//! 5. Errore se nessun tool disponibile o tutti falliscono (no silent copy)
//!
//! ## Qualità
//!
//! - `quality` (1-100) è applicata dai tool JPEG quality-aware
//!   (jpegoptim `--max=`, mozjpeg `-quality`); jpegtran è solo lossless
//! - I tool PNG sono tutti lossless: la qualità non si applica

use crate::error::OptimizeError;
use crate::platform::PlatformCommands;
use crate::utils::to_string_vec;
use anyhow::Result;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Per-invocation timeout for external tools.
const TOOL_TIMEOUT: Duration = Duration::from_secs(180);

/// Image formats this driver can compress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Classify a file by extension. No bytes are read.
    pub fn from_path(path: &Path) -> Result<Self> {
        match ImageFormat::from_path(path) {
            Ok(ImageFormat::Jpeg) => Ok(Self::Jpeg),
            Ok(ImageFormat::Png) => Ok(Self::Png),
            Ok(_) => Err(OptimizeError::Compression(format!(
                "Unsupported image format: {}",
                path.display()
            ))
            .into()),
            Err(e) => Err(OptimizeError::Image(e).into()),
        }
    }
}

/// Compresses single images via external command-line tools
pub struct ImageCompressor {
    quality: u8,
}

impl ImageCompressor {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    /// Compress `input` into `output_dir`, returning the path of the
    /// compressed file (same base filename as the input).
    pub async fn compress(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let kind = ImageKind::from_path(input)?;

        let input_str = input
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid input path: {:?}", input))?;

        let file_name = input
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid input path: {:?}", input))?;
        let output = output_dir.join(file_name);
        let output_str = output
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid output path: {:?}", output))?;

        tokio::fs::create_dir_all(output_dir).await?;

        match kind {
            ImageKind::Jpeg => self.compress_jpeg(input_str, output_str).await,
            ImageKind::Png => self.compress_png(input_str, output_str).await,
        }
    }

    /// Compress a JPEG with the best available tool.
    ///
    /// Priority: jpegoptim (quality-aware, stdout mode), mozjpeg
    /// (quality-aware), jpegtran (lossless only).
    async fn compress_jpeg(&self, input: &str, output: &str) -> Result<PathBuf> {
        // jpegoptim writes to stdout rather than an output file
        let platform = PlatformCommands::instance();
        if platform.is_command_available("jpegoptim").await {
            let max = format!("--max={}", self.quality);
            let args = to_string_vec([max.as_str(), "--stdout", input]);

            if self.run_tool_with_stdout_output("jpegoptim", &args, output).await? {
                debug!("JPEG compressed with jpegoptim: {}", output);
                return Ok(PathBuf::from(output));
            }
        }

        let tools: &[(&str, fn(&str, &str, u8) -> Vec<String>)] = &[
            ("mozjpeg", |input, output, quality| {
                let quality = quality.to_string();
                to_string_vec([
                    "-quality", quality.as_str(),
                    "-optimize",
                    "-progressive",
                    "-outfile", output,
                    input,
                ])
            }),
            ("jpegtran", |input, output, _quality| to_string_vec([
                "-optimize",
                "-progressive",
                "-outfile", output,
                input,
            ])),
        ];

        self.try_tools(input, output, self.quality, tools, "JPEG").await
    }

    /// Compress a PNG with the best available tool.
    ///
    /// Priority: oxipng (fast), optipng (aggressive), pngcrush (brute
    /// force). All three are lossless.
    async fn compress_png(&self, input: &str, output: &str) -> Result<PathBuf> {
        let tools: &[(&str, fn(&str, &str, u8) -> Vec<String>)] = &[
            ("oxipng", |input, output, _quality| to_string_vec([
                "-o", "6",
                "--strip", "all",
                "--out", output,
                input,
            ])),
            ("optipng", |input, output, _quality| to_string_vec([
                "-o7",
                "-strip", "all",
                "-out", output,
                input,
            ])),
            ("pngcrush", |input, output, _quality| to_string_vec([
                "-rem", "alla",
                "-brute",
                input,
                output,
            ])),
        ];

        self.try_tools(input, output, self.quality, tools, "PNG").await
    }

    /// Try each tool in priority order until one produces output.
    async fn try_tools(
        &self,
        input: &str,
        output: &str,
        quality: u8,
        tools: &[(&str, fn(&str, &str, u8) -> Vec<String>)],
        format_label: &str,
    ) -> Result<PathBuf> {
        let platform = PlatformCommands::instance();
        let mut any_available = false;

        for (tool, build_args) in tools {
            if !platform.is_command_available(tool).await {
                continue;
            }
            any_available = true;

            let args = build_args(input, output, quality);
            if self.run_tool(tool, &args, output).await? {
                debug!("{} compressed with {}: {}", format_label, tool, output);
                return Ok(PathBuf::from(output));
            }
            warn!("{} failed on {}, trying next tool", tool, input);
        }

        let names: Vec<&str> = tools.iter().map(|(tool, _)| *tool).collect();
        if any_available {
            Err(OptimizeError::Compression(format!(
                "All {} tools failed for {}",
                format_label, input
            ))
            .into())
        } else {
            Err(OptimizeError::MissingDependency(format!(
                "No {} tool available (install one of: {})",
                format_label,
                names.join(", ")
            ))
            .into())
        }
    }

    /// Run a tool that writes the output file itself. Returns whether it
    /// succeeded and produced a non-empty output.
    async fn run_tool(&self, tool: &str, args: &[String], output: &str) -> Result<bool> {
        let platform = PlatformCommands::instance();
        let command = platform.get_command(tool);

        let result = tokio::time::timeout(
            TOOL_TIMEOUT,
            Command::new(command).args(args).output(),
        )
        .await
        .map_err(|_| {
            OptimizeError::Compression(format!("{} timed out on {:?}", tool, args))
        })?;

        let result = match result {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to spawn {}: {}", tool, e);
                return Ok(false);
            }
        };

        if !result.status.success() {
            debug!(
                "{} exited with {}: {}",
                tool,
                result.status,
                String::from_utf8_lossy(&result.stderr)
            );
            return Ok(false);
        }

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => Ok(true),
            _ => Ok(false),
        }
    }

    /// Run a tool that writes compressed bytes to stdout, capturing them
    /// into the output file.
    async fn run_tool_with_stdout_output(
        &self,
        tool: &str,
        args: &[String],
        output: &str,
    ) -> Result<bool> {
        let platform = PlatformCommands::instance();
        let command = platform.get_command(tool);

        let result = tokio::time::timeout(
            TOOL_TIMEOUT,
            Command::new(command).args(args).output(),
        )
        .await
        .map_err(|_| {
            OptimizeError::Compression(format!("{} timed out on {:?}", tool, args))
        })?;

        let result = match result {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to spawn {}: {}", tool, e);
                return Ok(false);
            }
        };

        if !result.status.success() || result.stdout.is_empty() {
            debug!(
                "{} exited with {}: {}",
                tool,
                result.status,
                String::from_utf8_lossy(&result.stderr)
            );
            return Ok(false);
        }

        tokio::fs::write(output, &result.stdout).await?;
        Ok(true)
    }

    /// Verify that compression tools are available before any file is
    /// touched.
    ///
    /// Missing tools for one format only produce a warning (errors surface
    /// later if that format is actually encountered); the run fails only
    /// when no tool is available at all.
    pub async fn check_dependencies() -> Result<()> {
        let platform = PlatformCommands::instance();

        info!("🔧 Checking image compression tool dependencies...");

        let jpeg_tools = ["jpegoptim", "mozjpeg", "jpegtran"];
        let mut has_jpeg_tool = false;
        for tool in jpeg_tools {
            if platform.is_command_available(tool).await {
                has_jpeg_tool = true;
                break;
            }
        }

        let png_tools = ["oxipng", "optipng", "pngcrush"];
        let mut has_png_tool = false;
        for tool in png_tools {
            if platform.is_command_available(tool).await {
                has_png_tool = true;
                break;
            }
        }

        if has_jpeg_tool {
            info!("✅ JPEG compression available");
        } else {
            warn!("⚠️ No JPEG tool found (install one of: jpegoptim, mozjpeg, jpegtran)");
        }

        if has_png_tool {
            info!("✅ PNG compression available");
        } else {
            warn!("⚠️ No PNG tool found (install one of: oxipng, optipng, pngcrush)");
        }

        if !has_jpeg_tool && !has_png_tool {
            return Err(OptimizeError::MissingDependency(
                "No image compression tools available".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
