//! Export orchestration.
//!
//! One export runs the state machine: plan outputs, write each planned
//! COLLADA document, compile animations, compile geometry assets, then
//! the optional CAF-compression and asset-optimization passes. Outputs
//! are produced and compiled strictly in planning order; later passes
//! never interleave with earlier ones. The pipeline is single-threaded
//! and owns its working directory for the duration of the call.

pub mod compiler;
pub mod settings;

pub use compiler::{
    CompilerJob, CompilerLog, CompilerResult, CompilerSeverity, ProcessResourceCompiler,
    ResourceCompiler, TracingCompilerLog,
};
pub use settings::{
    Settings, SETTING_COMPRESS_CAFS, SETTING_EXPORT_COMPRESSED_COLLADA, SETTING_OPTIMIZE_ASSETS,
};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::collada::{ColladaConfig, ColladaWriter, FileSink, PakSink};
use crate::pak::PakArchive;
use crate::scene::{GeometryFile, GeometryFileData, FILE_TYPE_CAF, FILE_TYPE_INTERMEDIATE_CAF};
use crate::source::{ExportMetadata, ExportSource, GeometrySubsetSource, SingleAnimationSource};
use crate::util::math::floating_point_has_precision_issues;
use crate::util::{Error, Result};

/// Relative path of the animation compression sidecar, searched upward
/// through the ancestors of each compiled animation.
pub const CBA_RELATIVE_PATH: &str = "Animations/Animations.cba";

/// Name of the pak archive holding compressed COLLADA documents.
pub const COMPRESSED_ARCHIVE_NAME: &str = "export.pak";

/// Extensions whose assets already use the optimized container.
const OPTIMIZABLE_EXTENSIONS: [&str; 3] = ["anm", "chr", "skin"];

/// Everything one export call needs besides the source.
#[derive(Clone, Debug, Default)]
pub struct ExportContext {
    pub metadata: ExportMetadata,
    pub settings: Settings,
    pub config: ColladaConfig,
}

/// Counters for one export call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub planned: usize,
    pub written: usize,
    pub compiled: usize,
    pub compressed: usize,
    pub optimized: usize,
}

enum OutputKind {
    /// Combined geometry document covering the retained file indices.
    Geometry { retained: Vec<usize> },
    /// One animation of one geometry file.
    Animation { animation: usize, file: usize },
}

struct PlannedOutput {
    kind: OutputKind,
    /// Intermediate COLLADA document path.
    dae_path: PathBuf,
    /// Assets the compiler is expected to produce from this document.
    expected_assets: Vec<PathBuf>,
}

/// Top-level export driver.
pub struct ExportWriter<C: ResourceCompiler> {
    compiler: C,
}

impl<C: ResourceCompiler> ExportWriter<C> {
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    /// Access the wrapped compiler.
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Run one export.
    pub fn export<S: ExportSource>(
        &self,
        source: &S,
        context: &ExportContext,
    ) -> Result<ExportSummary> {
        if floating_point_has_precision_issues() {
            error!("floating-point precision self-check failed, aborting export");
            return Err(Error::PrecisionCheck);
        }
        let Some(base_dir) = source.export_directory() else {
            error!("scene has never been saved, nowhere to export");
            return Err(Error::SceneNotSaved);
        };

        let mut files = source.geometry_files()?;
        rewrite_caf_to_intermediate(&mut files);

        let plan = self.plan_outputs(source, &files, &base_dir)?;
        let mut summary = ExportSummary {
            planned: plan.len(),
            ..Default::default()
        };
        if plan.is_empty() {
            info!("nothing to export");
            return Ok(summary);
        }

        let compressed = context
            .settings
            .bool_or(SETTING_EXPORT_COMPRESSED_COLLADA, true);
        let mut archive =
            compressed.then(|| PakArchive::create(base_dir.join(COMPRESSED_ARCHIVE_NAME)));

        // Write stage: failures are isolated per output, except directory
        // creation, which nothing downstream can recover from.
        let mut written: Vec<usize> = Vec::new();
        for (index, output) in plan.iter().enumerate() {
            info!(
                "writing {} ({}/{})",
                output.dae_path.display(),
                index + 1,
                plan.len()
            );
            match self.write_output(source, context, output, archive.as_mut()) {
                Ok(()) => written.push(index),
                Err(e @ Error::CreateDirectory { .. }) => {
                    error!("{}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!(
                        "failed to write {}: {}, skipping this output",
                        output.dae_path.display(),
                        e
                    );
                }
            }
        }
        summary.written = written.len();
        if let Some(archive) = archive {
            archive.finish()?;
        }

        let mut log = TracingCompilerLog;

        // Primary compilation: animations first, then geometry. A
        // failure here ends the whole export, unlike the write stage.
        let animation_outputs: Vec<usize> = written
            .iter()
            .copied()
            .filter(|&i| matches!(plan[i].kind, OutputKind::Animation { .. }))
            .collect();
        let geometry_outputs: Vec<usize> = written
            .iter()
            .copied()
            .filter(|&i| matches!(plan[i].kind, OutputKind::Geometry { .. }))
            .collect();

        let mut animation_assets: Vec<PathBuf> = Vec::new();
        let mut geometry_assets: Vec<PathBuf> = Vec::new();
        for &index in animation_outputs.iter().chain(geometry_outputs.iter()) {
            let output = &plan[index];
            let job = match output.kind {
                OutputKind::Animation { .. } => {
                    CompilerJob::new(&output.dae_path).with_skip_dba()
                }
                OutputKind::Geometry { .. } => CompilerJob::new(&output.dae_path),
            };
            let stage = match output.kind {
                OutputKind::Animation { .. } => "animation compilation",
                OutputKind::Geometry { .. } => "geometry compilation",
            };
            let result = self.compiler.compile(&job, &mut log)?;
            if !result.succeeded {
                error!("{} failed for {}: {}", stage, output.dae_path.display(), result.description);
                return Err(Error::compiler(stage, result.description));
            }
            summary.compiled += 1;

            for asset in &output.expected_assets {
                if !asset.exists() {
                    warn!(
                        "{} missing after successful compile, do you have an old resource compiler version?",
                        asset.display()
                    );
                }
            }
            if !compressed && !cfg!(debug_assertions) {
                let _ = fs::remove_file(&output.dae_path);
            }

            match output.kind {
                OutputKind::Animation { .. } => {
                    animation_assets.extend(output.expected_assets.iter().cloned())
                }
                OutputKind::Geometry { .. } => {
                    geometry_assets.extend(output.expected_assets.iter().cloned())
                }
            }
        }

        // CAF compression pass.
        if context.settings.bool_or(SETTING_COMPRESS_CAFS, true) {
            for asset in &animation_assets {
                let start = asset.parent().unwrap_or(Path::new("."));
                if find_cba(start).is_none() {
                    warn!(
                        "no {} found above {}, skipping compression for this file",
                        CBA_RELATIVE_PATH,
                        asset.display()
                    );
                    continue;
                }
                let job = CompilerJob::new(asset);
                let result = self.compiler.compile(&job, &mut log)?;
                if !result.succeeded {
                    error!(
                        "CAF compression failed for {}: {}",
                        asset.display(),
                        result.description
                    );
                    return Err(Error::compiler("CAF compression", result.description));
                }
                summary.compressed += 1;
            }
        }

        // Geometry-asset optimization pass.
        if context.settings.bool_or(SETTING_OPTIMIZE_ASSETS, true) {
            for asset in &geometry_assets {
                let optimizable = asset
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| OPTIMIZABLE_EXTENSIONS.contains(&e))
                    .unwrap_or(false);
                if !optimizable {
                    continue;
                }
                let job = CompilerJob::new(asset);
                let result = self.compiler.compile(&job, &mut log)?;
                if !result.succeeded {
                    error!(
                        "asset optimization failed for {}: {}",
                        asset.display(),
                        result.description
                    );
                    return Err(Error::compiler("asset optimization", result.description));
                }
                summary.optimized += 1;
            }
        }

        info!(
            "export finished: {} written, {} compiled, {} compressed, {} optimized",
            summary.written, summary.compiled, summary.compressed, summary.optimized
        );
        Ok(summary)
    }

    /// Decide which outputs this export produces, in planning order: the
    /// combined geometry document first, then one document per
    /// non-ignored animation per animation-producing geometry file.
    fn plan_outputs<S: ExportSource>(
        &self,
        source: &S,
        files: &GeometryFileData,
        base_dir: &Path,
    ) -> Result<Vec<PlannedOutput>> {
        let mut outputs = Vec::new();

        let mut retained: Vec<usize> = Vec::new();
        for (file_index, file) in files.iter().enumerate() {
            if !file.properties().wants_geometry() {
                continue;
            }
            let models = source.models(file_index)?;
            if models.iter().any(|m| m.has_geometry) {
                retained.push(file_index);
            }
        }
        if !retained.is_empty() {
            let expected_assets: Vec<PathBuf> = retained
                .iter()
                .map(|&i| {
                    let file = files.get(i).expect("retained index");
                    asset_path(base_dir, file)
                })
                .collect();
            let dae_path = expected_assets[0].with_extension("dae");
            outputs.push(PlannedOutput {
                kind: OutputKind::Geometry { retained },
                dae_path,
                expected_assets,
            });
        }

        for (file_index, file) in files.iter().enumerate() {
            if !file.properties().wants_animation() {
                continue;
            }
            for animation in 0..source.animation_count() {
                let info = source.animation_info(animation)?;
                // Names starting with an underscore are internal and
                // silently excluded.
                if info.name.starts_with('_') {
                    continue;
                }
                let dir = file_output_dir(base_dir, file);
                let extension = if file.properties().has_type(FILE_TYPE_INTERMEDIATE_CAF) {
                    "i_caf"
                } else {
                    "caf"
                };
                let asset = dir.join(format!("{}.{}", info.name, extension));
                outputs.push(PlannedOutput {
                    kind: OutputKind::Animation {
                        animation,
                        file: file_index,
                    },
                    dae_path: asset.with_extension("dae"),
                    expected_assets: vec![asset],
                });
            }
        }

        Ok(outputs)
    }

    fn write_output<S: ExportSource>(
        &self,
        source: &S,
        context: &ExportContext,
        output: &PlannedOutput,
        archive: Option<&mut PakArchive>,
    ) -> Result<()> {
        if let Some(parent) = output.dae_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        match &output.kind {
            OutputKind::Geometry { retained } => {
                let view = GeometrySubsetSource::new(source, retained.clone());
                self.write_document(&view, context, output, archive)
            }
            OutputKind::Animation { animation, file } => {
                let animation_view = SingleAnimationSource::new(source, *animation);
                let view = GeometrySubsetSource::new(&animation_view, vec![*file]);
                self.write_document(&view, context, output, archive)
            }
        }
    }

    fn write_document<S: ExportSource>(
        &self,
        source: &S,
        context: &ExportContext,
        output: &PlannedOutput,
        archive: Option<&mut PakArchive>,
    ) -> Result<()> {
        let writer =
            ColladaWriter::new(source, &context.metadata).with_config(context.config.clone());
        match archive {
            Some(archive) => {
                let entry = output
                    .dae_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| {
                        Error::WriteFailed(format!(
                            "output path {} has no file name",
                            output.dae_path.display()
                        ))
                    })?;
                writer.write(PakSink::new(archive, entry))
            }
            None => writer.write(FileSink::create(&output.dae_path)?),
        }
    }
}

/// Build a process-backed compiler, honoring the source's path override
/// when it has one.
pub fn process_compiler_for<S: ExportSource>(
    source: &S,
    default_path: impl Into<PathBuf>,
) -> ProcessResourceCompiler {
    match source.compiler_path_override() {
        Some(path) => ProcessResourceCompiler::new(path),
        None => ProcessResourceCompiler::new(default_path),
    }
}

/// Swap the CAF bit for intermediate-CAF so the compression pass
/// produces the final container.
fn rewrite_caf_to_intermediate(files: &mut GeometryFileData) {
    for index in 0..files.len() {
        let Some(file) = files.get(index) else { continue };
        let properties = file.properties();
        if properties.has_type(FILE_TYPE_CAF) {
            let mut rewritten = properties.clone();
            rewritten.file_types =
                (rewritten.file_types & !FILE_TYPE_CAF) | FILE_TYPE_INTERMEDIATE_CAF;
            files.set_properties(index, rewritten);
        }
    }
}

/// Output directory for one geometry file: its custom export path when
/// set, the scene directory otherwise.
fn file_output_dir(base_dir: &Path, file: &GeometryFile) -> PathBuf {
    match &file.properties().custom_export_path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => base_dir.join(path),
        None => base_dir.to_path_buf(),
    }
}

/// Compiled asset path of one geometry file.
fn asset_path(base_dir: &Path, file: &GeometryFile) -> PathBuf {
    file_output_dir(base_dir, file).join(format!(
        "{}.{}",
        file.name(),
        file.properties().primary_extension()
    ))
}

/// Search upward from `start` for the compression sidecar.
fn find_cba(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(CBA_RELATIVE_PATH);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}
