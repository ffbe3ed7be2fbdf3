//! End-to-end orchestrator tests with a scripted source and compiler.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use collada_export::export::{
    CompilerJob, CompilerLog, CompilerResult, ExportContext, ExportWriter, ResourceCompiler,
    CBA_RELATIVE_PATH, COMPRESSED_ARCHIVE_NAME, SETTING_EXPORT_COMPRESSED_COLLADA,
};
use collada_export::scene::*;
use collada_export::source::{AnimationInfo, ExportSource};
use collada_export::util::math::Vec3;
use collada_export::util::{Error, Result};

#[derive(Default)]
struct ScriptedSource {
    dir: Option<PathBuf>,
    files: GeometryFileData,
    models: Vec<ModelData>,
    materials: MaterialData,
    geometries: BTreeMap<(usize, usize), GeometryData>,
    animations: Vec<AnimationInfo>,
    compiler_override: Option<PathBuf>,
}

impl ExportSource for ScriptedSource {
    fn export_directory(&self) -> Option<PathBuf> {
        self.dir.clone()
    }

    fn geometry_files(&self) -> Result<GeometryFileData> {
        Ok(self.files.clone())
    }

    fn models(&self, file: usize) -> Result<ModelData> {
        Ok(self
            .models
            .get(file)
            .cloned()
            .unwrap_or_else(ModelData::new))
    }

    fn materials(&self) -> Result<MaterialData> {
        Ok(self.materials.clone())
    }

    fn skeleton(&self, _file: usize, _model: usize) -> Result<Option<SkeletonData>> {
        Ok(None)
    }

    fn geometry(&self, file: usize, model: usize) -> Result<GeometryData> {
        self.geometries
            .get(&(file, model))
            .cloned()
            .ok_or_else(|| Error::invalid("no geometry"))
    }

    fn bone_geometry(&self, _file: usize, _model: usize, _bone: usize) -> Result<GeometryData> {
        Err(Error::invalid("no bone geometry"))
    }

    fn morph_geometry(&self, _file: usize, _model: usize, _morph: usize) -> Result<GeometryData> {
        Err(Error::invalid("no morph geometry"))
    }

    fn skinning(&self, _file: usize, _model: usize) -> Result<Option<SkinningData>> {
        Ok(None)
    }

    fn morphs(&self, _file: usize, _model: usize) -> Result<MorphData> {
        Ok(MorphData::new())
    }

    fn animation_count(&self) -> usize {
        self.animations.len()
    }

    fn animation_info(&self, index: usize) -> Result<AnimationInfo> {
        self.animations
            .get(index)
            .cloned()
            .ok_or_else(|| Error::invalid("no such animation"))
    }

    fn skeletal_animation(
        &self,
        _animation: usize,
        _file: usize,
        _model: usize,
    ) -> Result<Option<AnimationData>> {
        Ok(None)
    }

    fn spline_animation(
        &self,
        _animation: usize,
        _file: usize,
        _model: usize,
    ) -> Result<Option<NonSkeletalAnimationData>> {
        Ok(None)
    }

    fn compiler_path_override(&self) -> Option<PathBuf> {
        self.compiler_override.clone()
    }
}

/// Compiler double recording every job; optionally fails the nth call.
#[derive(Default)]
struct ScriptedCompiler {
    jobs: RefCell<Vec<CompilerJob>>,
    fail_on: Option<usize>,
}

impl ResourceCompiler for ScriptedCompiler {
    fn compile(&self, job: &CompilerJob, _log: &mut dyn CompilerLog) -> Result<CompilerResult> {
        let call = self.jobs.borrow().len();
        self.jobs.borrow_mut().push(job.clone());
        if self.fail_on == Some(call) {
            return Ok(CompilerResult::failure("scripted failure"));
        }
        Ok(CompilerResult::success())
    }
}

fn uncompressed_context() -> ExportContext {
    let mut context = ExportContext::default();
    context.settings.set(SETTING_EXPORT_COMPRESSED_COLLADA, 0);
    context
}

fn caf_source(dir: PathBuf) -> ScriptedSource {
    let mut source = ScriptedSource {
        dir: Some(dir),
        ..Default::default()
    };
    source.files.add_file(
        1,
        "hero",
        FileProperties {
            file_types: FILE_TYPE_CAF,
            ..Default::default()
        },
    );
    source.models.push(ModelData::new());
    source.animations.push(AnimationInfo {
        name: "Run".into(),
        start: 0.0,
        end: 1.0,
    });
    source.animations.push(AnimationInfo {
        name: "_Internal".into(),
        start: 0.0,
        end: 1.0,
    });
    source
}

fn geometry_source(dir: PathBuf, file_types: u32) -> ScriptedSource {
    let mut source = ScriptedSource {
        dir: Some(dir),
        ..Default::default()
    };
    source.files.add_file(
        1,
        "crate",
        FileProperties {
            file_types,
            ..Default::default()
        },
    );
    let mut models = ModelData::new();
    let index = models.add_model(1, "Box", None).unwrap();
    models.get_mut(index).unwrap().has_geometry = true;
    source.models.push(models);

    let mut geometry = GeometryData::new();
    geometry.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    geometry
        .add_polygon(Polygon {
            material_id: -1,
            vertices: [
                PolygonVertex::position_only(0),
                PolygonVertex::position_only(1),
                PolygonVertex::position_only(2),
            ],
        })
        .unwrap();
    source.geometries.insert((0, 0), geometry);
    source
}

#[test]
fn test_empty_scene_plans_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = ScriptedSource {
        dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let compiler = ScriptedCompiler::default();
    let writer = ExportWriter::new(compiler);

    let summary = writer.export(&source, &uncompressed_context()).unwrap();
    assert_eq!(summary.planned, 0);
    assert_eq!(summary.compiled, 0);
}

#[test]
fn test_unsaved_scene_is_rejected() {
    let source = ScriptedSource::default();
    let writer = ExportWriter::new(ScriptedCompiler::default());
    assert!(matches!(
        writer.export(&source, &uncompressed_context()),
        Err(Error::SceneNotSaved)
    ));
}

#[test]
fn test_underscore_animations_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let source = caf_source(dir.path().to_path_buf());
    let writer = ExportWriter::new(ScriptedCompiler::default());

    let summary = writer.export(&source, &uncompressed_context()).unwrap();
    assert_eq!(summary.planned, 1);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.compiled, 1);

    let jobs = writer_jobs(&writer);
    // The CAF mask is rewritten to intermediate-CAF, the document keeps
    // the animation's name, and "_Internal" never shows up.
    assert_eq!(jobs[0].file, dir.path().join("Run.dae"));
    assert!(jobs[0].skip_dba);
    assert!(jobs.iter().all(|j| !j.file.to_string_lossy().contains("_Internal")));
}

#[test]
fn test_compression_runs_when_sidecar_found() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Animations")).unwrap();
    fs::write(dir.path().join(CBA_RELATIVE_PATH), "").unwrap();

    let source = caf_source(dir.path().to_path_buf());
    let writer = ExportWriter::new(ScriptedCompiler::default());
    let summary = writer.export(&source, &uncompressed_context()).unwrap();
    assert_eq!(summary.compressed, 1);

    let jobs = writer_jobs(&writer);
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].file, dir.path().join("Run.i_caf"));
}

#[test]
fn test_missing_sidecar_skips_compression() {
    let dir = tempfile::tempdir().unwrap();
    let source = caf_source(dir.path().to_path_buf());
    let writer = ExportWriter::new(ScriptedCompiler::default());

    let summary = writer.export(&source, &uncompressed_context()).unwrap();
    assert_eq!(summary.compiled, 1);
    assert_eq!(summary.compressed, 0);
    assert_eq!(writer_jobs(&writer).len(), 1);
}

#[test]
fn test_compile_failure_stops_before_compression() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Animations")).unwrap();
    fs::write(dir.path().join(CBA_RELATIVE_PATH), "").unwrap();

    let source = caf_source(dir.path().to_path_buf());
    let compiler = ScriptedCompiler {
        fail_on: Some(0),
        ..Default::default()
    };
    let writer = ExportWriter::new(compiler);

    let result = writer.export(&source, &uncompressed_context());
    assert!(matches!(result, Err(Error::CompilerFailed { .. })));
    // The failing primary pass was the only invocation; the compression
    // stage never ran.
    assert_eq!(writer_jobs(&writer).len(), 1);
}

#[test]
fn test_geometry_export_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let source = geometry_source(dir.path().to_path_buf(), FILE_TYPE_CGF);
    let writer = ExportWriter::new(ScriptedCompiler::default());

    let summary = writer.export(&source, &uncompressed_context()).unwrap();
    assert_eq!(summary.planned, 1);
    assert_eq!(summary.compiled, 1);
    assert_eq!(summary.optimized, 0);

    // Release builds delete the intermediate document after compiling.
    if cfg!(debug_assertions) {
        let document = fs::read_to_string(dir.path().join("crate.dae")).unwrap();
        assert!(document.starts_with("<?xml"));
        assert!(document.contains("ExportNode_crate"));
    }
}

#[test]
fn test_optimization_pass_covers_chr_assets() {
    let dir = tempfile::tempdir().unwrap();
    let source = geometry_source(dir.path().to_path_buf(), FILE_TYPE_CHR);
    let writer = ExportWriter::new(ScriptedCompiler::default());

    let summary = writer.export(&source, &uncompressed_context()).unwrap();
    assert_eq!(summary.optimized, 1);

    let jobs = writer_jobs(&writer);
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].file, dir.path().join("crate.chr"));
}

#[test]
fn test_compressed_export_goes_into_pak() {
    let dir = tempfile::tempdir().unwrap();
    let source = geometry_source(dir.path().to_path_buf(), FILE_TYPE_CGF);
    let writer = ExportWriter::new(ScriptedCompiler::default());

    // Default settings: compressed COLLADA output.
    let summary = writer.export(&source, &ExportContext::default()).unwrap();
    assert_eq!(summary.written, 1);
    assert!(dir.path().join(COMPRESSED_ARCHIVE_NAME).exists());
    assert!(!dir.path().join("crate.dae").exists());
}

#[test]
fn test_compiler_path_override() {
    use std::path::Path;

    let source = ScriptedSource::default();
    let compiler = collada_export::export::process_compiler_for(&source, "/opt/engine/rc");
    assert_eq!(compiler.executable(), Path::new("/opt/engine/rc"));

    let source = ScriptedSource {
        compiler_override: Some(PathBuf::from("/custom/rc")),
        ..Default::default()
    };
    let compiler = collada_export::export::process_compiler_for(&source, "/opt/engine/rc");
    assert_eq!(compiler.executable(), Path::new("/custom/rc"));
}

fn writer_jobs(writer: &ExportWriter<ScriptedCompiler>) -> Vec<CompilerJob> {
    writer.compiler().jobs.borrow().clone()
}
