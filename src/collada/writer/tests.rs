use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::collada::sink::VecSink;
use crate::scene::*;
use crate::source::{AnimationInfo, ExportMetadata, ExportSource, UpAxis};
use crate::util::math::Vec3;
use crate::util::{Error, Result};

use super::{ColladaConfig, ColladaWriter};

/// Scripted source for writer tests.
#[derive(Default)]
struct MockSource {
    dir: Option<PathBuf>,
    files: GeometryFileData,
    models: Vec<ModelData>,
    materials: MaterialData,
    skeletons: BTreeMap<(usize, usize), SkeletonData>,
    geometries: BTreeMap<(usize, usize), GeometryData>,
    skinnings: BTreeMap<(usize, usize), SkinningData>,
    morphs: BTreeMap<(usize, usize), MorphData>,
    morph_geometries: BTreeMap<(usize, usize, usize), GeometryData>,
    bone_geometries: BTreeMap<(usize, usize, usize), GeometryData>,
    animations: Vec<AnimationInfo>,
    skeletal_tracks: BTreeMap<(usize, usize, usize), AnimationData>,
    spline_tracks: BTreeMap<(usize, usize, usize), NonSkeletalAnimationData>,
}

impl ExportSource for MockSource {
    fn export_directory(&self) -> Option<PathBuf> {
        self.dir.clone()
    }

    fn geometry_files(&self) -> Result<GeometryFileData> {
        Ok(self.files.clone())
    }

    fn models(&self, file: usize) -> Result<ModelData> {
        Ok(self.models[file].clone())
    }

    fn materials(&self) -> Result<MaterialData> {
        Ok(self.materials.clone())
    }

    fn skeleton(&self, file: usize, model: usize) -> Result<Option<SkeletonData>> {
        Ok(self.skeletons.get(&(file, model)).cloned())
    }

    fn geometry(&self, file: usize, model: usize) -> Result<GeometryData> {
        self.geometries
            .get(&(file, model))
            .cloned()
            .ok_or_else(|| Error::invalid("no geometry"))
    }

    fn bone_geometry(&self, file: usize, model: usize, bone: usize) -> Result<GeometryData> {
        self.bone_geometries
            .get(&(file, model, bone))
            .cloned()
            .ok_or_else(|| Error::invalid("no bone geometry"))
    }

    fn morph_geometry(&self, file: usize, model: usize, morph: usize) -> Result<GeometryData> {
        self.morph_geometries
            .get(&(file, model, morph))
            .cloned()
            .ok_or_else(|| Error::invalid("no morph geometry"))
    }

    fn skinning(&self, file: usize, model: usize) -> Result<Option<SkinningData>> {
        Ok(self.skinnings.get(&(file, model)).cloned())
    }

    fn morphs(&self, file: usize, model: usize) -> Result<MorphData> {
        Ok(self.morphs.get(&(file, model)).cloned().unwrap_or_default())
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
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<AnimationData>> {
        Ok(self.skeletal_tracks.get(&(animation, file, model)).cloned())
    }

    fn spline_animation(
        &self,
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<NonSkeletalAnimationData>> {
        Ok(self.spline_tracks.get(&(animation, file, model)).cloned())
    }
}

fn metadata() -> ExportMetadata {
    ExportMetadata {
        author: "tester".into(),
        tool: "collada-export tests".into(),
        up_axis: UpAxis::Z,
        meters_per_unit: 1.0,
        frame_rate: 30.0,
    }
}

fn triangle_geometry(with_normals: bool) -> GeometryData {
    let mut geometry = GeometryData::new();
    geometry.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    if with_normals {
        geometry.normals = vec![Vec3::Z];
    }
    let vertex = |p: i32| PolygonVertex {
        position: p,
        normal: if with_normals { 0 } else { -1 },
        tex_coord: -1,
        color: -1,
    };
    geometry
        .add_polygon(Polygon {
            material_id: 0,
            vertices: [vertex(0), vertex(1), vertex(2)],
        })
        .unwrap();
    geometry
}

fn single_model_source() -> MockSource {
    let mut source = MockSource::default();
    source.files.add_file(
        1,
        "crate",
        FileProperties {
            file_types: FILE_TYPE_CGF,
            ..Default::default()
        },
    );
    let mut models = ModelData::new();
    let index = models.add_model(1, "Box", None).unwrap();
    models.get_mut(index).unwrap().has_geometry = true;
    source.models.push(models);
    source.materials.add_material(Material {
        name: "steel".into(),
        id: 0,
        sub_material_name: String::new(),
        handle: 1,
        properties: String::new(),
    });
    source.geometries.insert((0, 0), triangle_geometry(true));
    source
}

fn write_document(source: &MockSource) -> String {
    let meta = metadata();
    let writer = ColladaWriter::new(source, &meta);
    let mut sink = VecSink::new();
    writer.write(&mut sink).unwrap();
    String::from_utf8(sink.into_bytes()).unwrap()
}

#[test]
fn test_triangle_inputs_skip_absent_streams() {
    let source = single_model_source();
    let out = write_document(&source);

    assert!(out.contains(r##"<input semantic="VERTEX" source="#Box-vertices" offset="0"/>"##));
    assert!(out.contains(r##"<input semantic="NORMAL" source="#Box-normals" offset="1"/>"##));
    // No UV or color streams: no inputs, no gaps in offsets.
    assert!(!out.contains(r#"semantic="TEXCOORD""#));
    assert!(!out.contains(r#"semantic="COLOR""#));
    assert!(out.contains(r#"<triangles count="1" material="steel__1__">"#));
}

#[test]
fn test_output_is_reproducible() {
    let source = single_model_source();
    assert_eq!(write_document(&source), write_document(&source));
}

#[test]
fn test_library_order_is_fixed() {
    let source = single_model_source();
    let out = write_document(&source);
    let sections = [
        "<asset>",
        "<library_animation_clips",
        "<library_animations",
        "<library_effects",
        "<library_materials",
        "<library_geometries",
        "<library_controllers",
        "<library_visual_scenes",
        "<library_images",
        "<scene>",
    ];
    let mut last = 0;
    for section in sections {
        let position = out[last..]
            .find(section)
            .unwrap_or_else(|| panic!("section {} missing or out of order", section));
        last += position;
    }
}

#[test]
fn test_export_node_marker_and_empty_images() {
    let source = single_model_source();
    let out = write_document(&source);
    assert!(out.contains(r#"<node id="ExportNode_crate" name="ExportNode_crate">"#));
    assert!(out.contains("fileType=cgf"));
    assert!(out.contains("<library_images/>"));
}

#[test]
fn test_skeletal_and_spline_paths_are_exclusive() {
    let mut source = MockSource::default();
    source.files.add_file(
        1,
        "mixed",
        FileProperties {
            file_types: FILE_TYPE_CHR,
            ..Default::default()
        },
    );
    let mut models = ModelData::new();
    let hero = models.add_model(1, "Hero", None).unwrap();
    models.get_mut(hero).unwrap().has_geometry = true;
    models.add_model(2, "Helper", None).unwrap();
    source.models.push(models);

    let mut skeleton = SkeletonData::new();
    skeleton.add_bone(1, "Pelvis", None).unwrap();
    source.skeletons.insert((0, 0), skeleton);
    source.geometries.insert((0, 0), triangle_geometry(false));

    source.animations.push(AnimationInfo {
        name: "Run".into(),
        start: 0.0,
        end: 1.0,
    });

    let mut skeletal = AnimationData::new(0.0, 30.0, 1);
    for i in 0..3 {
        skeletal.push_sample(
            0,
            TrsSample {
                translation: Vec3::new(i as f32, 0.0, 0.0),
                rotation_deg: Vec3::ZERO,
                scale: Vec3::ONE,
            },
        );
    }
    source.skeletal_tracks.insert((0, 0, 0), skeletal);

    let mut tracks = SplineTracks::default();
    tracks.position.push(SplineKey {
        time: 0.0,
        value: Vec3::ZERO,
        tcb: [0.1, 0.2, 0.3],
        ease_in: 0.4,
        ease_out: 0.5,
    });
    source
        .spline_tracks
        .insert((0, 0, 1), NonSkeletalAnimationData::new(tracks));

    let out = write_document(&source);

    // Bone channels carry linear interpolation and no TCB/ease sources.
    assert!(out.contains("Pelvis%Hero%/translation.X"));
    assert!(!out.contains("Pelvis%Hero%-translation_X-tcbs"));
    assert!(out.contains(">LINEAR"));
    // The helper's channels carry TCB and ease arrays.
    assert!(out.contains("Run-Helper-translation_X-tcbs"));
    assert!(out.contains("Run-Helper-translation_X-eases"));
    assert!(out.contains(r#"target="Helper/translation.X""#));
    assert!(out.contains(">TCB"));
    // Clips reference only channels that have data.
    assert!(out.contains(r##"<instance_animation url="#Run-Pelvis%Hero%-translation_X"/>"##));
    assert!(!out.contains(r##"url="#Run-Helper-scale_X"##));
}

#[test]
fn test_skin_controller_wins_over_geometry_instance() {
    let mut source = single_model_source();
    let mut skeleton = SkeletonData::new();
    skeleton.add_bone(1, "Pelvis", None).unwrap();
    source.skeletons.insert((0, 0), skeleton);
    let mut skinning = SkinningData::new();
    for _ in 0..3 {
        skinning.add_vertex([VertexWeight {
            bone_index: 0,
            weight: 1.0,
        }]);
    }
    source.skinnings.insert((0, 0), skinning);

    let out = write_document(&source);
    assert!(out.contains(r##"<instance_controller url="#Box_skinController">"##));
    // The node instances the controller, not the mesh; the skin itself
    // still references the mesh source.
    assert!(!out.contains(r##"<instance_geometry url="#Box">"##));
    assert!(out.contains(r##"<skin source="#Box">"##));
    assert!(out.contains("<vcount>1 1 1</vcount>"));
    assert!(out.contains("<v>0 0 0 1 0 2</v>"));
}

#[test]
fn test_morph_controller_lists_targets() {
    let mut source = single_model_source();
    let mut morphs = MorphData::new();
    morphs.add_target(MorphTarget {
        handle: 9,
        name: "smile".into(),
        full_name: None,
    });
    source.morphs.insert((0, 0), morphs);
    source
        .morph_geometries
        .insert((0, 0, 0), triangle_geometry(false));

    let out = write_document(&source);
    assert!(out.contains(r##"<morph source="#Box" method="NORMALIZED">"##));
    assert!(out.contains("Box_morph_smile"));
    assert!(out.contains(r#"<param name="MORPH_WEIGHT" type="float"/>"#));
}

#[test]
fn test_physics_hierarchy_skips_unphysicalized_bones() {
    let mut source = single_model_source();
    let mut skeleton = SkeletonData::new();
    let root = skeleton.add_bone(1, "Root", None).unwrap();
    let middle = skeleton.add_bone(2, "Middle", Some(root)).unwrap();
    let tip = skeleton.add_bone(3, "Tip", Some(middle)).unwrap();
    skeleton.get_mut(middle).unwrap().translation = Vec3::new(0.0, 1.0, 0.0);
    skeleton.get_mut(tip).unwrap().physicalized = true;
    skeleton.get_mut(tip).unwrap().translation = Vec3::new(2.0, 0.0, 0.0);
    source.skeletons.insert((0, 0), skeleton);

    let out = write_document(&source);
    // Only the physicalized bone gets a proxy node.
    assert!(out.contains(r#"<node id="Tip%Box%_Phys""#));
    assert!(!out.contains(r#"<node id="Root%Box%_Phys""#));
    assert!(!out.contains(r#"<node id="Middle%Box%_Phys""#));
    // The render skeleton still contains all three joints.
    assert!(out.contains(r#"<node id="Root%Box%""#));
    assert!(out.contains(r#"<node id="Middle%Box%""#));
    assert!(out.contains(r#"<node id="Tip%Box%""#));
}

#[test]
fn test_read_failure_aborts_write() {
    let mut source = single_model_source();
    // Geometry flagged but not provided: the read pass must fail.
    source.geometries.clear();

    let meta = metadata();
    let writer = ColladaWriter::new(&source, &meta);
    let mut sink = VecSink::new();
    assert!(writer.write(&mut sink).is_err());
}

#[test]
fn test_pelvis_reorder_is_opt_in() {
    let mut source = single_model_source();
    let mut skeleton = SkeletonData::new();
    let root = skeleton.add_bone(1, "Bip01", None).unwrap();
    skeleton.add_bone(2, "Bip01 Spine", Some(root)).unwrap();
    skeleton.add_bone(3, "Bip01 Pelvis", Some(root)).unwrap();
    source.skeletons.insert((0, 0), skeleton);

    let meta = metadata();

    // Default: order preserved, spine stays at index 1.
    let out = write_document(&source);
    let spine = out.find("Bip01_Spine%Box%").unwrap();
    let pelvis = out.find("Bip01_Pelvis%Box%").unwrap();
    assert!(spine < pelvis);

    // Opt-in: the pelvis moves to index 1 and now precedes the spine in
    // the controller joint list.
    let writer = ColladaWriter::new(&source, &meta).with_config(ColladaConfig {
        force_pelvis_bone_1: true,
    });
    let mut sink = VecSink::new();
    writer.write(&mut sink).unwrap();
    let out = String::from_utf8(sink.into_bytes()).unwrap();
    let spine = out.find("Bip01_Spine%Box%").unwrap();
    let pelvis = out.find("Bip01_Pelvis%Box%").unwrap();
    assert!(pelvis < spine);
}
