//! Animation clip and curve emission.
//!
//! Skeletal and non-skeletal animation are mutually exclusive per
//! (geometry file, model) pair: a pair with a skeleton entry emits
//! constant-rate bone channels with linear interpolation only, a pair
//! without one emits keyframe channels carrying TCB and ease arrays for
//! the engine's spline evaluator.

use crate::collada::lists::{
    sanitize_name, AnimationChannelEntry, ChannelKind, DocumentLists, CHANNELS_PER_NODE,
};
use crate::collada::sink::XmlSink;
use crate::collada::xml::XmlWriter;
use crate::scene::SplineKey;
use crate::source::ExportSource;
use crate::util::Result;

use super::SceneSnapshot;

/// Sampled data of one emitted channel.
pub struct ChannelData {
    /// Index into `lists.animation_channels`.
    pub entry_index: usize,
    pub times: Vec<f32>,
    pub values: Vec<f32>,
    pub interpolation: &'static str,
    /// Tension/continuity/bias per key; non-skeletal channels only.
    pub tcb: Option<Vec<[f32; 3]>>,
    /// Ease-in/ease-out per key; non-skeletal channels only.
    pub ease: Option<Vec<[f32; 2]>>,
}

/// Everything emitted for one animation of the source.
pub struct AnimationPlan {
    pub name: String,
    pub start: f32,
    pub end: f32,
    pub channels: Vec<ChannelData>,
}

impl AnimationPlan {
    /// Clip id in the document.
    pub fn clip_id(&self) -> String {
        sanitize_name(&self.name)
    }
}

/// Sample every animation of the source into emission plans. Reading is
/// done once here; the clip and curve sections both consume the result.
pub fn build_animation_plans<S: ExportSource>(
    source: &S,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
) -> Result<Vec<AnimationPlan>> {
    let mut plans = Vec::new();

    for animation in 0..source.animation_count() {
        let info = source.animation_info(animation)?;
        let mut channels = Vec::new();

        for (file_index, model_data) in snapshot.models.iter().enumerate() {
            for model_index in 0..model_data.len() {
                let key = (file_index, model_index);
                if let Some(skeleton) = snapshot.skeletons.get(&key) {
                    let Some(data) =
                        source.skeletal_animation(animation, file_index, model_index)?
                    else {
                        continue;
                    };
                    for bone_index in 0..skeleton.len().min(data.num_bones()) {
                        let track = data.track(bone_index);
                        if track.is_empty() {
                            continue;
                        }
                        let first = lists.bone_animation_map[&(key, bone_index)];
                        let times: Vec<f32> =
                            (0..track.len()).map(|i| data.sample_time(i)).collect();
                        for offset in 0..CHANNELS_PER_NODE {
                            let entry_index = first + offset;
                            let target = lists.animation_channels[entry_index].target;
                            let values: Vec<f32> = track
                                .iter()
                                .map(|sample| match target.kind() {
                                    ChannelKind::Translation => {
                                        sample.translation[target.component()]
                                    }
                                    ChannelKind::Rotation => {
                                        sample.rotation_deg[target.component()]
                                    }
                                    ChannelKind::Scale => sample.scale[target.component()],
                                })
                                .collect();
                            channels.push(ChannelData {
                                entry_index,
                                times: times.clone(),
                                values,
                                interpolation: "LINEAR",
                                tcb: None,
                                ease: None,
                            });
                        }
                    }
                } else {
                    let Some(data) =
                        source.spline_animation(animation, file_index, model_index)?
                    else {
                        continue;
                    };
                    if data.is_empty() {
                        continue;
                    }
                    let first = lists.model_animation_map[&key];
                    for offset in 0..CHANNELS_PER_NODE {
                        let entry_index = first + offset;
                        let target = lists.animation_channels[entry_index].target;
                        let keys: &[SplineKey] = match target.kind() {
                            ChannelKind::Translation => &data.tracks().position,
                            ChannelKind::Rotation => &data.tracks().rotation,
                            ChannelKind::Scale => &data.tracks().scale,
                        };
                        if keys.is_empty() {
                            continue;
                        }
                        channels.push(ChannelData {
                            entry_index,
                            times: keys.iter().map(|k| k.time).collect(),
                            values: keys
                                .iter()
                                .map(|k| k.value[target.component()])
                                .collect(),
                            interpolation: "TCB",
                            tcb: Some(keys.iter().map(|k| k.tcb).collect()),
                            ease: Some(keys.iter().map(|k| [k.ease_in, k.ease_out]).collect()),
                        });
                    }
                }
            }
        }

        plans.push(AnimationPlan {
            name: info.name,
            start: info.start,
            end: info.end,
            channels,
        });
    }

    Ok(plans)
}

/// Per-animation metadata referencing the emitted channels.
pub fn write_animation_clips<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    lists: &DocumentLists,
    plans: &[AnimationPlan],
) -> Result<()> {
    xml.begin("library_animation_clips")?;
    for plan in plans {
        let clip_id = plan.clip_id();
        xml.begin("animation_clip")?;
        xml.attr("id", &clip_id)?;
        xml.attr("name", &plan.name)?;
        xml.attr_f32("start", plan.start)?;
        xml.attr_f32("end", plan.end)?;
        for channel in &plan.channels {
            let entry = &lists.animation_channels[channel.entry_index];
            xml.begin("instance_animation")?;
            xml.attr("url", &format!("#{}", animation_id(&clip_id, entry)))?;
            xml.end()?;
        }
        xml.end()?;
    }
    xml.end()
}

/// Sampled curve data: one `<animation>` per channel with time, value,
/// and interpolation sources, plus TCB and ease sources on the
/// non-skeletal path.
pub fn write_animations<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    lists: &DocumentLists,
    plans: &[AnimationPlan],
) -> Result<()> {
    xml.begin("library_animations")?;
    for plan in plans {
        let clip_id = plan.clip_id();
        for channel in &plan.channels {
            let entry = &lists.animation_channels[channel.entry_index];
            write_channel(xml, &clip_id, entry, channel)?;
        }
    }
    xml.end()
}

fn animation_id(clip_id: &str, entry: &AnimationChannelEntry) -> String {
    format!("{}-{}", clip_id, entry.name)
}

fn write_channel<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    clip_id: &str,
    entry: &AnimationChannelEntry,
    channel: &ChannelData,
) -> Result<()> {
    let id = animation_id(clip_id, entry);
    let key_count = channel.times.len();

    xml.begin("animation")?;
    xml.attr("id", &id)?;

    write_float_source(xml, &format!("{}-input", id), &channel.times, &["TIME"])?;
    write_float_source(xml, &format!("{}-output", id), &channel.values, &["VALUE"])?;

    // Interpolation names, one per key.
    let interp_id = format!("{}-interpolation", id);
    xml.begin("source")?;
    xml.attr("id", &interp_id)?;
    xml.begin("Name_array")?;
    xml.attr("id", &format!("{}-array", interp_id))?;
    xml.attr_usize("count", key_count)?;
    xml.text_names((0..key_count).map(|_| channel.interpolation))?;
    xml.end()?;
    xml.begin("technique_common")?;
    xml.begin("accessor")?;
    xml.attr("source", &format!("#{}-array", interp_id))?;
    xml.attr_usize("count", key_count)?;
    xml.begin("param")?;
    xml.attr("name", "INTERPOLATION")?;
    xml.attr("type", "name")?;
    xml.end()?;
    xml.end()?;
    xml.end()?;
    xml.end()?;

    if let Some(tcb) = &channel.tcb {
        write_float_source(
            xml,
            &format!("{}-tcbs", id),
            &tcb.iter().flatten().copied().collect::<Vec<_>>(),
            &["TENSION", "CONTINUITY", "BIAS"],
        )?;
    }
    if let Some(ease) = &channel.ease {
        write_float_source(
            xml,
            &format!("{}-eases", id),
            &ease.iter().flatten().copied().collect::<Vec<_>>(),
            &["EASE_IN", "EASE_OUT"],
        )?;
    }

    xml.begin("sampler")?;
    xml.attr("id", &format!("{}-sampler", id))?;
    write_sampler_input(xml, "INPUT", &format!("#{}-input", id))?;
    write_sampler_input(xml, "OUTPUT", &format!("#{}-output", id))?;
    write_sampler_input(xml, "INTERPOLATION", &format!("#{}-interpolation", id))?;
    if channel.tcb.is_some() {
        write_sampler_input(xml, "TCB", &format!("#{}-tcbs", id))?;
    }
    if channel.ease.is_some() {
        write_sampler_input(xml, "EASE_IN_OUT", &format!("#{}-eases", id))?;
    }
    xml.end()?;

    xml.begin("channel")?;
    xml.attr("source", &format!("#{}-sampler", id))?;
    xml.attr(
        "target",
        &format!("{}/{}", entry.node_name, entry.target.target_suffix()),
    )?;
    xml.end()?;

    xml.end()
}

fn write_sampler_input<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    semantic: &str,
    source: &str,
) -> Result<()> {
    xml.begin("input")?;
    xml.attr("semantic", semantic)?;
    xml.attr("source", source)?;
    xml.end()
}

/// A float source with one named param per stride component.
fn write_float_source<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    id: &str,
    values: &[f32],
    params: &[&str],
) -> Result<()> {
    let stride = params.len();
    xml.begin("source")?;
    xml.attr("id", id)?;
    xml.begin("float_array")?;
    xml.attr("id", &format!("{}-array", id))?;
    xml.attr_usize("count", values.len())?;
    xml.text_floats(values.iter().copied())?;
    xml.end()?;
    xml.begin("technique_common")?;
    xml.begin("accessor")?;
    xml.attr("source", &format!("#{}-array", id))?;
    xml.attr_usize("count", values.len() / stride.max(1))?;
    if stride > 1 {
        xml.attr_usize("stride", stride)?;
    }
    for param in params {
        xml.begin("param")?;
        xml.attr("name", param)?;
        xml.attr("type", "float")?;
        xml.end()?;
    }
    xml.end()?;
    xml.end()?;
    xml.end()
}
