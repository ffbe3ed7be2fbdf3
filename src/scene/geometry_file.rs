//! Geometry files: one exportable unit per DCC "file" grouping.

use std::path::PathBuf;

/// Static geometry container.
pub const FILE_TYPE_CGF: u32 = 1 << 0;
/// Animated geometry container.
pub const FILE_TYPE_CGA: u32 = 1 << 1;
/// Character (skinned) container.
pub const FILE_TYPE_CHR: u32 = 1 << 2;
/// Compiled animation container.
pub const FILE_TYPE_CAF: u32 = 1 << 3;
/// Node animation container.
pub const FILE_TYPE_ANM: u32 = 1 << 4;
/// Skin attachment container.
pub const FILE_TYPE_SKIN: u32 = 1 << 5;
/// Uncompressed animation fed to the compression pass.
pub const FILE_TYPE_INTERMEDIATE_CAF: u32 = 1 << 6;

/// All file types that produce drawable geometry assets.
pub const FILE_TYPES_GEOMETRY: u32 =
    FILE_TYPE_CGF | FILE_TYPE_CGA | FILE_TYPE_CHR | FILE_TYPE_ANM | FILE_TYPE_SKIN;

/// Per-file export properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileProperties {
    /// Bitmask over the `FILE_TYPE_*` constants.
    pub file_types: u32,
    pub do_not_merge: bool,
    pub use_custom_normals: bool,
    pub use_f32_vertex_format: bool,
    /// Overrides the export directory when set.
    pub custom_export_path: Option<PathBuf>,
}

impl FileProperties {
    /// Check whether any of the given file-type bits are set.
    #[inline]
    pub fn has_type(&self, mask: u32) -> bool {
        self.file_types & mask != 0
    }

    /// Whether this file produces an animation container.
    #[inline]
    pub fn wants_animation(&self) -> bool {
        self.has_type(FILE_TYPE_CAF | FILE_TYPE_INTERMEDIATE_CAF)
    }

    /// Whether this file produces a drawable geometry asset.
    #[inline]
    pub fn wants_geometry(&self) -> bool {
        self.has_type(FILE_TYPES_GEOMETRY)
    }

    /// The file extension of the primary compiled asset.
    pub fn primary_extension(&self) -> &'static str {
        if self.has_type(FILE_TYPE_CHR) {
            "chr"
        } else if self.has_type(FILE_TYPE_SKIN) {
            "skin"
        } else if self.has_type(FILE_TYPE_CGA) {
            "cga"
        } else if self.has_type(FILE_TYPE_ANM) {
            "anm"
        } else if self.has_type(FILE_TYPE_INTERMEDIATE_CAF) {
            "i_caf"
        } else if self.has_type(FILE_TYPE_CAF) {
            "caf"
        } else {
            "cgf"
        }
    }
}

/// One exportable unit.
#[derive(Clone, Debug)]
pub struct GeometryFile {
    handle: u64,
    name: String,
    properties: FileProperties,
}

impl GeometryFile {
    pub fn handle(&self) -> u64 {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &FileProperties {
        &self.properties
    }
}

/// Ordered collection of geometry files for one export.
#[derive(Clone, Debug, Default)]
pub struct GeometryFileData {
    files: Vec<GeometryFile>,
}

impl GeometryFileData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and return its index.
    pub fn add_file(&mut self, handle: u64, name: &str, properties: FileProperties) -> usize {
        self.files.push(GeometryFile {
            handle,
            name: name.to_string(),
            properties,
        });
        self.files.len() - 1
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GeometryFile> {
        self.files.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeometryFile> {
        self.files.iter()
    }

    /// Rewrite a file's properties. The only mutation allowed after
    /// population; used to rewrite CAF into intermediate-CAF so the
    /// compression pass produces the final container.
    pub fn set_properties(&mut self, index: usize, properties: FileProperties) {
        if let Some(file) = self.files.get_mut(index) {
            file.properties = properties;
        }
    }
}
