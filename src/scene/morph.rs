//! Morph targets.

/// One morph target of a model.
#[derive(Clone, Debug)]
pub struct MorphTarget {
    pub handle: u64,
    pub name: String,
    /// Optional long name; `full_name()` falls back to the short name.
    pub full_name: Option<String>,
}

impl MorphTarget {
    pub fn full_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered morph target list for one model.
#[derive(Clone, Debug, Default)]
pub struct MorphData {
    targets: Vec<MorphTarget>,
}

impl MorphData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target and return its index.
    pub fn add_target(&mut self, target: MorphTarget) -> usize {
        self.targets.push(target);
        self.targets.len() - 1
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MorphTarget> {
        self.targets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MorphTarget> {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_fallback() {
        let short = MorphTarget {
            handle: 1,
            name: "smile".into(),
            full_name: None,
        };
        assert_eq!(short.full_name(), "smile");

        let long = MorphTarget {
            handle: 2,
            name: "smile".into(),
            full_name: Some("face_smile_full".into()),
        };
        assert_eq!(long.full_name(), "face_smile_full");
    }
}
