use strum_macros::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

/// Tumor categories, declared in the order the model emits its outputs.
///
/// The discriminant is the model output index. Slugs (`Display`/`FromStr`)
/// are lowercase kebab-case; [`ClassLabel::display_name`] is the human form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ClassLabel {
    Glioma = 0,
    Meningioma = 1,
    NoTumor = 2,
    Pituitary = 3,
}

impl ClassLabel {
    /// Maps a model output index to its label.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ClassLabel::Glioma),
            1 => Some(ClassLabel::Meningioma),
            2 => Some(ClassLabel::NoTumor),
            3 => Some(ClassLabel::Pituitary),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ClassLabel::Glioma => "Glioma",
            ClassLabel::Meningioma => "Meningioma",
            ClassLabel::NoTumor => "No Tumor",
            ClassLabel::Pituitary => "Pituitary",
        }
    }
}
