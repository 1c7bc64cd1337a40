//! Static guidance text shown next to each prediction.
//!
//! The table is keyed by [`ClassLabel`] through an exhaustive `match`, so a
//! lookup cannot miss. [`verify_catalog`] still runs at startup to catch a
//! label table and advice table drifting apart in content.

use std::collections::HashSet;
use strum::{EnumCount, IntoEnumIterator};

use crate::ClassLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdviceRecord {
    pub description: &'static str,
    pub location: &'static str,
    pub precautions: &'static str,
    pub medications: &'static str,
    pub doctors: &'static str,
    pub surgery: &'static str,
    pub diet: &'static str,
}

impl AdviceRecord {
    /// Field captions paired with their text, in display order.
    pub fn fields(&self) -> [(&'static str, &'static str); 7] {
        [
            ("Description", self.description),
            ("Location", self.location),
            ("Precautions", self.precautions),
            ("Medications", self.medications),
            ("Doctors", self.doctors),
            ("Surgery", self.surgery),
            ("Diet", self.diet),
        ]
    }
}

static GLIOMA: AdviceRecord = AdviceRecord {
    description: "Gliomas are a type of tumor that occurs in the brain and spinal cord. They begin in the glial cells that surround nerve cells and help them function.",
    location: "Brain and spinal cord.",
    precautions: "Regular monitoring with MRI scans, avoiding radiation exposure, and maintaining a healthy lifestyle.",
    medications: "Chemotherapy drugs like temozolomide, corticosteroids to reduce inflammation, and anticonvulsants to prevent seizures.",
    doctors: "Neuro-oncologist, neurosurgeon, radiologist.",
    surgery: "Surgical removal of the tumor, often followed by radiation therapy and/or chemotherapy.",
    diet: "High-fiber diet with plenty of fruits and vegetables, lean proteins, and whole grains. Avoid processed foods and high-sugar diets.",
};

static MENINGIOMA: AdviceRecord = AdviceRecord {
    description: "Meningiomas are tumors that arise from the meninges, the membranes that surround your brain and spinal cord. Most are benign, but they can cause significant problems due to their size and location.",
    location: "Membranes covering the brain and spinal cord.",
    precautions: "Regular MRI or CT scans, managing symptoms, and maintaining a healthy diet and exercise routine.",
    medications: "Anti-seizure medications, corticosteroids to reduce swelling, and pain relievers.",
    doctors: "Neurosurgeon, neurologist, oncologist.",
    surgery: "Surgical resection is often the first line of treatment. Radiation therapy may follow if the tumor cannot be completely removed.",
    diet: "Balanced diet with a focus on anti-inflammatory foods like leafy greens, nuts, and fatty fish. Limit red meat and sugary foods.",
};

static NO_TUMOR: AdviceRecord = AdviceRecord {
    description: "No tumor detected.",
    location: "N/A",
    precautions: "Maintain regular health check-ups and MRI scans as advised by your doctor.",
    medications: "N/A",
    doctors: "Primary care physician, neurologist (if needed).",
    surgery: "N/A",
    diet: "Maintain a healthy and balanced diet rich in fruits, vegetables, lean proteins, and whole grains.",
};

static PITUITARY: AdviceRecord = AdviceRecord {
    description: "Pituitary tumors are abnormal growths that develop in your pituitary gland, which can affect hormone levels and overall health.",
    location: "Pituitary gland, located at the base of the brain.",
    precautions: "Regular MRI scans, hormone level monitoring, and managing symptoms.",
    medications: "Hormone replacement therapy, medications to shrink the tumor, and corticosteroids.",
    doctors: "Endocrinologist, neurosurgeon, neurologist.",
    surgery: "Transsphenoidal surgery to remove the tumor, radiation therapy if surgery is not completely successful.",
    diet: "Balanced diet with adequate calcium and vitamin D, especially if hormone levels are affected. Avoid caffeine and alcohol.",
};

impl ClassLabel {
    pub fn advice(self) -> &'static AdviceRecord {
        match self {
            ClassLabel::Glioma => &GLIOMA,
            ClassLabel::Meningioma => &MENINGIOMA,
            ClassLabel::NoTumor => &NO_TUMOR,
            ClassLabel::Pituitary => &PITUITARY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("label {label} sits at index {found}, expected {expected}")]
    IndexMismatch {
        label: ClassLabel,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} labels, found {found}")]
    LabelCount { expected: usize, found: usize },
    #[error("slug {0:?} is used by more than one label")]
    DuplicateSlug(String),
    #[error("labels {0} and {1} share the same advice record")]
    SharedAdvice(ClassLabel, ClassLabel),
    #[error("advice for {label} has an empty {field} field")]
    EmptyField {
        label: ClassLabel,
        field: &'static str,
    },
}

/// Startup consistency check between the label index table and the advice table.
pub fn verify_catalog() -> Result<(), CatalogError> {
    let labels: Vec<ClassLabel> = ClassLabel::iter().collect();
    if labels.len() != ClassLabel::COUNT {
        return Err(CatalogError::LabelCount {
            expected: ClassLabel::COUNT,
            found: labels.len(),
        });
    }

    let mut slugs = HashSet::new();
    for (position, label) in labels.iter().copied().enumerate() {
        if ClassLabel::from_index(position) != Some(label) || label.index() != position {
            return Err(CatalogError::IndexMismatch {
                label,
                expected: position,
                found: label.index(),
            });
        }
        if !slugs.insert(label.to_string()) {
            return Err(CatalogError::DuplicateSlug(label.to_string()));
        }
        for (field, text) in label.advice().fields() {
            if text.trim().is_empty() {
                return Err(CatalogError::EmptyField { label, field });
            }
        }
    }

    for (i, a) in labels.iter().enumerate() {
        for b in &labels[i + 1..] {
            if std::ptr::eq(a.advice(), b.advice()) {
                return Err(CatalogError::SharedAdvice(*a, *b));
            }
        }
    }

    Ok(())
}
