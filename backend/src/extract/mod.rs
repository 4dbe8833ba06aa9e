//! Field extraction: turns OCR text blocks into proposed form fields.
//!
//! Each block is lower-cased and checked against [`KEYWORDS`] in list order;
//! the first keyword contained anywhere in the block wins, so ties go to the
//! earlier keyword in the list, not to the earlier position in the text. Blocks
//! without a keyword are dropped. Matching is plain substring containment, so
//! `id` also fires inside unrelated words ("valid", "idea"). That is a known
//! limitation of the heuristic; [`match_keyword`] is the single place to swap
//! in a better matcher via [`propose_fields_with`].
//!
//! Every proposed field is required and OCR-mapped. One photo field is always
//! appended last, whether or not some block already mentioned a photo.

use crate::ocr::TextAnnotation;
use common::model::field::{FieldKind, TemplateField};
use common::model::ocr::{OcrBlock, OcrData};
use uuid::Uuid;

/// Recognized label keywords, in match priority order.
pub const KEYWORDS: [&str; 10] = [
    "name",
    "id",
    "designation",
    "role",
    "department",
    "phone",
    "email",
    "blood",
    "join",
    "date",
];

pub const PHOTO_LABEL: &str = "Employee Photo";
pub const PHOTO_PLACEHOLDER: &str = "Upload Photo";

/// OCR output split into the pieces stored on a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub raw_text: String,
    pub blocks: Vec<OcrBlock>,
    pub fields: Vec<TemplateField>,
}

impl Extraction {
    pub fn ocr_data(&self) -> OcrData {
        OcrData {
            raw_text: self.raw_text.clone(),
            blocks: self.blocks.clone(),
        }
    }
}

/// First keyword (in [`KEYWORDS`] order) contained in `text`, case-insensitively.
pub fn match_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KEYWORDS.iter().copied().find(|k| lower.contains(k))
}

/// Input kind implied by a matched keyword. `mobile` and `dob` are not in
/// [`KEYWORDS`] and so never reach here from extraction.
pub fn field_kind_for(keyword: &str) -> FieldKind {
    let k = keyword.to_lowercase();
    if k.contains("email") {
        FieldKind::Email
    } else if k.contains("phone") || k.contains("mobile") {
        FieldKind::Phone
    } else if k.contains("date") || k.contains("dob") {
        FieldKind::Date
    } else {
        FieldKind::Text
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Upper-cases every word character that starts a word (ASCII word rules,
/// so `e-mail` becomes `E-Mail`). The rest of each word is left as is.
pub fn capitalize_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_word = false;
    for c in s.chars() {
        let is_word = is_word_char(c);
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Label for a block: colons removed, trimmed, words capitalized.
pub fn field_label(block_text: &str) -> String {
    capitalize_words(block_text.replace(':', "").trim())
}

pub fn placeholder_for(keyword: &str) -> String {
    format!("Enter {}", capitalize_words(keyword))
}

pub fn photo_field() -> TemplateField {
    TemplateField {
        id: format!("field_photo_{}", Uuid::new_v4().simple()),
        label: PHOTO_LABEL.to_string(),
        kind: FieldKind::Photo,
        required: true,
        placeholder: PHOTO_PLACEHOLDER.to_string(),
        validation: None,
        ocr_mapped: false,
        ocr_text: None,
    }
}

fn field_from_block(block: &OcrBlock, keyword: &str) -> TemplateField {
    TemplateField {
        id: format!("field_{}", Uuid::new_v4().simple()),
        label: field_label(&block.text),
        kind: field_kind_for(keyword),
        required: true,
        placeholder: placeholder_for(keyword),
        validation: None,
        ocr_mapped: true,
        ocr_text: Some(block.text.clone()),
    }
}

/// Proposes fields using a custom keyword matcher, photo field last.
pub fn propose_fields_with<M>(blocks: &[OcrBlock], matcher: M) -> Vec<TemplateField>
where
    M: Fn(&str) -> Option<&'static str>,
{
    let mut fields: Vec<TemplateField> = blocks
        .iter()
        .filter_map(|block| matcher(&block.text).map(|k| field_from_block(block, k)))
        .collect();
    fields.push(photo_field());
    fields
}

pub fn propose_fields(blocks: &[OcrBlock]) -> Vec<TemplateField> {
    propose_fields_with(blocks, match_keyword)
}

/// Splits engine output into full text, blocks and proposed fields.
/// Returns `None` when the engine detected no text at all.
pub fn extract(annotations: &[TextAnnotation]) -> Option<Extraction> {
    let (full, rest) = annotations.split_first()?;
    let blocks: Vec<OcrBlock> = rest
        .iter()
        .enumerate()
        .map(|(index, a)| OcrBlock {
            id: format!("block_{}", index),
            text: a.description.clone(),
            confidence: a.score,
            bounding_box: a.bounding_poly.clone(),
        })
        .collect();
    let fields = propose_fields(&blocks);
    Some(Extraction {
        raw_text: full.description.clone(),
        blocks,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(texts: &[&str]) -> Vec<TextAnnotation> {
        let full = texts.join("\n");
        std::iter::once(full.as_str())
            .chain(texts.iter().copied())
            .map(|t| TextAnnotation {
                description: t.to_string(),
                score: 0.9,
                bounding_poly: Vec::new(),
            })
            .collect()
    }

    fn labels_and_kinds(fields: &[TemplateField]) -> Vec<(String, FieldKind)> {
        fields.iter().map(|f| (f.label.clone(), f.kind)).collect()
    }

    #[test]
    fn drops_blocks_without_keywords() {
        let extraction =
            extract(&annotations(&["John Doe", "Employee ID: 4821", "Role: Engineer"])).unwrap();

        assert_eq!(extraction.raw_text, "John Doe\nEmployee ID: 4821\nRole: Engineer");
        assert_eq!(extraction.blocks.len(), 3);
        assert_eq!(extraction.blocks[0].id, "block_0");
        assert_eq!(
            labels_and_kinds(&extraction.fields),
            vec![
                ("Employee ID 4821".to_string(), FieldKind::Text),
                ("Role Engineer".to_string(), FieldKind::Text),
                (PHOTO_LABEL.to_string(), FieldKind::Photo),
            ]
        );
        assert_eq!(extraction.fields[0].placeholder, "Enter Id");
        assert_eq!(extraction.fields[1].placeholder, "Enter Role");
        assert_eq!(extraction.fields[0].ocr_text.as_deref(), Some("Employee ID: 4821"));
    }

    #[test]
    fn no_annotations_means_no_text() {
        assert!(extract(&[]).is_none());
    }

    #[test]
    fn only_full_text_still_yields_photo_field() {
        let extraction = extract(&annotations(&[])).unwrap();
        assert!(extraction.blocks.is_empty());
        assert_eq!(extraction.fields.len(), 1);
        assert!(extraction.fields[0].is_photo());
    }

    #[test]
    fn earliest_listed_keyword_wins() {
        // "date" appears first in the text but "join" is earlier in the list.
        assert_eq!(match_keyword("Date of Joining"), Some("join"));
        // "email" appears first but "id" is earlier in the list.
        assert_eq!(match_keyword("Email ID"), Some("id"));
        assert_eq!(field_kind_for("id"), FieldKind::Text);
        // "name" beats "phone".
        assert_eq!(match_keyword("Phone / Name"), Some("name"));
    }

    #[test]
    fn keyword_kinds() {
        assert_eq!(field_kind_for("email"), FieldKind::Email);
        assert_eq!(field_kind_for("phone"), FieldKind::Phone);
        assert_eq!(field_kind_for("date"), FieldKind::Date);
        assert_eq!(field_kind_for("blood"), FieldKind::Text);
        assert_eq!(match_keyword("Mobile"), None);
        assert_eq!(match_keyword("E-MAIL"), None);
        assert_eq!(match_keyword("EMAIL:"), Some("email"));
    }

    #[test]
    fn substring_matching_is_literal() {
        assert_eq!(match_keyword("Valid Until"), Some("id"));
        assert_eq!(match_keyword("ACME Corp"), None);
    }

    #[test]
    fn labels_have_no_colons_and_capitalized_words() {
        let blocks = annotations(&[
            "full name:",
            "  department : r&d ",
            "blood_group:",
            "e-mail/phone:",
            "date:of:birth",
        ]);
        let fields = extract(&blocks).unwrap().fields;
        assert_eq!(fields.len(), 6);
        for field in &fields {
            assert!(!field.label.contains(':'), "{}", field.label);
            for word in field.label.split_whitespace() {
                let first = word.chars().next().unwrap();
                assert!(!first.is_ascii_lowercase(), "{}", field.label);
            }
        }
        assert_eq!(fields[0].label, "Full Name");
        assert_eq!(fields[1].label, "Department  R&D");
        assert_eq!(fields[2].label, "Blood_group");
        assert_eq!(fields[3].label, "E-Mail/Phone");
        assert_eq!(fields[4].label, "Dateofbirth");
    }

    #[test]
    fn photo_field_appended_once_even_when_mentioned() {
        let fields = extract(&annotations(&["Photo", "Name", "Photo ID"])).unwrap().fields;
        let photos: Vec<_> = fields.iter().filter(|f| f.is_photo()).collect();
        assert_eq!(photos.len(), 1);
        assert!(fields.last().unwrap().is_photo());
        assert!(!photos[0].ocr_mapped);
        assert!(photos[0].ocr_text.is_none());
        assert!(photos[0].required);
        // "Photo ID" matches "id" and becomes a regular text field.
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn every_ocr_field_is_required_and_mapped() {
        let fields = extract(&annotations(&["Name", "Phone", "Email", "Join Date"])).unwrap().fields;
        for field in &fields[..fields.len() - 1] {
            assert!(field.required);
            assert!(field.ocr_mapped);
            assert!(field.ocr_text.is_some());
        }
    }

    #[test]
    fn rerun_yields_same_labels_and_kinds_with_fresh_ids() {
        let input = annotations(&["Name:", "Designation", "Phone No", "Email"]);
        let first = extract(&input).unwrap().fields;
        let second = extract(&input).unwrap().fields;
        assert_eq!(labels_and_kinds(&first), labels_and_kinds(&second));
        assert_ne!(first[0].id, second[0].id);

        let ids: std::collections::HashSet<_> = first.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), first.len());
    }

    #[test]
    fn custom_matcher_replaces_heuristic() {
        let blocks = extract(&annotations(&["Valid Until", "Name"])).unwrap().blocks;
        let whole_words = |text: &str| {
            text.split_whitespace()
                .map(|w| w.to_lowercase())
                .find_map(|w| KEYWORDS.iter().copied().find(|k| *k == w))
        };
        let fields = propose_fields_with(&blocks, whole_words);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].label, "Name");
    }
}
