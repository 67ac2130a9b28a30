//! Tagged-record codec for content blocks.
//!
//! Every block travels as `{ "type": <tag>, "content": { ... } }`. The tag
//! selects the variant and the fields required from `content`:
//!
//! | tag                          | content                       |
//! |------------------------------|-------------------------------|
//! | `explanation`, `heading1..6` | `{ text }`                    |
//! | `snippet`                    | `{ code }`                    |
//! | `fillBlank`                  | `{ prose, answer }`           |
//! | `orderedList`, `unorderedList` | `{ items: [string] }`       |
//! | `multipleChoice` (legacy)    | `{ question, options, answer }` |
//!
//! Extra keys inside `content` are ignored.

use crate::error::SchemaError;
use crate::types::{ContentBlock, HeadingLevel, MultipleChoiceQuestion};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const HEADING_PREFIX: &str = "heading";

/// The wire shape of a single block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
}

/// Decode a wire record into a block
pub fn decode(record: &BlockRecord) -> Result<ContentBlock, SchemaError> {
    let block = match record.kind.as_str() {
        "explanation" => ContentBlock::Explanation {
            text: string_field(record, "text")?,
        },
        "snippet" => ContentBlock::Snippet {
            code: string_field(record, "code")?,
        },
        "fillBlank" => ContentBlock::FillBlank {
            prose: string_field(record, "prose")?,
            answer: string_field(record, "answer")?,
        },
        "orderedList" => ContentBlock::OrderedList {
            items: string_list_field(record, "items")?,
        },
        "unorderedList" => ContentBlock::UnorderedList {
            items: string_list_field(record, "items")?,
        },
        "multipleChoice" => ContentBlock::MultipleChoice(MultipleChoiceQuestion {
            question: string_field(record, "question")?,
            options: string_list_field(record, "options")?,
            answer: string_field(record, "answer")?,
        }),
        other => match heading_level(other) {
            Some(level) => ContentBlock::Heading {
                level,
                text: string_field(record, "text")?,
            },
            None => return Err(SchemaError::UnknownType(other.to_string())),
        },
    };
    Ok(block)
}

/// Decode an arbitrary JSON value that should hold a block record
pub fn decode_value(value: &Value) -> Result<ContentBlock, SchemaError> {
    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingField("type"))?;
    let record = BlockRecord {
        kind: kind.to_string(),
        content: object.get("content").cloned().unwrap_or(Value::Null),
    };
    decode(&record)
}

/// Encode a block into its wire record. Total: every block has a record.
pub fn encode(block: &ContentBlock) -> BlockRecord {
    let (kind, content) = match block {
        ContentBlock::Explanation { text } => ("explanation".to_string(), json!({ "text": text })),
        ContentBlock::Snippet { code } => ("snippet".to_string(), json!({ "code": code })),
        ContentBlock::FillBlank { prose, answer } => (
            "fillBlank".to_string(),
            json!({ "prose": prose, "answer": answer }),
        ),
        ContentBlock::Heading { level, text } => (
            format!("{}{}", HEADING_PREFIX, level.get()),
            json!({ "text": text }),
        ),
        ContentBlock::OrderedList { items } => {
            ("orderedList".to_string(), json!({ "items": items }))
        }
        ContentBlock::UnorderedList { items } => {
            ("unorderedList".to_string(), json!({ "items": items }))
        }
        ContentBlock::MultipleChoice(q) => (
            "multipleChoice".to_string(),
            json!({ "question": q.question, "options": q.options, "answer": q.answer }),
        ),
    };
    BlockRecord { kind, content }
}

impl TryFrom<BlockRecord> for ContentBlock {
    type Error = SchemaError;

    fn try_from(record: BlockRecord) -> Result<Self, Self::Error> {
        decode(&record)
    }
}

impl From<ContentBlock> for BlockRecord {
    fn from(block: ContentBlock) -> Self {
        encode(&block)
    }
}

/// `heading1` through `heading6`; anything else (including `heading01`) is not a heading
fn heading_level(tag: &str) -> Option<HeadingLevel> {
    let digits = tag.strip_prefix(HEADING_PREFIX)?;
    if digits.len() != 1 {
        return None;
    }
    digits.parse::<u8>().ok().and_then(HeadingLevel::new)
}

fn content_map(record: &BlockRecord) -> Result<&Map<String, Value>, SchemaError> {
    record
        .content
        .as_object()
        .ok_or(SchemaError::MissingField("content"))
}

fn string_field(record: &BlockRecord, name: &'static str) -> Result<String, SchemaError> {
    content_map(record)?
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(SchemaError::MissingField(name))
}

fn string_list_field(record: &BlockRecord, name: &'static str) -> Result<Vec<String>, SchemaError> {
    let values = content_map(record)?
        .get(name)
        .and_then(Value::as_array)
        .ok_or(SchemaError::MissingField(name))?;

    values
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or(SchemaError::MissingField(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, content: Value) -> BlockRecord {
        BlockRecord {
            kind: kind.into(),
            content,
        }
    }

    fn sample_blocks() -> Vec<ContentBlock> {
        let mut blocks = vec![
            ContentBlock::Explanation {
                text: "Variables hold values.".into(),
            },
            ContentBlock::Snippet {
                code: "let x = 5".into(),
            },
            ContentBlock::FillBlank {
                prose: "Use ___ to declare a constant.".into(),
                answer: "let".into(),
            },
            ContentBlock::OrderedList {
                items: vec!["first".into(), "second".into()],
            },
            ContentBlock::UnorderedList { items: vec![] },
            ContentBlock::MultipleChoice(MultipleChoiceQuestion {
                question: "2+2?".into(),
                options: vec!["3".into(), "4".into()],
                answer: "4".into(),
            }),
        ];
        for level in HeadingLevel::MIN..=HeadingLevel::MAX {
            blocks.push(ContentBlock::Heading {
                level: HeadingLevel::new(level).unwrap(),
                text: format!("Heading {}", level),
            });
        }
        blocks
    }

    #[test]
    fn test_every_block_round_trips() {
        for block in sample_blocks() {
            let encoded = encode(&block);
            assert_eq!(decode(&encoded).unwrap(), block, "record: {:?}", encoded);
        }
    }

    #[test]
    fn test_decoded_record_encodes_back_to_itself() {
        let original = record("fillBlank", json!({ "answer": "var", "prose": "___ x = 1" }));
        let block = decode(&original).unwrap();
        assert_eq!(encode(&block), original);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = decode(&record("essay", json!({}))).unwrap_err();
        assert_eq!(err, SchemaError::UnknownType("essay".into()));
    }

    #[test]
    fn test_heading_level_lives_in_tag() {
        let block = decode(&record("heading4", json!({ "text": "Loops" }))).unwrap();
        assert_eq!(
            block,
            ContentBlock::Heading {
                level: HeadingLevel::new(4).unwrap(),
                text: "Loops".into()
            }
        );
        assert_eq!(encode(&block).kind, "heading4");

        for tag in ["heading0", "heading7", "heading01", "heading"] {
            assert!(matches!(
                decode(&record(tag, json!({ "text": "x" }))),
                Err(SchemaError::UnknownType(_))
            ));
        }
    }

    #[test]
    fn test_missing_field_reported_by_name() {
        let err = decode(&record("fillBlank", json!({ "prose": "x" }))).unwrap_err();
        assert_eq!(err, SchemaError::MissingField("answer"));

        let err = decode(&record("snippet", json!({ "code": 42 }))).unwrap_err();
        assert_eq!(err, SchemaError::MissingField("code"));

        let err = decode(&record("explanation", Value::Null)).unwrap_err();
        assert_eq!(err, SchemaError::MissingField("content"));
    }

    #[test]
    fn test_items_must_be_strings() {
        let err = decode(&record("orderedList", json!({ "items": ["a", 1] }))).unwrap_err();
        assert_eq!(err, SchemaError::MissingField("items"));

        let err = decode(&record("unorderedList", json!({ "items": "a" }))).unwrap_err();
        assert_eq!(err, SchemaError::MissingField("items"));
    }

    #[test]
    fn test_empty_list_round_trips_as_empty() {
        let original = record("orderedList", json!({ "items": [] }));
        let block = decode(&original).unwrap();
        assert_eq!(block, ContentBlock::OrderedList { items: vec![] });
        assert_eq!(encode(&block), original);
    }

    #[test]
    fn test_decode_value_checks_envelope() {
        assert_eq!(decode_value(&json!("text")), Err(SchemaError::NotAnObject));
        assert_eq!(
            decode_value(&json!({ "content": {} })),
            Err(SchemaError::MissingField("type"))
        );
        assert!(decode_value(&json!({ "type": "snippet", "content": { "code": "x" } })).is_ok());
    }

    #[test]
    fn test_serde_uses_tagged_record() {
        let block: ContentBlock = serde_json::from_str(
            r#"{"type":"heading2","content":{"text":"Optionals","extra":true}}"#,
        )
        .unwrap();
        assert_eq!(block.id(), "h2-Optionals");

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({ "type": "heading2", "content": { "text": "Optionals" } }));

        let yaml = "type: unorderedList\ncontent:\n  items: [a, b]\n";
        let block: ContentBlock = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            block,
            ContentBlock::UnorderedList {
                items: vec!["a".into(), "b".into()]
            }
        );

        assert!(serde_json::from_str::<ContentBlock>(r#"{"type":"essay","content":{}}"#).is_err());
    }
}
