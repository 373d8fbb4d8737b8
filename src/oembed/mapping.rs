//! Declarative field mapping between provider responses and local fields.
//!
//! Each embed variant declares which remote keys it consumes and where
//! they land. The tables are plain data; `apply` walks them against a
//! JSON response and every mapped key is required to be present.

use serde_json::Value;

use super::{OembedError, OembedItem};
use crate::domain::{Attribution, EmbedFields, PhotoEmbed, RichEmbed, Thumbnail, VideoEmbed};

/// One entry of a variant's mapping table.
///
/// `Same` uses one name for both the remote key and the local field;
/// `Renamed` spells the pair out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMapping {
    Same(&'static str),
    Renamed {
        remote: &'static str,
        local: &'static str,
    },
}

impl FieldMapping {
    /// Key looked up in the provider response
    pub fn remote(&self) -> &'static str {
        match self {
            FieldMapping::Same(name) => name,
            FieldMapping::Renamed { remote, .. } => remote,
        }
    }

    /// Field assigned on the local item
    pub fn local(&self) -> &'static str {
        match self {
            FieldMapping::Same(name) => name,
            FieldMapping::Renamed { local, .. } => local,
        }
    }
}

/// Metadata keys every embed variant consumes. Variant tables in the
/// provider registry start from these entries and extend them with
/// family and variant-specific ones.
pub const BASE_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
];

/// Local fields served by [`assign_embed_base`]
pub const BASE_FIELDS: &[&str] = &["version", "provider_name", "provider_url"];

/// Why a single assignment was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    /// The local field name is not part of this variant
    UnknownField,

    /// The field exists but the response value does not fit it
    Malformed,
}

/// Accept a JSON value as text; numbers are stringified
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept a JSON value as a pixel dimension
pub fn as_dimension(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Accept a JSON value as a provider-side numeric identifier
pub fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Assign one of the base metadata fields shared by every embed variant
pub fn assign_embed_base(
    embed: &mut EmbedFields,
    local: &str,
    value: &Value,
) -> Result<(), AssignError> {
    match local {
        "version" => embed.version = Some(as_text(value).ok_or(AssignError::Malformed)?),
        "provider_name" => {
            embed.provider_name = Some(as_text(value).ok_or(AssignError::Malformed)?)
        }
        "provider_url" => embed.provider_url = Some(as_text(value).ok_or(AssignError::Malformed)?),
        _ => return Err(AssignError::UnknownField),
    }
    Ok(())
}

/// Assign one of the photo-family fields
pub fn assign_photo(photo: &mut PhotoEmbed, local: &str, value: &Value) -> Result<(), AssignError> {
    match local {
        "width" => photo.width = Some(as_dimension(value).ok_or(AssignError::Malformed)?),
        "height" => photo.height = Some(as_dimension(value).ok_or(AssignError::Malformed)?),
        "image_url" => photo.image_url = Some(as_text(value).ok_or(AssignError::Malformed)?),
        _ => return Err(AssignError::UnknownField),
    }
    Ok(())
}

/// Assign one of the video-family fields
pub fn assign_video(video: &mut VideoEmbed, local: &str, value: &Value) -> Result<(), AssignError> {
    match local {
        "width" => video.width = Some(as_dimension(value).ok_or(AssignError::Malformed)?),
        "height" => video.height = Some(as_dimension(value).ok_or(AssignError::Malformed)?),
        "embed" => video.embed = Some(as_text(value).ok_or(AssignError::Malformed)?),
        _ => return Err(AssignError::UnknownField),
    }
    Ok(())
}

/// Assign one of the rich-family fields
pub fn assign_rich(rich: &mut RichEmbed, local: &str, value: &Value) -> Result<(), AssignError> {
    match local {
        "width" => rich.width = Some(as_dimension(value).ok_or(AssignError::Malformed)?),
        "height" => rich.height = Some(as_dimension(value).ok_or(AssignError::Malformed)?),
        "embed" => rich.embed = Some(as_text(value).ok_or(AssignError::Malformed)?),
        _ => return Err(AssignError::UnknownField),
    }
    Ok(())
}

/// Assign one of the attribution fields
pub fn assign_attribution(
    attr: &mut Attribution,
    local: &str,
    value: &Value,
) -> Result<(), AssignError> {
    match local {
        "title" => attr.title = Some(as_text(value).ok_or(AssignError::Malformed)?),
        "author_name" => attr.author_name = Some(as_text(value).ok_or(AssignError::Malformed)?),
        "author_url" => attr.author_url = Some(as_text(value).ok_or(AssignError::Malformed)?),
        _ => return Err(AssignError::UnknownField),
    }
    Ok(())
}

/// Assign one of the thumbnail fields
pub fn assign_thumbnail(
    thumb: &mut Thumbnail,
    local: &str,
    value: &Value,
) -> Result<(), AssignError> {
    match local {
        "thumbnail_url" => thumb.url = Some(as_text(value).ok_or(AssignError::Malformed)?),
        "thumbnail_width" => {
            thumb.width = Some(as_dimension(value).ok_or(AssignError::Malformed)?)
        }
        "thumbnail_height" => {
            thumb.height = Some(as_dimension(value).ok_or(AssignError::Malformed)?)
        }
        _ => return Err(AssignError::UnknownField),
    }
    Ok(())
}

/// Fall through to the next field block when this one does not carry the
/// field. A `Malformed` result stops the chain.
pub fn or_unknown(
    first: Result<(), AssignError>,
    next: impl FnOnce() -> Result<(), AssignError>,
) -> Result<(), AssignError> {
    match first {
        Err(AssignError::UnknownField) => next(),
        other => other,
    }
}

/// Walk a variant's mapping table against a provider response.
///
/// Every mapped remote key must be present; an absent key means the
/// provider no longer honors the contract the table was written against,
/// and the error is never suppressed.
pub fn apply<T: OembedItem>(item: &mut T, response: &Value) -> Result<(), OembedError> {
    for entry in T::oembed_map() {
        let raw = response
            .get(entry.remote())
            .ok_or(OembedError::MappingContract {
                kind: T::KIND,
                key: entry.remote(),
            })?;

        let cleaned = item.clean_value(entry.local(), raw.clone());
        item.assign(entry.local(), &cleaned)
            .map_err(|e| match e {
                AssignError::UnknownField => OembedError::UnknownField {
                    kind: T::KIND,
                    field: entry.local(),
                },
                AssignError::Malformed => OembedError::MalformedValue {
                    kind: T::KIND,
                    key: entry.remote(),
                },
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_names() {
        let same = FieldMapping::Same("version");
        assert_eq!(same.remote(), "version");
        assert_eq!(same.local(), "version");

        let renamed = FieldMapping::Renamed {
            remote: "url",
            local: "image_url",
        };
        assert_eq!(renamed.remote(), "url");
        assert_eq!(renamed.local(), "image_url");
    }

    #[test]
    fn test_as_text_accepts_strings_and_numbers() {
        assert_eq!(as_text(&json!("1.0")), Some("1.0".to_string()));
        assert_eq!(as_text(&json!(1)), Some("1".to_string()));
        assert_eq!(as_text(&json!(["no"])), None);
    }

    #[test]
    fn test_as_dimension_accepts_numbers_and_numeric_strings() {
        assert_eq!(as_dimension(&json!(640)), Some(640));
        assert_eq!(as_dimension(&json!("480")), Some(480));
        assert_eq!(as_dimension(&json!(-1)), None);
        assert_eq!(as_dimension(&json!("wide")), None);
    }

    #[test]
    fn test_assign_base_fields() {
        let mut embed = EmbedFields::default();

        assign_embed_base(&mut embed, "version", &json!("1.0")).unwrap();
        assign_embed_base(&mut embed, "provider_name", &json!("Twitter")).unwrap();
        assert_eq!(embed.version.as_deref(), Some("1.0"));
        assert_eq!(embed.provider_name.as_deref(), Some("Twitter"));

        assert_eq!(
            assign_embed_base(&mut embed, "width", &json!(640)),
            Err(AssignError::UnknownField)
        );
        assert_eq!(
            assign_embed_base(&mut embed, "version", &json!({})),
            Err(AssignError::Malformed)
        );
    }

    #[test]
    fn test_assign_photo_fields() {
        let mut photo = PhotoEmbed::default();

        assign_photo(&mut photo, "width", &json!(1024)).unwrap();
        assign_photo(&mut photo, "image_url", &json!("https://example.com/p.jpg")).unwrap();
        assert_eq!(photo.width, Some(1024));
        assert_eq!(photo.image_url.as_deref(), Some("https://example.com/p.jpg"));

        assert_eq!(
            assign_photo(&mut photo, "embed", &json!("x")),
            Err(AssignError::UnknownField)
        );
    }

    #[test]
    fn test_assign_attribution_and_thumbnail_fields() {
        let mut attr = Attribution::default();
        assign_attribution(&mut attr, "title", &json!("A video")).unwrap();
        assign_attribution(&mut attr, "author_name", &json!("someone")).unwrap();
        assert_eq!(attr.title.as_deref(), Some("A video"));
        assert_eq!(attr.author_name.as_deref(), Some("someone"));
        assert_eq!(
            assign_attribution(&mut attr, "thumbnail_url", &json!("x")),
            Err(AssignError::UnknownField)
        );

        let mut thumb = Thumbnail::default();
        assign_thumbnail(&mut thumb, "thumbnail_url", &json!("https://x.test/t.jpg")).unwrap();
        assign_thumbnail(&mut thumb, "thumbnail_width", &json!(480)).unwrap();
        assert_eq!(thumb.url.as_deref(), Some("https://x.test/t.jpg"));
        assert_eq!(thumb.width, Some(480));
    }

    #[test]
    fn test_or_unknown_falls_through_but_keeps_malformed() {
        let mut attr = Attribution::default();

        // Unknown in the first block, found in the second
        let r = or_unknown(Err(AssignError::UnknownField), || {
            assign_attribution(&mut attr, "title", &json!("found"))
        });
        assert_eq!(r, Ok(()));
        assert_eq!(attr.title.as_deref(), Some("found"));

        // A malformed value never reaches the next block
        let r = or_unknown(Err(AssignError::Malformed), || Ok(()));
        assert_eq!(r, Err(AssignError::Malformed));
    }
}
