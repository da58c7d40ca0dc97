//! Image blobs produced by chart and snapshot collaborators.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// An immutable image: bytes plus declared size and content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// Base file name, without directory.
    pub name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

fn default_content_type() -> String {
    "image/jpeg".to_string()
}

impl ImageArtifact {
    /// `data:` URI used to embed the image in HTML.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.data))
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_base64_in_json() {
        let image = ImageArtifact {
            name: "snap.jpg".into(),
            content_type: "image/jpeg".into(),
            width: 2,
            height: 1,
            data: vec![0xFF, 0xD8, 0xFF],
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["data"], "/9j/");

        let back: ImageArtifact = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
        assert_eq!(image.to_data_uri(), "data:image/jpeg;base64,/9j/");
    }
}
